// Shared library: data models and Brazilian locale helpers used by both the
// computation engine and the client application.

pub mod format;
pub mod models;
