// Engine library root: pure data transformations over the in-memory product
// and sales lists. Everything here is synchronous and side-effect free apart
// from tracing; network I/O lives in the `app` crate.

pub mod data;
pub mod error;
pub mod produtos;
pub mod vendas;

pub use error::EngineError;
