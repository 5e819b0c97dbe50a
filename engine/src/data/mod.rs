// CSV handling for the catalog import/export feature.

pub mod csv;
