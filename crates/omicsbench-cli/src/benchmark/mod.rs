//! Multi-run benchmark driver: a JSON config lists classifier/representation
//! combinations, each cross-validated and written to its own results table.
pub mod config;
pub mod runner;
