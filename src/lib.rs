//! tabslim - shrink and tidy tabular data before exploration
//!
//! Loads CSV, JSON or Parquet files into a typed [`Table`], narrows every
//! column to the smallest exact storage, and rewrites column labels into a
//! compact title-cased form.

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod transform;

pub use config::Config;
pub use error::SchemaError;
pub use model::Table;
pub use transform::{normalize, optimize};
