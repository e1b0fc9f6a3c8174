//! Data model for tabular data representation

mod data;
mod schema;
mod table;

pub use data::{Categorical, ColumnData};
pub use schema::{Column, FloatWidth, IntWidth, StorageKind};
pub use table::{CellValue, Table};
