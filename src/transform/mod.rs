//! Table transformations: storage narrowing and label normalization
//!
//! Both transformations borrow their input and return a new table, so the
//! caller decides whether to keep the original around.

mod optimize;
mod rename;

pub use optimize::{optimize, TypeOptimizer};
pub use rename::{
    label_collisions, normalize, normalize_label, normalize_strict, ColumnNameNormalizer,
};
