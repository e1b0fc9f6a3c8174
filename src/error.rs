//! Typed errors raised by the table transformations

use thiserror::Error;

/// A column's declared kind or label does not fit the operation applied to it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Integer range does not fit any available signed width
    #[error("column '{column}' has integer range [{min}, {max}] beyond 64-bit storage")]
    IntegerOverflow { column: String, min: i128, max: i128 },

    /// Column lengths disagree when building a table
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Several source labels normalize to the same label
    #[error("labels {sources:?} all normalize to '{label}'")]
    DuplicateLabel { label: String, sources: Vec<String> },

    /// Column lookup by label failed
    #[error("no column named '{0}'")]
    UnknownColumn(String),
}
