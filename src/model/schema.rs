//! Column metadata and storage kinds

use super::data::ColumnData;
use super::table::CellValue;

/// Width of a signed integer column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
}

impl IntWidth {
    /// Widths a column may be narrowed to, smallest first
    pub const DOWNCAST_TARGETS: [IntWidth; 4] =
        [IntWidth::W8, IntWidth::W16, IntWidth::W32, IntWidth::W64];

    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
            IntWidth::W128 => 128,
        }
    }

    /// Inclusive value range representable at this width
    pub fn range(self) -> (i128, i128) {
        match self {
            IntWidth::W8 => (i8::MIN as i128, i8::MAX as i128),
            IntWidth::W16 => (i16::MIN as i128, i16::MAX as i128),
            IntWidth::W32 => (i32::MIN as i128, i32::MAX as i128),
            IntWidth::W64 => (i64::MIN as i128, i64::MAX as i128),
            IntWidth::W128 => (i128::MIN, i128::MAX),
        }
    }

    /// Smallest downcast target covering `[min, max]`
    pub fn smallest_for(min: i128, max: i128) -> Option<IntWidth> {
        Self::DOWNCAST_TARGETS.into_iter().find(|w| {
            let (lo, hi) = w.range();
            lo <= min && max <= hi
        })
    }
}

/// Width of a floating point column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FloatWidth {
    W16,
    W32,
    W64,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::W16 => 16,
            FloatWidth::W32 => 32,
            FloatWidth::W64 => 64,
        }
    }
}

/// Storage kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Text,
    Categorical,
    Int(IntWidth),
    Float(FloatWidth),
    Bool,
    Date,
    DateTime,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Text => write!(f, "text"),
            StorageKind::Categorical => write!(f, "category"),
            StorageKind::Int(w) => write!(f, "int{}", w.bits()),
            StorageKind::Float(w) => write!(f, "float{}", w.bits()),
            StorageKind::Bool => write!(f, "bool"),
            StorageKind::Date => write!(f, "date"),
            StorageKind::DateTime => write!(f, "datetime"),
        }
    }
}

/// A labelled column of typed values
#[derive(Debug, Clone)]
pub struct Column {
    /// Column label (from header)
    pub name: String,
    /// Typed storage
    pub data: ColumnData,
}

impl Column {
    /// Create a column from a label and its storage
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Same storage under a different label
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: self.data,
        }
    }

    pub fn kind(&self) -> StorageKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Logical value at `row`
    pub fn get(&self, row: usize) -> Option<CellValue> {
        self.data.get(row)
    }

    pub fn non_null_count(&self) -> usize {
        self.data.non_null_count()
    }

    /// Deep memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.name.len() + self.data.memory_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_int_width() {
        assert_eq!(IntWidth::smallest_for(-120, 127), Some(IntWidth::W8));
        assert_eq!(IntWidth::smallest_for(-129, 0), Some(IntWidth::W16));
        assert_eq!(IntWidth::smallest_for(0, 40_000), Some(IntWidth::W32));
        assert_eq!(
            IntWidth::smallest_for(0, i64::MAX as i128),
            Some(IntWidth::W64)
        );
        assert_eq!(IntWidth::smallest_for(0, i64::MAX as i128 + 1), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(StorageKind::Int(IntWidth::W16).to_string(), "int16");
        assert_eq!(StorageKind::Float(FloatWidth::W32).to_string(), "float32");
        assert_eq!(StorageKind::Categorical.to_string(), "category");
    }
}
