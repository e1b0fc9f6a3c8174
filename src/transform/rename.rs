//! Column label normalization

use indexmap::IndexMap;
use tracing::warn;

use crate::error::SchemaError;
use crate::model::Table;

/// Characters removed after title-casing
const SEPARATORS: [char; 3] = ['_', ' ', '.'];

/// Rewrites labels into compact title case: `host_since` becomes `HostSince`
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnNameNormalizer;

impl ColumnNameNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Relabel every column; collisions are logged, not rejected
    pub fn normalize(&self, table: &Table) -> Table {
        for (label, sources) in label_collisions(table) {
            warn!(label = %label, sources = ?sources, "column labels collide after normalization");
        }
        table.relabel(normalize_label)
    }

    /// Relabel every column, failing if two labels normalize to the same one
    pub fn normalize_strict(&self, table: &Table) -> Result<Table, SchemaError> {
        if let Some((label, sources)) = label_collisions(table).into_iter().next() {
            return Err(SchemaError::DuplicateLabel { label, sources });
        }
        Ok(table.relabel(normalize_label))
    }
}

/// Convenience function to normalize labels
pub fn normalize(table: &Table) -> Table {
    ColumnNameNormalizer::new().normalize(table)
}

/// Convenience function to normalize labels, rejecting collisions
pub fn normalize_strict(table: &Table) -> Result<Table, SchemaError> {
    ColumnNameNormalizer::new().normalize_strict(table)
}

/// Lowercase, title-case, then drop underscores, spaces and periods
///
/// A word starts at any character that has no case, so digits and CJK
/// text both start new words. Word starts use the Unicode titlecase
/// mapping: `ß` becomes `Ss` and `ǆ` becomes `ǅ`.
pub fn normalize_label(label: &str) -> String {
    let lowered = label.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_cased = false;

    for c in lowered.chars() {
        if !SEPARATORS.contains(&c) {
            if prev_cased {
                out.push(c);
            } else {
                push_titlecase(&mut out, c);
            }
        }
        prev_cased = c.is_lowercase() || c.is_uppercase();
    }

    out
}

/// Append the titlecase mapping of `c`
///
/// `char::to_uppercase` differs from titlecase for digraphs, Georgian,
/// Greek iota subscripts and the multi-character expansions.
fn push_titlecase(out: &mut String, c: char) {
    let single = match c {
        'Ǆ' | 'ǅ' | 'ǆ' => Some('ǅ'),
        'Ǉ' | 'ǈ' | 'ǉ' => Some('ǈ'),
        'Ǌ' | 'ǋ' | 'ǌ' => Some('ǋ'),
        'Ǳ' | 'ǲ' | 'ǳ' => Some('ǲ'),
        'ᾳ' | 'ᾼ' => Some('ᾼ'),
        'ῃ' | 'ῌ' => Some('ῌ'),
        'ῳ' | 'ῼ' => Some('ῼ'),
        '\u{10D0}'..='\u{10FA}' | '\u{10FD}'..='\u{10FF}' => Some(c),
        '\u{1F80}'..='\u{1FAF}' => char::from_u32(c as u32 | 0x8),
        _ => None,
    };
    if let Some(t) = single {
        out.push(t);
        return;
    }
    if c == 'ŉ' {
        out.push_str("ʼN");
        return;
    }

    let upper: Vec<char> = c.to_uppercase().collect();
    match upper.split_last() {
        Some((&'Ι', rest)) if !rest.is_empty() && ('\u{1FB2}'..='\u{1FF7}').contains(&c) => {
            out.extend(rest);
            out.push('\u{345}');
        }
        _ => {
            let mut chars = upper.into_iter();
            out.extend(chars.next());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
}

/// Normalized labels produced by more than one source label, with the
/// sources in column order
pub fn label_collisions(table: &Table) -> Vec<(String, Vec<String>)> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for col in table.columns() {
        groups
            .entry(normalize_label(&col.name))
            .or_default()
            .push(col.name.clone());
    }

    groups
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .collect()
}
