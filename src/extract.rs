use itertools::Itertools;

use crate::dataset::LeadTable;
use crate::mapping::{ColumnMapping, SemanticField};
use crate::normalize::{PRODUCT_KEYWORDS, name_matches_keywords};
use crate::split::split_values;

/// Syntactic plausibility check, not RFC validation: an `@` must be present
/// and the part after the last `@` must contain a dot.
pub fn is_plausible_email(candidate: &str) -> bool {
    match candidate.rsplit_once('@') {
        Some((_, domain)) => domain.contains('.'),
        None => false,
    }
}

/// Extracts every email address stored on one lead. Resolves the email
/// alias (defaulting to a literal `email` column), splits the cell, and
/// keeps plausible addresses in first-seen order.
pub fn emails(table: &LeadTable, mapping: &ColumnMapping, row: usize) -> Vec<String> {
    let column = mapping
        .source_column(SemanticField::Email)
        .unwrap_or("email");
    let cell = table
        .cell(row, SemanticField::Email.as_str())
        .or_else(|| table.cell(row, column));
    let Some(raw) = cell.map(|value| value.as_display()) else {
        return Vec::new();
    };
    split_values(&raw)
        .into_iter()
        .filter(|candidate| is_plausible_email(candidate))
        .unique()
        .collect()
}

/// Extracts every product attached to one lead: the union, in encounter
/// order, of all product-keyword columns plus the mapped products column,
/// deduplicated across columns.
pub fn products(table: &LeadTable, mapping: &ColumnMapping, row: usize) -> Vec<String> {
    let mut columns: Vec<String> = table
        .columns
        .iter()
        .filter(|meta| name_matches_keywords(&meta.name, PRODUCT_KEYWORDS))
        .map(|meta| meta.name.clone())
        .collect();
    if let Some(mapped) = mapping.source_column(SemanticField::Products) {
        columns.push(mapped.to_string());
    }

    let mut all = Vec::new();
    for column in columns {
        if let Some(value) = table.cell(row, &column) {
            all.extend(split_values(&value.as_display()));
        }
    }
    all.into_iter().unique().collect()
}
