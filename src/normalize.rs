//! Dataset normalization: the total, never-failing pipeline that turns an
//! arbitrary imported table into the canonical lead schema. Columns that
//! refuse type coercion degrade to string-with-nulls; partial, ugly data is
//! preferred to a rejected upload.

use crate::data::{ColumnType, Value, coerce_column};
use crate::dataset::{
    DEFAULT_PRIORITY, FOLLOW_UP_COMPLETED_COL, FOLLOW_UP_DATE_COL, LAST_CONTACT_COL, LeadTable,
    PRIORITY_COL,
};
use crate::mapping::ColumnMapping;
use crate::split;

/// Column-name keywords marking candidate multi-email columns.
pub const EMAIL_KEYWORDS: &[&str] = &["email", "mail", "e-mail"];
/// Column-name keywords marking candidate multi-product columns.
pub const PRODUCT_KEYWORDS: &[&str] = &["product", "item", "service", "offering"];

/// A raw imported table: headers plus untyped string cells, with the type
/// each column was inferred to hold.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub types: Vec<ColumnType>,
    pub rows: Vec<Vec<String>>,
}

pub fn name_matches_keywords(name: &str, keywords: &[&str]) -> bool {
    let lowered = name.to_ascii_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

fn is_multi_value_column(name: &str) -> bool {
    name_matches_keywords(name, EMAIL_KEYWORDS) || name_matches_keywords(name, PRODUCT_KEYWORDS)
}

/// Runs the full normalization pipeline. Total over any input: every step
/// degrades instead of failing.
pub fn normalize(raw: &RawTable, mapping: &ColumnMapping) -> LeadTable {
    let mut table = LeadTable::default();

    // Per-column type coercion with null-token scrubbing.
    for (idx, header) in raw.headers.iter().enumerate() {
        let cells: Vec<String> = raw
            .rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect();
        let (data_type, typed) = coerce_column(&cells, raw.types[idx]);
        table.push_column(header, data_type, typed);
    }

    canonicalize_multi_value_columns(&mut table);
    inject_management_columns(&mut table);
    copy_semantic_aliases(&mut table, mapping);

    table
}

/// Rewrites cells of email/product-keyword columns into the canonical
/// `", "` joined form; single-value cells stay untouched.
fn canonicalize_multi_value_columns(table: &mut LeadTable) {
    let candidates: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, meta)| {
            meta.data_type == ColumnType::String && is_multi_value_column(&meta.name)
        })
        .map(|(idx, _)| idx)
        .collect();

    for idx in candidates {
        for row in &mut table.rows {
            let canonical = match &row[idx] {
                Some(Value::String(cell)) => split::canonicalize_cell(cell),
                _ => None,
            };
            if let Some(canonical) = canonical {
                row[idx] = Some(Value::String(canonical));
            }
        }
    }
}

/// Injects the four management columns when the import did not carry them.
fn inject_management_columns(table: &mut LeadTable) {
    if table.column_index(PRIORITY_COL).is_none() {
        let idx = table.ensure_column(PRIORITY_COL, ColumnType::String);
        for row in &mut table.rows {
            row[idx] = Some(Value::String(DEFAULT_PRIORITY.to_string()));
        }
    }
    table.ensure_column(FOLLOW_UP_DATE_COL, ColumnType::Date);
    table.ensure_column(LAST_CONTACT_COL, ColumnType::String);
    let completed = table.ensure_column(FOLLOW_UP_COMPLETED_COL, ColumnType::Boolean);
    for row in &mut table.rows {
        if row[completed].is_none() {
            row[completed] = Some(Value::Boolean(false));
        }
    }
}

/// For every mapped field whose source column exists and whose alias name
/// is not already a column, copies the source column under the alias name.
/// Accessors still fall back through the mapping because unmapped fields
/// never get an alias column.
fn copy_semantic_aliases(table: &mut LeadTable, mapping: &ColumnMapping) {
    for (field, source) in mapping.iter() {
        let Some(source_idx) = table.column_index(source) else {
            continue;
        };
        if table.column_index(field.as_str()).is_some() {
            continue;
        }
        let data_type = table.columns[source_idx].data_type;
        let cells: Vec<Option<Value>> = table
            .rows
            .iter()
            .map(|row| row[source_idx].clone())
            .collect();
        table.push_column(field.as_str(), data_type, cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SemanticField;

    fn raw(headers: &[&str], types: &[ColumnType], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            types: types.to_vec(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn normalize_scrubs_null_tokens_and_injects_management_columns() {
        let raw = raw(
            &["Contact", "Deal Size"],
            &[ColumnType::String, ColumnType::Integer],
            &[&["Alice", "1200"], &["nan", ""]],
        );
        let table = normalize(&raw, &ColumnMapping::new());

        assert_eq!(table.cell(1, "Contact"), None);
        assert_eq!(table.cell(0, "Deal Size"), Some(&Value::Integer(1200)));
        assert_eq!(
            table.cell(0, PRIORITY_COL),
            Some(&Value::String("Medium".to_string()))
        );
        assert_eq!(table.cell(0, FOLLOW_UP_DATE_COL), None);
        assert_eq!(table.cell(0, LAST_CONTACT_COL), None);
        assert_eq!(
            table.cell(1, FOLLOW_UP_COMPLETED_COL),
            Some(&Value::Boolean(false))
        );
    }

    #[test]
    fn normalize_keeps_existing_management_columns() {
        let raw = raw(
            &["name", "priority"],
            &[ColumnType::String, ColumnType::String],
            &[&["Alice", "High"]],
        );
        let table = normalize(&raw, &ColumnMapping::new());
        assert_eq!(
            table.cell(0, PRIORITY_COL),
            Some(&Value::String("High".to_string()))
        );
    }

    #[test]
    fn normalize_canonicalizes_multi_value_email_cells() {
        let raw = raw(
            &["Work Email"],
            &[ColumnType::String],
            &[&["a@x.com; b@y.com,a@x.com"], &["solo@x.com"]],
        );
        let table = normalize(&raw, &ColumnMapping::new());
        assert_eq!(
            table.cell(0, "Work Email"),
            Some(&Value::String("a@x.com, b@y.com".to_string()))
        );
        // Single-value cells are not rewritten.
        assert_eq!(
            table.cell(1, "Work Email"),
            Some(&Value::String("solo@x.com".to_string()))
        );
    }

    #[test]
    fn normalize_copies_mapped_aliases_without_clobbering_existing_columns() {
        let mut mapping = ColumnMapping::new();
        mapping.bind(SemanticField::Status, "Lead Stage");
        mapping.bind(SemanticField::Email, "Missing Column");
        let raw = raw(
            &["Lead Stage"],
            &[ColumnType::String],
            &[&["qualified"], &["new"]],
        );
        let table = normalize(&raw, &mapping);

        assert_eq!(
            table.cell(0, "status"),
            Some(&Value::String("qualified".to_string()))
        );
        // Unresolvable mappings never create an alias column.
        assert!(table.column_index("email").is_none());
    }

    #[test]
    fn normalize_degrades_unparseable_numeric_columns() {
        let raw = raw(
            &["Deal Size"],
            &[ColumnType::Integer],
            &[&["1200"], &["call to discuss"]],
        );
        let table = normalize(&raw, &ColumnMapping::new());
        assert_eq!(table.columns[0].data_type, ColumnType::String);
        assert_eq!(
            table.cell(1, "Deal Size"),
            Some(&Value::String("call to discuss".to_string()))
        );
    }
}
