use itertools::Itertools;

/// Separators recognised inside a multi-value cell, applied as a cascade:
/// every fragment produced by one separator is re-split by the next.
pub const VALUE_SEPARATORS: &[&str] = &[";", ",", "|", "\n", "\r\n"];

/// Canonical display form for a multi-value cell.
pub const VALUE_JOINER: &str = ", ";

/// Splits a raw cell into its individual values: separator cascade, trim,
/// drop empties, dedup preserving first-seen order. Idempotent, so splitting
/// an already canonicalised cell yields the same list.
pub fn split_values(raw: &str) -> Vec<String> {
    let mut fragments = vec![raw.to_string()];
    for separator in VALUE_SEPARATORS {
        fragments = fragments
            .iter()
            .flat_map(|fragment| fragment.split(separator))
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect();
    }
    fragments.into_iter().unique().collect()
}

/// Rejoins split values into the canonical `", "` display form.
pub fn join_values(values: &[String]) -> String {
    values.join(VALUE_JOINER)
}

/// Canonicalises a multi-value cell for storage. Cells holding a single
/// value are returned untouched so clean imports do not churn.
pub fn canonicalize_cell(raw: &str) -> Option<String> {
    let values = split_values(raw);
    if values.len() > 1 {
        Some(join_values(&values))
    } else {
        None
    }
}
