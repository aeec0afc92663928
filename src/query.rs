//! Read-side queries over the lead table: search/status/priority filters and
//! the follow-up time windows. Every query is total over the normalized
//! schema; a missing target column means "no match", never an error.

use chrono::{Days, NaiveDate};
use itertools::Itertools;

use crate::dataset::{FOLLOW_UP_COMPLETED_COL, FOLLOW_UP_DATE_COL, LeadTable, PRIORITY_COL};
use crate::mapping::{ColumnMapping, SemanticField};

/// Filter criteria for lead listings. `All` (the default) disables the
/// status and priority filters; an empty search term disables the search.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub search: String,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl LeadFilter {
    fn status_needle(&self) -> Option<&str> {
        match self.status.as_deref() {
            None | Some("All") => None,
            Some(value) => Some(value),
        }
    }

    fn priority_needle(&self) -> Option<&str> {
        match self.priority.as_deref() {
            None | Some("All") => None,
            Some(value) => Some(value),
        }
    }
}

/// Numeric rank used to order daily tasks; unrecognised priorities rank as
/// Medium rather than sinking to the bottom.
pub fn priority_rank(priority: Option<&str>) -> u8 {
    match priority.map(str::trim) {
        Some(p) if p.eq_ignore_ascii_case("high") => 3,
        Some(p) if p.eq_ignore_ascii_case("low") => 1,
        _ => 2,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Applies search, status, and priority filters in order, returning matching
/// row ids. Search is a case-insensitive substring OR over the resolved
/// name/email/company fields; status is a case-insensitive substring over
/// the resolved status (deliberately not exact, to tolerate free-text
/// variants); priority is an exact match.
pub fn filter_leads(table: &LeadTable, mapping: &ColumnMapping, filter: &LeadFilter) -> Vec<usize> {
    let search = filter.search.trim();
    (0..table.row_count())
        .filter(|&row| {
            if !search.is_empty() {
                let hit = [
                    SemanticField::Name,
                    SemanticField::Email,
                    SemanticField::Company,
                ]
                .into_iter()
                .filter_map(|field| mapping.resolve(table, row, field))
                .any(|value| contains_ci(&value.as_display(), search));
                if !hit {
                    return false;
                }
            }
            if let Some(needle) = filter.status_needle() {
                let hit = mapping
                    .resolve(table, row, SemanticField::Status)
                    .is_some_and(|value| contains_ci(&value.as_display(), needle));
                if !hit {
                    return false;
                }
            }
            if let Some(needle) = filter.priority_needle() {
                let hit = table
                    .cell(row, PRIORITY_COL)
                    .is_some_and(|value| value.as_display() == needle);
                if !hit {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Distinct non-null status values, sorted, for the filter surface.
pub fn unique_statuses(table: &LeadTable, mapping: &ColumnMapping) -> Vec<String> {
    (0..table.row_count())
        .filter_map(|row| mapping.resolve(table, row, SemanticField::Status))
        .map(|value| value.as_display())
        .filter(|status| !status.is_empty())
        .unique()
        .sorted()
        .collect()
}

/// An open follow-up: a row with a due date and the completed flag unset.
fn open_followup(table: &LeadTable, row: usize) -> Option<NaiveDate> {
    let completed = table
        .cell(row, FOLLOW_UP_COMPLETED_COL)
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    if completed {
        return None;
    }
    table
        .cell(row, FOLLOW_UP_DATE_COL)
        .and_then(|value| value.as_date())
}

fn open_followups(table: &LeadTable) -> Vec<(usize, NaiveDate)> {
    (0..table.row_count())
        .filter_map(|row| open_followup(table, row).map(|due| (row, due)))
        .collect()
}

/// Follow-ups strictly before `today`, ascending by due date.
pub fn overdue(table: &LeadTable, today: NaiveDate) -> Vec<usize> {
    open_followups(table)
        .into_iter()
        .filter(|(_, due)| *due < today)
        .sorted_by_key(|(_, due)| *due)
        .map(|(row, _)| row)
        .collect()
}

/// Follow-ups due between `today` and `today + days_ahead` inclusive,
/// ascending by due date.
pub fn upcoming(table: &LeadTable, today: NaiveDate, days_ahead: u64) -> Vec<usize> {
    let end = today
        .checked_add_days(Days::new(days_ahead))
        .unwrap_or(NaiveDate::MAX);
    open_followups(table)
        .into_iter()
        .filter(|(_, due)| *due >= today && *due <= end)
        .sorted_by_key(|(_, due)| *due)
        .map(|(row, _)| row)
        .collect()
}

/// Follow-ups due exactly on `date`, ordered by priority descending then by
/// due date ascending (stable, so insertion order breaks remaining ties).
pub fn daily(table: &LeadTable, date: NaiveDate) -> Vec<usize> {
    open_followups(table)
        .into_iter()
        .filter(|(_, due)| *due == date)
        .sorted_by_key(|(row, due)| {
            let priority = table
                .cell(*row, PRIORITY_COL)
                .map(|value| value.as_display());
            (std::cmp::Reverse(priority_rank(priority.as_deref())), *due)
        })
        .map(|(row, _)| row)
        .collect()
}
