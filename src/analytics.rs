use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::{FOLLOW_UP_COMPLETED_COL, FOLLOW_UP_DATE_COL, LeadTable, PRIORITY_COL};
use crate::mapping::{ColumnMapping, SemanticField};

/// Status keywords counted as qualified. Counting is summed per keyword, so
/// a status containing two keywords is counted twice. Deliberate; see
/// DESIGN.md.
const QUALIFIED_KEYWORDS: &[&str] = &["qualified", "closed", "won"];

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Summary {
    pub total_leads: usize,
    pub active_followups: usize,
    pub overdue_tasks: usize,
    pub qualified_leads: usize,
    pub status_distribution: HashMap<String, usize>,
    pub priority_distribution: HashMap<String, usize>,
}

/// Aggregate counts and distributions over the lead table. Total over any
/// normalized table; an empty table yields all zeros and empty maps.
pub fn summarize(table: &LeadTable, mapping: &ColumnMapping, today: NaiveDate) -> Summary {
    let mut summary = Summary {
        total_leads: table.row_count(),
        ..Summary::default()
    };

    for row in 0..table.row_count() {
        let completed = table
            .cell(row, FOLLOW_UP_COMPLETED_COL)
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        let due = table
            .cell(row, FOLLOW_UP_DATE_COL)
            .and_then(|value| value.as_date());
        if let Some(due) = due
            && !completed
        {
            summary.active_followups += 1;
            if due < today {
                summary.overdue_tasks += 1;
            }
        }

        if let Some(status) = mapping.resolve(table, row, SemanticField::Status) {
            let status = status.as_display();
            let lowered = status.to_ascii_lowercase();
            for keyword in QUALIFIED_KEYWORDS {
                if lowered.contains(keyword) {
                    summary.qualified_leads += 1;
                }
            }
            *summary.status_distribution.entry(status).or_insert(0) += 1;
        }

        if let Some(priority) = table.cell(row, PRIORITY_COL) {
            *summary
                .priority_distribution
                .entry(priority.as_display())
                .or_insert(0) += 1;
        }
    }

    summary
}

pub fn execute(gateway: &dyn crate::persist::PersistenceGateway) -> anyhow::Result<()> {
    let store = crate::leads::open_store(gateway)?;
    let today = chrono::Local::now().date_naive();
    let summary = summarize(store.table(), store.mapping(), today);

    println!("Total leads:       {}", summary.total_leads);
    println!("Active follow-ups: {}", summary.active_followups);
    println!("Overdue tasks:     {}", summary.overdue_tasks);
    println!("Qualified leads:   {}", summary.qualified_leads);
    print_distribution("Status distribution", &summary.status_distribution);
    print_distribution("Priority distribution", &summary.priority_distribution);
    Ok(())
}

fn print_distribution(title: &str, distribution: &HashMap<String, usize>) {
    if distribution.is_empty() {
        return;
    }
    println!("{title}:");
    let mut entries: Vec<_> = distribution.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (value, count) in entries {
        println!("  {value}: {count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnType, Value};
    use crate::normalize::{RawTable, normalize};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> (LeadTable, ColumnMapping) {
        let raw = RawTable {
            headers: vec!["name".to_string(), "status".to_string()],
            types: vec![ColumnType::String, ColumnType::String],
            rows: vec![
                vec!["Alice".to_string(), "new".to_string()],
                vec!["Bob".to_string(), "qualified".to_string()],
                vec!["Cara".to_string(), "closed-won".to_string()],
                vec!["Dan".to_string(), "nan".to_string()],
            ],
        };
        (normalize(&raw, &ColumnMapping::new()), ColumnMapping::new())
    }

    #[test]
    fn summarize_on_empty_table_is_all_zero() {
        let table = LeadTable::default();
        let summary = summarize(&table, &ColumnMapping::new(), date(2025, 3, 10));
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn summarize_counts_followups_and_overdue_tasks() {
        let (mut table, mapping) = sample();
        let today = date(2025, 3, 10);
        table.set_cell(0, FOLLOW_UP_DATE_COL, Some(Value::Date(date(2025, 3, 8))));
        table.set_cell(1, FOLLOW_UP_DATE_COL, Some(Value::Date(date(2025, 3, 20))));
        table.set_cell(2, FOLLOW_UP_DATE_COL, Some(Value::Date(date(2025, 3, 1))));
        table.set_cell(2, FOLLOW_UP_COMPLETED_COL, Some(Value::Boolean(true)));

        let summary = summarize(&table, &mapping, today);
        assert_eq!(summary.total_leads, 4);
        assert_eq!(summary.active_followups, 2);
        assert_eq!(summary.overdue_tasks, 1);
    }

    #[test]
    fn qualified_counting_sums_per_keyword() {
        let (table, mapping) = sample();
        let summary = summarize(&table, &mapping, date(2025, 3, 10));
        // "qualified" matches once; "closed-won" matches both "closed" and
        // "won" and is counted twice.
        assert_eq!(summary.qualified_leads, 3);
    }

    #[test]
    fn distributions_skip_null_values() {
        let (table, mapping) = sample();
        let summary = summarize(&table, &mapping, date(2025, 3, 10));
        assert_eq!(summary.status_distribution.len(), 3);
        assert!(!summary.status_distribution.contains_key("nan"));
        assert_eq!(summary.priority_distribution.get("Medium"), Some(&4));
    }
}
