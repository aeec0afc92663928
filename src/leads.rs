//! Lead listing and per-lead commands.

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::cli::{ListArgs, NoteArgs, PriorityArgs, ShowArgs, StatusArgs};
use crate::dataset::{FOLLOW_UP_DATE_COL, LAST_CONTACT_COL, LeadTable, PRIORITY_COL};
use crate::extract;
use crate::mapping::{ColumnMapping, SemanticField};
use crate::persist::PersistenceGateway;
use crate::query::{self, LeadFilter};
use crate::store::LeadStore;
use crate::table::print_table;

pub fn open_store<'g>(gateway: &'g dyn PersistenceGateway) -> Result<LeadStore<'g>> {
    LeadStore::open(gateway)
        .context("Loading persisted dataset")?
        .ok_or_else(|| anyhow!("No lead data found. Import a file first."))
}

/// Display row for one lead: id plus resolved semantic fields with the
/// defaults the follow-up surfaces use.
fn display_row(table: &LeadTable, mapping: &ColumnMapping, row: usize) -> Vec<String> {
    let cell = |col: &str, default: &str| {
        table
            .cell(row, col)
            .map(|value| value.as_display())
            .unwrap_or_else(|| default.to_string())
    };
    vec![
        row.to_string(),
        mapping.resolve_display(table, row, SemanticField::Name, "N/A"),
        mapping.resolve_display(table, row, SemanticField::Email, "N/A"),
        mapping.resolve_display(table, row, SemanticField::Company, "N/A"),
        mapping.resolve_display(table, row, SemanticField::Status, "Unknown"),
        cell(PRIORITY_COL, "Medium"),
        cell(FOLLOW_UP_DATE_COL, "-"),
        cell(LAST_CONTACT_COL, "Never"),
    ]
}

fn listing_headers() -> Vec<String> {
    ["id", "name", "email", "company", "status", "priority", "follow-up", "last contact"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

pub fn print_listing(table: &LeadTable, mapping: &ColumnMapping, rows: &[usize]) {
    let display: Vec<Vec<String>> = rows
        .iter()
        .map(|&row| display_row(table, mapping, row))
        .collect();
    print_table(&listing_headers(), &display);
}

pub fn execute_list(args: &ListArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let store = open_store(gateway)?;
    if !store.has_data() {
        info!("The loaded dataset has no rows");
        return Ok(());
    }
    let filter = LeadFilter {
        search: args.search.clone(),
        status: args.status.clone(),
        priority: args.priority.clone(),
    };
    let rows = query::filter_leads(store.table(), store.mapping(), &filter);
    print_listing(store.table(), store.mapping(), &rows);
    info!("{} of {} lead(s) matched", rows.len(), store.table().row_count());
    Ok(())
}

pub fn execute_show(args: &ShowArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let store = open_store(gateway)?;
    let table = store.table();
    if !table.has_row(args.id) {
        return Err(anyhow!("No lead with id {} in the loaded dataset", args.id));
    }
    let mapping = store.mapping();

    println!("Lead {}", args.id);
    for field in SemanticField::ALL {
        let value = mapping.resolve_display(table, args.id, field, "N/A");
        println!("  {:<10} {value}", field.as_str());
    }
    for column in [PRIORITY_COL, FOLLOW_UP_DATE_COL, LAST_CONTACT_COL] {
        let value = table
            .cell(args.id, column)
            .map(|v| v.as_display())
            .unwrap_or_else(|| "-".to_string());
        println!("  {column:<10} {value}");
    }

    let emails = extract::emails(table, mapping, args.id);
    if !emails.is_empty() {
        println!("  emails: {}", emails.join(", "));
    }
    let products = extract::products(table, mapping, args.id);
    if !products.is_empty() {
        println!("  products: {}", products.join(", "));
    }
    Ok(())
}

pub fn execute_status(args: &StatusArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let mut store = open_store(gateway)?;
    store.update_status(args.id, &args.status)?;
    info!("Lead {} status set to '{}'", args.id, args.status);
    Ok(())
}

pub fn execute_priority(args: &PriorityArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let mut store = open_store(gateway)?;
    store.update_priority(args.id, &args.priority)?;
    info!("Lead {} priority set to '{}'", args.id, args.priority);
    Ok(())
}

pub fn execute_note(args: &NoteArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let mut store = open_store(gateway)?;
    if args.text.trim().is_empty() {
        info!("Empty note ignored for lead {}", args.id);
        return Ok(());
    }
    store.add_note(args.id, &args.text)?;
    info!("Note added to lead {}", args.id);
    Ok(())
}
