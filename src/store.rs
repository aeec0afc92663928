//! The in-memory lead store: single source of truth for the loaded dataset.
//! Every mutation touches exactly one record, emits an audit entry, and then
//! re-persists the whole table. A persistence failure after a mutation is
//! logged as a warning and the in-memory state is kept; the store stays
//! usable for the rest of the session even when the gateway is unreachable.

use chrono::{Local, NaiveDate};
use log::warn;
use thiserror::Error;

use crate::data::Value;
use crate::dataset::{
    FOLLOW_UP_COMPLETED_COL, FOLLOW_UP_DATE_COL, LAST_CONTACT_COL, LeadTable, PRIORITY_COL,
};
use crate::mapping::{ColumnMapping, SemanticField};
use crate::persist::{PersistenceGateway, StoredDataset};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No lead with id {0} in the loaded dataset")]
    RecordNotFound(usize),
}

pub struct LeadStore<'g> {
    table: LeadTable,
    mapping: ColumnMapping,
    original_columns: Vec<String>,
    gateway: &'g dyn PersistenceGateway,
}

impl<'g> LeadStore<'g> {
    /// Creates a store from a fresh import, replacing any persisted dataset
    /// wholesale.
    pub fn from_import(
        table: LeadTable,
        mapping: ColumnMapping,
        original_columns: Vec<String>,
        gateway: &'g dyn PersistenceGateway,
    ) -> Self {
        let store = Self {
            table,
            mapping,
            original_columns,
            gateway,
        };
        store.persist();
        store
    }

    /// Restores the most recently persisted dataset, or `None` when nothing
    /// has been imported yet.
    pub fn open(gateway: &'g dyn PersistenceGateway) -> anyhow::Result<Option<Self>> {
        let Some(StoredDataset {
            table,
            mapping,
            original_columns,
            ..
        }) = gateway.load_table()?
        else {
            return Ok(None);
        };
        Ok(Some(Self {
            table,
            mapping,
            original_columns,
            gateway,
        }))
    }

    pub fn table(&self) -> &LeadTable {
        &self.table
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn original_columns(&self) -> &[String] {
        &self.original_columns
    }

    pub fn has_data(&self) -> bool {
        !self.table.is_empty()
    }

    fn check_record(&self, id: usize) -> Result<(), StoreError> {
        if self.table.has_row(id) {
            Ok(())
        } else {
            Err(StoreError::RecordNotFound(id))
        }
    }

    fn audit(&self, id: usize, field: &str, old: Option<String>, new: Option<String>) {
        if let Err(err) = self.gateway.record_field_change(id, field, old, new) {
            warn!("Audit entry for lead {id} not recorded: {err:#}");
        }
    }

    /// Full re-persist after each mutation. Failures are warnings: the
    /// in-memory mutation is kept rather than rolled back.
    fn persist(&self) {
        if let Err(err) =
            self.gateway
                .save_table(&self.table, &self.mapping, &self.original_columns)
        {
            warn!("Dataset not persisted; in-memory changes remain usable: {err:#}");
        }
    }

    fn display_of(&self, id: usize, column: &str) -> Option<String> {
        self.table.cell(id, column).map(Value::as_display)
    }

    /// Writes the status alias column (creating it if absent, so later
    /// reads resolve the new value) and stamps `last_contact`.
    pub fn update_status(&mut self, id: usize, new_status: &str) -> Result<(), StoreError> {
        self.check_record(id)?;
        let old = self
            .mapping
            .resolve(&self.table, id, SemanticField::Status)
            .map(Value::as_display);
        self.audit(id, "status", old, Some(new_status.to_string()));
        self.table.set_cell(
            id,
            SemanticField::Status.as_str(),
            Some(Value::String(new_status.to_string())),
        );
        self.touch_last_contact(id);
        self.persist();
        Ok(())
    }

    pub fn update_priority(&mut self, id: usize, new_priority: &str) -> Result<(), StoreError> {
        self.check_record(id)?;
        let old = self.display_of(id, PRIORITY_COL);
        self.audit(id, PRIORITY_COL, old, Some(new_priority.to_string()));
        self.table.set_cell(
            id,
            PRIORITY_COL,
            Some(Value::String(new_priority.to_string())),
        );
        self.persist();
        Ok(())
    }

    /// Schedules (or re-schedules) a follow-up. Re-scheduling always reopens
    /// the task: the completed flag is reset.
    pub fn schedule_followup(&mut self, id: usize, date: NaiveDate) -> Result<(), StoreError> {
        self.check_record(id)?;
        let old = self.display_of(id, FOLLOW_UP_DATE_COL);
        self.audit(
            id,
            FOLLOW_UP_DATE_COL,
            old,
            Some(date.format("%Y-%m-%d").to_string()),
        );
        self.table
            .set_cell(id, FOLLOW_UP_DATE_COL, Some(Value::Date(date)));
        self.table
            .set_cell(id, FOLLOW_UP_COMPLETED_COL, Some(Value::Boolean(false)));
        self.persist();
        Ok(())
    }

    /// Appends a timestamped note; a blank note is a no-op.
    pub fn add_note(&mut self, id: usize, note: &str) -> Result<(), StoreError> {
        self.check_record(id)?;
        let note = note.trim();
        if note.is_empty() {
            return Ok(());
        }
        let stamp = Local::now().format("%Y-%m-%d %H:%M");
        let prior = self
            .mapping
            .resolve(&self.table, id, SemanticField::Notes)
            .map(Value::as_display);
        let combined = match prior.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n[{stamp}] {note}"),
            _ => format!("[{stamp}] {note}"),
        };
        self.audit(id, "notes", prior, Some(combined.clone()));
        self.table.set_cell(
            id,
            SemanticField::Notes.as_str(),
            Some(Value::String(combined)),
        );
        self.persist();
        Ok(())
    }

    /// Marks a follow-up completed and stamps `last_contact`. Idempotent.
    pub fn complete_followup(&mut self, id: usize) -> Result<(), StoreError> {
        self.check_record(id)?;
        self.audit(
            id,
            FOLLOW_UP_COMPLETED_COL,
            Some("false".to_string()),
            Some("true".to_string()),
        );
        self.table
            .set_cell(id, FOLLOW_UP_COMPLETED_COL, Some(Value::Boolean(true)));
        self.touch_last_contact(id);
        self.persist();
        Ok(())
    }

    fn touch_last_contact(&mut self, id: usize) {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        self.table
            .set_cell(id, LAST_CONTACT_COL, Some(Value::String(today)));
    }
}
