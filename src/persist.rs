//! Durable storage for the lead dataset. The gateway persists the whole
//! table plus mapping as one JSON blob (full overwrite per save), keeps an
//! append-only JSON-lines audit log of field changes, and can snapshot the
//! blob to timestamp-named backups. The core never reads the audit log back.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dataset::LeadTable;
use crate::mapping::ColumnMapping;

pub const DATASET_FILE: &str = "leads.json";
pub const AUDIT_FILE: &str = "updates.log";

/// Everything a save must carry so a later load restores the session
/// verbatim: the normalized table, the mapping, and the original headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDataset {
    pub table: LeadTable,
    pub mapping: ColumnMapping,
    pub original_columns: Vec<String>,
    pub saved_at: NaiveDateTime,
}

/// One append-only audit record for a single field mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub record_id: usize,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub dataset_count: usize,
    pub update_count: usize,
    pub size_bytes: u64,
    pub location: PathBuf,
}

pub trait PersistenceGateway {
    /// Replaces any previously stored dataset wholesale.
    fn save_table(
        &self,
        table: &LeadTable,
        mapping: &ColumnMapping,
        original_columns: &[String],
    ) -> Result<()>;

    /// Returns the most recently saved dataset, or `None` if nothing was
    /// ever stored.
    fn load_table(&self) -> Result<Option<StoredDataset>>;

    /// Appends one audit entry; fire-and-forget from the core's view.
    fn record_field_change(
        &self,
        record_id: usize,
        field: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Result<()>;

    /// Snapshots the persisted store; the default destination name is
    /// derived from the current timestamp.
    fn backup(&self, destination: Option<&str>) -> Result<PathBuf>;

    fn stats(&self) -> Result<StoreStats>;
}

/// File-backed gateway rooted at a data directory.
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Creating data directory {root:?}"))?;
        Ok(Self { root })
    }

    fn dataset_path(&self) -> PathBuf {
        self.root.join(DATASET_FILE)
    }

    fn audit_path(&self) -> PathBuf {
        self.root.join(AUDIT_FILE)
    }
}

impl PersistenceGateway for FileGateway {
    fn save_table(
        &self,
        table: &LeadTable,
        mapping: &ColumnMapping,
        original_columns: &[String],
    ) -> Result<()> {
        let stored = StoredDataset {
            table: table.clone(),
            mapping: mapping.clone(),
            original_columns: original_columns.to_vec(),
            saved_at: Local::now().naive_local(),
        };
        let path = self.dataset_path();
        let file =
            File::create(&path).with_context(|| format!("Creating dataset file {path:?}"))?;
        serde_json::to_writer(file, &stored).context("Writing dataset JSON")?;
        Ok(())
    }

    fn load_table(&self) -> Result<Option<StoredDataset>> {
        let path = self.dataset_path();
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path).with_context(|| format!("Opening dataset file {path:?}"))?;
        let stored = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing dataset JSON from {path:?}"))?;
        Ok(Some(stored))
    }

    fn record_field_change(
        &self,
        record_id: usize,
        field: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Result<()> {
        let entry = AuditEntry {
            record_id,
            field: field.to_string(),
            old_value,
            new_value,
            updated_at: Local::now().naive_local(),
        };
        let path = self.audit_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Opening audit log {path:?}"))?;
        let line = serde_json::to_string(&entry).context("Serializing audit entry")?;
        writeln!(file, "{line}").with_context(|| format!("Appending to audit log {path:?}"))?;
        Ok(())
    }

    fn backup(&self, destination: Option<&str>) -> Result<PathBuf> {
        let source = self.dataset_path();
        let name = match destination {
            Some(name) => name.to_string(),
            None => format!(
                "leads_backup_{}.json",
                Local::now().format("%Y%m%d_%H%M%S")
            ),
        };
        let target = if Path::new(&name).is_absolute() {
            PathBuf::from(name)
        } else {
            self.root.join(name)
        };
        fs::copy(&source, &target)
            .with_context(|| format!("Copying {source:?} to {target:?}"))?;
        Ok(target)
    }

    fn stats(&self) -> Result<StoreStats> {
        let dataset_path = self.dataset_path();
        let dataset_count = usize::from(dataset_path.exists());
        let size_bytes = dataset_path
            .metadata()
            .map(|meta| meta.len())
            .unwrap_or_default();
        let update_count = match fs::read_to_string(self.audit_path()) {
            Ok(contents) => contents.lines().filter(|line| !line.is_empty()).count(),
            Err(_) => 0,
        };
        Ok(StoreStats {
            dataset_count,
            update_count,
            size_bytes,
            location: self.root.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnType, Value};
    use tempfile::tempdir;

    fn sample_table() -> LeadTable {
        let mut table = LeadTable::default();
        table.push_column(
            "name",
            ColumnType::String,
            vec![Some(Value::String("Alice".into())), None],
        );
        table
    }

    #[test]
    fn save_then_load_round_trips_the_dataset() {
        let dir = tempdir().expect("temp dir");
        let gateway = FileGateway::new(dir.path()).expect("gateway");
        assert!(gateway.load_table().expect("load").is_none());

        let table = sample_table();
        let columns = table.column_names();
        gateway
            .save_table(&table, &ColumnMapping::new(), &columns)
            .expect("save");

        let stored = gateway.load_table().expect("load").expect("dataset");
        assert_eq!(stored.table.row_count(), 2);
        assert_eq!(stored.original_columns, columns);
        assert_eq!(
            stored.table.cell(0, "name"),
            Some(&Value::String("Alice".into()))
        );
    }

    #[test]
    fn audit_log_appends_one_line_per_change() {
        let dir = tempdir().expect("temp dir");
        let gateway = FileGateway::new(dir.path()).expect("gateway");
        gateway
            .record_field_change(0, "status", None, Some("contacted".into()))
            .expect("audit");
        gateway
            .record_field_change(0, "status", Some("contacted".into()), Some("qualified".into()))
            .expect("audit");

        let contents = fs::read_to_string(dir.path().join(AUDIT_FILE)).expect("read log");
        let entries: Vec<AuditEntry> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("entry"))
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].old_value.as_deref(), Some("contacted"));
    }

    #[test]
    fn backup_copies_the_dataset_and_stats_report_counts() {
        let dir = tempdir().expect("temp dir");
        let gateway = FileGateway::new(dir.path()).expect("gateway");
        let table = sample_table();
        gateway
            .save_table(&table, &ColumnMapping::new(), &table.column_names())
            .expect("save");
        gateway
            .record_field_change(1, "priority", None, Some("High".into()))
            .expect("audit");

        let backup = gateway.backup(Some("snapshot.json")).expect("backup");
        assert!(backup.exists());

        let stats = gateway.stats().expect("stats");
        assert_eq!(stats.dataset_count, 1);
        assert_eq!(stats.update_count, 1);
        assert!(stats.size_bytes > 0);
    }
}
