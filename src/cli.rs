use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::parse_naive_date;

#[derive(Debug, Parser)]
#[command(author, version, about = "Import, annotate, and schedule follow-ups over lead datasets", long_about = None)]
pub struct Cli {
    /// Directory holding the persisted dataset, audit log, and backups
    #[arg(long = "data-dir", global = true, default_value = ".lead-managed")]
    pub data_dir: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a delimited lead file, replacing the current dataset
    Import(ImportArgs),
    /// Inspect a candidate file: detected columns, types, and a preview
    Probe(ProbeArgs),
    /// List leads with optional search, status, and priority filters
    List(ListArgs),
    /// Show one lead in full, including extracted emails and products
    Show(ShowArgs),
    /// Update the status of a lead
    Status(StatusArgs),
    /// Update the priority of a lead
    Priority(PriorityArgs),
    /// Schedule (or re-schedule) a follow-up for a lead
    Schedule(ScheduleArgs),
    /// Append a timestamped note to a lead
    Note(NoteArgs),
    /// Mark a lead's follow-up as completed
    Complete(CompleteArgs),
    /// List overdue follow-ups
    Overdue,
    /// List follow-ups due within the next days
    Upcoming(UpcomingArgs),
    /// List tasks due on a specific date, highest priority first
    Daily(DailyArgs),
    /// Summarize lead counts and distributions
    Analytics,
    /// Snapshot the persisted dataset to a backup file
    Backup(BackupArgs),
    /// Report persistence statistics
    Stats,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Input CSV/TSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Repeatable semantic bindings such as `email=Work Email`
    #[arg(long = "map", action = clap::ArgAction::Append)]
    pub map: Vec<String>,
    /// Delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of rows to sample when inferring column types (0 = full scan)
    #[arg(long, default_value_t = 2000)]
    pub sample_rows: usize,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Input CSV/TSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of preview rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive search over name, email, and company
    #[arg(long, default_value = "")]
    pub search: String,
    /// Status filter (substring match; "All" disables)
    #[arg(long)]
    pub status: Option<String>,
    /// Priority filter (exact match; "All" disables)
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Lead id as shown by `list`
    pub id: usize,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    pub id: usize,
    pub status: String,
}

#[derive(Debug, Args)]
pub struct PriorityArgs {
    pub id: usize,
    /// One of High, Medium, Low
    pub priority: String,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    pub id: usize,
    /// Due date, e.g. 2025-04-01
    #[arg(value_parser = parse_date)]
    pub date: NaiveDate,
}

#[derive(Debug, Args)]
pub struct NoteArgs {
    pub id: usize,
    pub text: String,
}

#[derive(Debug, Args)]
pub struct CompleteArgs {
    pub id: usize,
}

#[derive(Debug, Args)]
pub struct UpcomingArgs {
    /// Window size in days, today inclusive
    #[arg(long, default_value_t = 7)]
    pub days: u64,
}

#[derive(Debug, Args)]
pub struct DailyArgs {
    /// Target date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Destination file name (timestamp-derived if omitted)
    #[arg(long)]
    pub dest: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_naive_date(value).map_err(|err| err.to_string())
}
