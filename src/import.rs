//! Import surface: reads a delimited lead file into a raw table, infers
//! per-column types from a sample, and hands off to the normalizer. The
//! probe command reports detected columns and a preview without importing.

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::cli::{ImportArgs, ProbeArgs};
use crate::data::{ColumnType, is_null_token, parse_naive_date};
use crate::io_utils;
use crate::mapping::ColumnMapping;
use crate::normalize::{self, RawTable};
use crate::persist::PersistenceGateway;
use crate::store::LeadStore;
use crate::table;

#[derive(Debug, Clone)]
struct TypeCandidate {
    possible_integer: bool,
    possible_float: bool,
    possible_boolean: bool,
    possible_date: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            possible_integer: true,
            possible_float: true,
            possible_boolean: true,
            possible_date: true,
        }
    }

    fn observe(&mut self, value: &str) {
        if self.possible_boolean
            && !matches!(
                value.to_ascii_lowercase().as_str(),
                "true" | "false" | "t" | "f" | "yes" | "no" | "y" | "n"
            )
        {
            self.possible_boolean = false;
        }
        if self.possible_integer && value.parse::<i64>().is_err() {
            self.possible_integer = false;
        }
        if self.possible_float && value.parse::<f64>().is_err() {
            self.possible_float = false;
        }
        if self.possible_date && parse_naive_date(value).is_err() {
            self.possible_date = false;
        }
    }

    fn decide(&self) -> ColumnType {
        if self.possible_boolean {
            ColumnType::Boolean
        } else if self.possible_integer {
            ColumnType::Integer
        } else if self.possible_float {
            ColumnType::Float
        } else if self.possible_date {
            ColumnType::Date
        } else {
            ColumnType::String
        }
    }
}

/// Reads the whole input into memory as strings and infers a type per
/// column from the first `sample_rows` rows (0 scans everything).
pub fn read_raw_table(
    input: &std::path::Path,
    delimiter: u8,
    encoding: &'static Encoding,
    sample_rows: usize,
) -> Result<RawTable> {
    let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut candidates = vec![TypeCandidate::new(); headers.len()];
    let mut rows = Vec::new();

    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        if sample_rows == 0 || row_idx < sample_rows {
            for (idx, cell) in decoded.iter().enumerate().take(candidates.len()) {
                if !is_null_token(cell) {
                    candidates[idx].observe(cell.trim());
                }
            }
        }
        rows.push(decoded);
    }

    Ok(RawTable {
        headers,
        types: candidates.iter().map(TypeCandidate::decide).collect(),
        rows,
    })
}

pub fn execute_import(args: &ImportArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mapping = ColumnMapping::parse_bindings(&args.map)?;

    let raw = read_raw_table(&args.input, delimiter, encoding, args.sample_rows)
        .with_context(|| format!("Importing {:?}", args.input))?;
    let original_columns = raw.headers.clone();
    let normalized = normalize::normalize(&raw, &mapping);

    info!(
        "Imported {} lead(s) across {} column(s) from {:?}",
        normalized.row_count(),
        original_columns.len(),
        args.input
    );
    LeadStore::from_import(normalized, mapping, original_columns, gateway);
    Ok(())
}

pub fn execute_probe(args: &ProbeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let raw = read_raw_table(&args.input, delimiter, encoding, 0)
        .with_context(|| format!("Probing {:?}", args.input))?;

    let report = detected_columns(&raw);
    let headers = vec![
        "column".to_string(),
        "type".to_string(),
        "non-null".to_string(),
    ];
    table::print_table(&headers, &report);

    println!();
    let preview: Vec<Vec<String>> = raw.rows.iter().take(args.rows).cloned().collect();
    table::print_table(&raw.headers, &preview);
    info!(
        "Probed {} row(s) and {} column(s) from {:?}",
        raw.rows.len(),
        raw.headers.len(),
        args.input
    );
    Ok(())
}

/// One report row per detected column: name, inferred type, non-null count.
pub fn detected_columns(raw: &RawTable) -> Vec<Vec<String>> {
    raw.headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let non_null = raw
                .rows
                .iter()
                .filter(|row| row.get(idx).is_some_and(|cell| !is_null_token(cell)))
                .count();
            vec![
                header.clone(),
                raw.types[idx].label().to_string(),
                format!("{}/{}", non_null, raw.rows.len()),
            ]
        })
        .collect()
}
