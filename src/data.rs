use std::fmt;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Literal tokens that imported files use to mean "no value".
pub const NULL_TOKENS: &[&str] = &["nan", "None", "NULL", "null", "<NA>", ""];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::String(s) => parse_naive_date(s).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
}

impl ColumnType {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        }
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

/// True when a raw cell is one of the placeholder tokens that stand in for
/// a missing value in exported spreadsheets.
pub fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw.trim())
}

/// Scrubs a raw cell into an optional string value, mapping null tokens to
/// `None` and trimming surrounding whitespace.
pub fn scrub_text(raw: &str) -> Option<Value> {
    if is_null_token(raw) {
        None
    } else {
        Some(Value::String(raw.trim().to_string()))
    }
}

/// Parses a single cell according to `ty`, returning `None` on a null token
/// and an error on a non-null cell the type cannot represent.
pub fn parse_typed_value(raw: &str, ty: ColumnType) -> Result<Option<Value>> {
    if is_null_token(raw) {
        return Ok(None);
    }
    let trimmed = raw.trim();
    let parsed = match ty {
        ColumnType::String => Value::String(trimmed.to_string()),
        ColumnType::Integer => Value::Integer(
            trimmed
                .parse()
                .map_err(|_| anyhow!("Failed to parse '{trimmed}' as integer"))?,
        ),
        ColumnType::Float => Value::Float(
            trimmed
                .parse()
                .map_err(|_| anyhow!("Failed to parse '{trimmed}' as float"))?,
        ),
        ColumnType::Boolean => {
            let lowered = trimmed.to_ascii_lowercase();
            let parsed = match lowered.as_str() {
                "true" | "t" | "yes" | "y" | "1" => true,
                "false" | "f" | "no" | "n" | "0" => false,
                _ => return Err(anyhow!("Failed to parse '{trimmed}' as boolean")),
            };
            Value::Boolean(parsed)
        }
        ColumnType::Date => Value::Date(parse_naive_date(trimmed)?),
    };
    Ok(Some(parsed))
}

/// Total coercion of one raw column. Tries the inferred type first; if any
/// non-null cell refuses to parse, the whole column degrades to
/// string-with-nulls instead of failing the import.
pub fn coerce_column(raw_cells: &[String], ty: ColumnType) -> (ColumnType, Vec<Option<Value>>) {
    if ty != ColumnType::String {
        let mut typed = Vec::with_capacity(raw_cells.len());
        let mut ok = true;
        for raw in raw_cells {
            match parse_typed_value(raw, ty) {
                Ok(value) => typed.push(value),
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            return (ty, typed);
        }
        log::info!(
            "Column degraded to string: not all values parse as {}",
            ty.label()
        );
    }
    let cells = raw_cells.iter().map(|raw| scrub_text(raw)).collect();
    (ColumnType::String, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("06/05/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
    }

    #[test]
    fn null_tokens_scrub_to_none() {
        for token in NULL_TOKENS {
            assert_eq!(scrub_text(token), None, "token {token:?}");
        }
        assert_eq!(
            scrub_text("  Acme Corp "),
            Some(Value::String("Acme Corp".to_string()))
        );
    }

    #[test]
    fn parse_typed_value_handles_empty_and_boolean_inputs() {
        assert_eq!(parse_typed_value("", ColumnType::Integer).unwrap(), None);
        assert_eq!(parse_typed_value("nan", ColumnType::Float).unwrap(), None);

        let truthy = parse_typed_value("Yes", ColumnType::Boolean)
            .unwrap()
            .unwrap();
        assert_eq!(truthy, Value::Boolean(true));
        assert!(parse_typed_value("maybe", ColumnType::Boolean).is_err());
    }

    #[test]
    fn coerce_column_degrades_to_string_on_mixed_input() {
        let raw = vec!["12".to_string(), "n/a".to_string(), "".to_string()];
        let (ty, cells) = coerce_column(&raw, ColumnType::Integer);
        assert_eq!(ty, ColumnType::String);
        assert_eq!(cells[0], Some(Value::String("12".to_string())));
        assert_eq!(cells[1], Some(Value::String("n/a".to_string())));
        assert_eq!(cells[2], None);
    }

    #[test]
    fn coerce_column_keeps_clean_numeric_input() {
        let raw = vec!["12".to_string(), "".to_string(), "7".to_string()];
        let (ty, cells) = coerce_column(&raw, ColumnType::Integer);
        assert_eq!(ty, ColumnType::Integer);
        assert_eq!(
            cells,
            vec![Some(Value::Integer(12)), None, Some(Value::Integer(7))]
        );
    }
}
