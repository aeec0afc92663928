use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::data::Value;
use crate::dataset::LeadTable;

/// The fixed semantic fields an imported column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticField {
    Name,
    Email,
    Phone,
    Company,
    Status,
    Source,
    Notes,
    Date,
    Value,
    Products,
}

impl SemanticField {
    pub const ALL: [SemanticField; 10] = [
        SemanticField::Name,
        SemanticField::Email,
        SemanticField::Phone,
        SemanticField::Company,
        SemanticField::Status,
        SemanticField::Source,
        SemanticField::Notes,
        SemanticField::Date,
        SemanticField::Value,
        SemanticField::Products,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticField::Name => "name",
            SemanticField::Email => "email",
            SemanticField::Phone => "phone",
            SemanticField::Company => "company",
            SemanticField::Status => "status",
            SemanticField::Source => "source",
            SemanticField::Notes => "notes",
            SemanticField::Date => "date",
            SemanticField::Value => "value",
            SemanticField::Products => "products",
        }
    }
}

impl FromStr for SemanticField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        SemanticField::ALL
            .into_iter()
            .find(|field| field.as_str() == lowered)
            .ok_or_else(|| anyhow!("Unknown semantic field '{s}'"))
    }
}

/// Binding of semantic fields to source column names. Only non-empty
/// bindings are held; an unmapped field simply has no entry. Set once at
/// import time and immutable for the lifetime of the loaded dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    bindings: BTreeMap<SemanticField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `field` to `column`; blank column names are treated as
    /// unmapped and dropped, matching the import form's empty choice.
    pub fn bind(&mut self, field: SemanticField, column: &str) {
        let trimmed = column.trim();
        if trimmed.is_empty() {
            self.bindings.remove(&field);
        } else {
            self.bindings.insert(field, trimmed.to_string());
        }
    }

    pub fn source_column(&self, field: SemanticField) -> Option<&str> {
        self.bindings.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemanticField, &str)> {
        self.bindings.iter().map(|(field, col)| (*field, col.as_str()))
    }

    /// Parses repeatable `field=column` CLI bindings.
    pub fn parse_bindings(specs: &[String]) -> Result<Self> {
        let mut mapping = ColumnMapping::new();
        for spec in specs {
            let (field, column) = spec
                .split_once('=')
                .ok_or_else(|| anyhow!("Mapping '{spec}' must use the form field=column"))?;
            mapping.bind(field.parse()?, column);
        }
        Ok(mapping)
    }

    /// Three-tier resolution: the literal alias column, then the mapped
    /// source column, then nothing. Every consumer goes through this; the
    /// alias column may be absent whenever the field was left unmapped.
    pub fn resolve<'a>(
        &self,
        table: &'a LeadTable,
        row: usize,
        field: SemanticField,
    ) -> Option<&'a Value> {
        if table.column_index(field.as_str()).is_some() {
            return table.cell(row, field.as_str());
        }
        let source = self.source_column(field)?;
        table.cell(row, source)
    }

    /// Resolution with a caller-supplied default display string, for
    /// rendering surfaces ("N/A", "Unknown", "Never").
    pub fn resolve_display(
        &self,
        table: &LeadTable,
        row: usize,
        field: SemanticField,
        default: &str,
    ) -> String {
        self.resolve(table, row, field)
            .map(Value::as_display)
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnType;

    fn table_with(columns: &[(&str, &str)]) -> LeadTable {
        let mut table = LeadTable::default();
        for (name, value) in columns {
            table.push_column(
                name,
                ColumnType::String,
                vec![Some(Value::String((*value).to_string()))],
            );
        }
        table
    }

    #[test]
    fn resolve_prefers_the_literal_alias_column() {
        let table = table_with(&[("status", "contacted"), ("Lead Stage", "qualified")]);
        let mut mapping = ColumnMapping::new();
        mapping.bind(SemanticField::Status, "Lead Stage");
        let resolved = mapping.resolve(&table, 0, SemanticField::Status).unwrap();
        assert_eq!(resolved.as_str(), Some("contacted"));
    }

    #[test]
    fn resolve_falls_back_to_the_mapped_source_column() {
        let table = table_with(&[("Lead Stage", "qualified")]);
        let mut mapping = ColumnMapping::new();
        mapping.bind(SemanticField::Status, "Lead Stage");
        let resolved = mapping.resolve(&table, 0, SemanticField::Status).unwrap();
        assert_eq!(resolved.as_str(), Some("qualified"));
    }

    #[test]
    fn resolve_display_returns_the_default_when_unmapped() {
        let table = table_with(&[("Lead Stage", "qualified")]);
        let mapping = ColumnMapping::new();
        assert_eq!(
            mapping.resolve_display(&table, 0, SemanticField::Status, "Unknown"),
            "Unknown"
        );
    }

    #[test]
    fn bind_treats_blank_columns_as_unmapped() {
        let mut mapping = ColumnMapping::new();
        mapping.bind(SemanticField::Email, "Contact Email");
        mapping.bind(SemanticField::Email, "   ");
        assert!(mapping.source_column(SemanticField::Email).is_none());
    }

    #[test]
    fn parse_bindings_rejects_unknown_fields() {
        let specs = vec!["email=Contact Email".to_string()];
        let mapping = ColumnMapping::parse_bindings(&specs).unwrap();
        assert_eq!(
            mapping.source_column(SemanticField::Email),
            Some("Contact Email")
        );
        assert!(ColumnMapping::parse_bindings(&["budget=Spend".to_string()]).is_err());
    }
}
