//! Declared output schemas
//!
//! By default the converter infers the output schema from the first chunk.
//! A caller that knows the shape of its data can declare the schema up
//! front instead; every chunk (and the empty-input file) is then coerced
//! to the declared columns.

use crate::{ConvertError, Result};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Column data types the converter can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Int64,
    Float64,
    Utf8,
}

impl ColumnType {
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "Boolean",
            ColumnType::Int64 => "Int64",
            ColumnType::Float64 => "Float64",
            ColumnType::Utf8 => "Utf8",
        }
    }

    pub(crate) fn to_arrow(self) -> DataType {
        match self {
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Utf8 => DataType::Utf8,
        }
    }
}

/// A single named, typed output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// An ordered set of output columns declared by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    pub columns: Vec<ColumnSpec>,
}

impl SchemaSpec {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Every declared column maps to a nullable Arrow field, since any
    /// record may omit any key.
    pub(crate) fn to_arrow(&self) -> SchemaRef {
        let fields = self
            .columns
            .iter()
            .map(|column| Field::new(column.name.clone(), column.column_type.to_arrow(), true))
            .collect::<Vec<_>>();
        Arc::new(Schema::new(fields))
    }
}

/// Builder for declared schemas
pub struct SchemaBuilder {
    columns: Vec<ColumnSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            column_type,
        });
        self
    }

    pub fn build(self) -> Result<SchemaSpec> {
        if self.columns.is_empty() {
            return Err(ConvertError::invalid_argument(
                "declared schema must have at least one column",
            ));
        }
        for (idx, column) in self.columns.iter().enumerate() {
            if self.columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(ConvertError::invalid_argument(format!(
                    "duplicate column name '{}' in declared schema",
                    column.name
                )));
            }
        }
        Ok(SchemaSpec {
            columns: self.columns,
        })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let spec = SchemaSpec::builder()
            .column("id", ColumnType::Int64)
            .column("name", ColumnType::Utf8)
            .column("score", ColumnType::Float64)
            .build()
            .unwrap();

        assert_eq!(spec.columns.len(), 3);

        let arrow = spec.to_arrow();
        assert_eq!(arrow.field(0).name(), "id");
        assert_eq!(arrow.field(0).data_type(), &DataType::Int64);
        assert!(arrow.field(0).is_nullable());
        assert_eq!(arrow.field(2).data_type(), &DataType::Float64);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = SchemaSpec::builder()
            .column("id", ColumnType::Int64)
            .column("id", ColumnType::Utf8)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'id'"));
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(SchemaSpec::builder().build().is_err());
    }

    #[test]
    fn test_schema_from_json_config() {
        let spec: SchemaSpec = serde_json::from_str(
            r#"{"columns": [{"name": "id", "type": "int64"}, {"name": "tag", "type": "utf8"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.columns[0].column_type, ColumnType::Int64);
        assert_eq!(spec.columns[1].column_type, ColumnType::Utf8);
    }
}
