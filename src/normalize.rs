//! Per-chunk schema normalization
//!
//! Normalization turns a [`RowBatch`] of arbitrary JSON objects into a
//! purely columnar, scalar-valued layout:
//!
//! - columns holding nested objects are expanded into one column per leaf
//!   path, named `<parent>.<leafpath>`, and the original column is removed
//! - columns holding arrays are replaced by the array's textual JSON
//!   serialization (empty arrays become null)
//! - everything else passes through as a scalar
//!
//! A column's shape is decided by scanning every non-null value in the
//! chunk, not just the first one. A column that holds nested objects in
//! some records and scalars or arrays in others within the same chunk is
//! rejected with [`ConvertError::MixedColumn`].

use crate::batch::RowBatch;
use crate::{ConvertError, Result};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A single normalized cell value. The only shapes that survive
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "Null",
            ScalarValue::Boolean(_) => "Boolean",
            ScalarValue::Int64(_) => "Int64",
            ScalarValue::Float64(_) => "Float64",
            ScalarValue::String(_) => "String",
        }
    }
}

/// A row batch after flattening: ordered columns of equal length holding
/// only scalar values.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    columns: IndexMap<String, Vec<ScalarValue>>,
    num_rows: usize,
}

impl NormalizedBatch {
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|name| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[ScalarValue]> {
        self.columns.get(name).map(|values| values.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[ScalarValue])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

/// Flatten one chunk of records into columnar scalar form.
///
/// Column order is first-seen key order across the chunk; a record missing
/// a key contributes a null in that column.
pub fn normalize_batch(batch: RowBatch) -> Result<NormalizedBatch> {
    let num_rows = batch.len();

    // Gather raw columns in first-seen order, null-padded so every column
    // stays aligned with the row count.
    let mut raw: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (row_idx, record) in batch.into_iter().enumerate() {
        for (key, value) in record {
            raw.entry(key)
                .or_insert_with(|| vec![Value::Null; row_idx])
                .push(value);
        }
        for column in raw.values_mut() {
            if column.len() <= row_idx {
                column.push(Value::Null);
            }
        }
    }

    let mut columns: IndexMap<String, Vec<ScalarValue>> = IndexMap::new();
    for (name, values) in raw {
        let has_object = values.iter().any(Value::is_object);
        let has_non_object = values
            .iter()
            .any(|v| !matches!(v, Value::Null | Value::Object(_)));

        if has_object {
            if has_non_object {
                return Err(ConvertError::MixedColumn { column: name });
            }
            flatten_object_column(&name, &values, num_rows, &mut columns);
        } else if values.iter().any(Value::is_array) {
            let stringified = values.iter().map(stringify_value).collect();
            columns.insert(name, stringified);
        } else {
            let scalars = values.iter().map(leaf_scalar).collect();
            columns.insert(name, scalars);
        }
    }

    Ok(NormalizedBatch { columns, num_rows })
}

/// Expand an object-shaped column into one column per leaf path. Leaf sets
/// may differ between records; absent leaves are null. Empty objects
/// contribute no leaves, so a column of only empty objects disappears.
fn flatten_object_column(
    parent: &str,
    values: &[Value],
    num_rows: usize,
    columns: &mut IndexMap<String, Vec<ScalarValue>>,
) {
    let mut leaves: IndexMap<String, Vec<ScalarValue>> = IndexMap::new();

    for (row_idx, value) in values.iter().enumerate() {
        if let Value::Object(map) = value {
            collect_leaves(parent, map, row_idx, &mut leaves);
        }
        for column in leaves.values_mut() {
            if column.len() <= row_idx {
                column.push(ScalarValue::Null);
            }
        }
    }

    for (path, mut column) in leaves {
        column.resize(num_rows, ScalarValue::Null);
        columns.insert(path, column);
    }
}

fn collect_leaves(
    prefix: &str,
    map: &Map<String, Value>,
    row_idx: usize,
    leaves: &mut IndexMap<String, Vec<ScalarValue>>,
) {
    for (key, value) in map {
        let path = format!("{}.{}", prefix, key);
        match value {
            Value::Object(inner) => collect_leaves(&path, inner, row_idx, leaves),
            other => {
                let column = leaves
                    .entry(path)
                    .or_insert_with(|| vec![ScalarValue::Null; row_idx]);
                let scalar = leaf_scalar(other);
                if column.len() <= row_idx {
                    column.push(scalar);
                } else if let Some(last) = column.last_mut() {
                    // A dotted literal key colliding with a nested path
                    // lands on the same column; last write wins.
                    *last = scalar;
                }
            }
        }
    }
}

/// Convert a leaf JSON value to a scalar. Arrays reached through a nested
/// object are stringified the same way array-shaped columns are.
fn leaf_scalar(value: &Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Bool(b) => ScalarValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ScalarValue::Int64(i)
            } else if let Some(f) = n.as_f64() {
                ScalarValue::Float64(f)
            } else {
                ScalarValue::Null
            }
        }
        Value::String(s) => ScalarValue::String(s.clone()),
        Value::Array(items) if items.is_empty() => ScalarValue::Null,
        // Arrays (and any object that slipped into a leaf position)
        // serialize to their compact JSON text.
        other => ScalarValue::String(other.to_string()),
    }
}

/// Textual serialization for array-shaped columns: arrays become their
/// compact JSON text, empty arrays and nulls become null, stray scalars
/// keep their text form.
fn stringify_value(value: &Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Array(items) if items.is_empty() => ScalarValue::Null,
        Value::String(s) => ScalarValue::String(s.clone()),
        other => ScalarValue::String(other.to_string()),
    }
}
