//! Arrow encoding of normalized batches
//!
//! Turns a [`NormalizedBatch`] into an Arrow [`RecordBatch`] matching a
//! target schema. The target is either declared by the caller or inferred
//! from the first chunk; every later chunk is aligned to it here, so a
//! shape change between chunks surfaces as a typed schema error instead of
//! an opaque storage-layer failure.
//!
//! Alignment rules: columns missing from a chunk are null-filled; columns
//! absent from the target schema are an error; Int64 values widen into
//! Float64 targets; anything coerces into Utf8 targets through its text
//! form; all other conflicts are errors.

use crate::normalize::{NormalizedBatch, ScalarValue};
use crate::{ConvertError, Result};
use arrow_array::builder::{BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

/// Infer the target schema from a chunk by scanning every value of every
/// column. Every field is nullable.
pub(crate) fn infer_schema(batch: &NormalizedBatch) -> SchemaRef {
    let fields = batch
        .columns()
        .map(|(name, values)| Field::new(name, infer_data_type(values), true))
        .collect::<Vec<_>>();
    Arc::new(Schema::new(fields))
}

fn infer_data_type(values: &[ScalarValue]) -> DataType {
    let mut has_string = false;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;

    for value in values {
        match value {
            ScalarValue::Null => {}
            ScalarValue::Boolean(_) => has_bool = true,
            ScalarValue::Int64(_) => has_int = true,
            ScalarValue::Float64(_) => has_float = true,
            ScalarValue::String(_) => has_string = true,
        }
    }

    if has_string || (has_bool && (has_int || has_float)) {
        // Mixed scalar types degrade to text, like an all-null column.
        DataType::Utf8
    } else if has_float {
        DataType::Float64
    } else if has_int {
        DataType::Int64
    } else if has_bool {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

/// Align a normalized batch to the target schema and build the record
/// batch to append.
pub(crate) fn to_record_batch(batch: &NormalizedBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    for name in batch.column_names() {
        if schema.index_of(name).is_err() {
            return Err(ConvertError::schema_mismatch(format!(
                "column '{}' is not part of the output schema",
                name
            )));
        }
    }

    let num_rows = batch.num_rows();

    // Parquet cannot store rows without columns. A chunk whose records
    // are all empty objects normalizes to zero columns; against an empty
    // target schema its rows would silently vanish in the writer.
    if schema.fields().is_empty() && num_rows > 0 {
        return Err(ConvertError::schema_mismatch(format!(
            "cannot append {} rows without any columns",
            num_rows
        )));
    }

    let arrays = schema
        .fields()
        .iter()
        .map(|field| build_array(field, batch.column(field.name()), num_rows))
        .collect::<Result<Vec<_>>>()?;

    RecordBatch::try_new(schema.clone(), arrays).map_err(Into::into)
}

fn build_array(field: &Field, values: Option<&[ScalarValue]>, num_rows: usize) -> Result<ArrayRef> {
    match field.data_type() {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(num_rows);
            for_each_value(values, num_rows, |value| match value {
                ScalarValue::Null => {
                    builder.append_null();
                    Ok(())
                }
                ScalarValue::Boolean(b) => {
                    builder.append_value(*b);
                    Ok(())
                }
                other => Err(coercion_error(field, other)),
            })?;
            Ok(Arc::new(builder.finish()))
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(num_rows);
            for_each_value(values, num_rows, |value| match value {
                ScalarValue::Null => {
                    builder.append_null();
                    Ok(())
                }
                ScalarValue::Int64(i) => {
                    builder.append_value(*i);
                    Ok(())
                }
                other => Err(coercion_error(field, other)),
            })?;
            Ok(Arc::new(builder.finish()))
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(num_rows);
            for_each_value(values, num_rows, |value| match value {
                ScalarValue::Null => {
                    builder.append_null();
                    Ok(())
                }
                ScalarValue::Float64(f) => {
                    builder.append_value(*f);
                    Ok(())
                }
                ScalarValue::Int64(i) => {
                    builder.append_value(*i as f64);
                    Ok(())
                }
                other => Err(coercion_error(field, other)),
            })?;
            Ok(Arc::new(builder.finish()))
        }
        DataType::Utf8 => {
            let mut builder = StringBuilder::new();
            for_each_value(values, num_rows, |value| {
                match value {
                    ScalarValue::Null => builder.append_null(),
                    ScalarValue::String(s) => builder.append_value(s),
                    ScalarValue::Boolean(b) => builder.append_value(if *b { "true" } else { "false" }),
                    ScalarValue::Int64(i) => builder.append_value(i.to_string()),
                    ScalarValue::Float64(f) => builder.append_value(f.to_string()),
                }
                Ok(())
            })?;
            Ok(Arc::new(builder.finish()))
        }
        other => Err(ConvertError::unsupported(format!(
            "cannot encode into {:?} column '{}'",
            other,
            field.name()
        ))),
    }
}

/// Feed each column value into `f`, substituting nulls for a column the
/// chunk does not have.
fn for_each_value<F>(values: Option<&[ScalarValue]>, num_rows: usize, mut f: F) -> Result<()>
where
    F: FnMut(&ScalarValue) -> Result<()>,
{
    match values {
        Some(values) => values.iter().try_for_each(f),
        None => (0..num_rows).try_for_each(|_| f(&ScalarValue::Null)),
    }
}

fn coercion_error(field: &Field, value: &ScalarValue) -> ConvertError {
    ConvertError::schema_mismatch(format!(
        "column '{}': cannot store {} value in {:?} column",
        field.name(),
        value.type_name(),
        field.data_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_batch;
    use arrow_array::Array;
    use serde_json::{json, Value};

    fn normalized(records: Vec<Value>) -> NormalizedBatch {
        let batch = records
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("test records must be objects, got {}", other),
            })
            .collect();
        normalize_batch(batch).unwrap()
    }

    #[test]
    fn test_type_inference() {
        let batch = normalized(vec![
            json!({"i": 1, "f": 1.5, "b": true, "s": "x", "n": null}),
            json!({"i": 2, "f": 2, "b": false, "s": "y", "n": null}),
        ]);
        let schema = infer_schema(&batch);

        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Boolean);
        assert_eq!(schema.field(3).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(4).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_mixed_scalars_infer_utf8() {
        let batch = normalized(vec![json!({"v": 1}), json!({"v": "two"})]);
        let schema = infer_schema(&batch);
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_int_column_with_float_infers_float() {
        let batch = normalized(vec![json!({"v": 1}), json!({"v": 2.5})]);
        let schema = infer_schema(&batch);
        assert_eq!(schema.field(0).data_type(), &DataType::Float64);
    }

    #[test]
    fn test_record_batch_matches_rows() {
        let batch = normalized(vec![json!({"a": 1, "b": "x"}), json!({"a": 2, "b": "y"})]);
        let schema = infer_schema(&batch);
        let record_batch = to_record_batch(&batch, &schema).unwrap();

        assert_eq!(record_batch.num_rows(), 2);
        assert_eq!(record_batch.num_columns(), 2);
    }

    #[test]
    fn test_missing_column_null_filled() {
        let first = normalized(vec![json!({"a": 1, "b": "x"})]);
        let schema = infer_schema(&first);

        let second = normalized(vec![json!({"a": 2})]);
        let record_batch = to_record_batch(&second, &schema).unwrap();

        assert_eq!(record_batch.num_columns(), 2);
        assert_eq!(record_batch.column(1).null_count(), 1);
    }

    #[test]
    fn test_extra_column_rejected() {
        let first = normalized(vec![json!({"a": 1})]);
        let schema = infer_schema(&first);

        let second = normalized(vec![json!({"a": 2, "b": 3})]);
        let err = to_record_batch(&second, &schema).unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_int_widens_into_float_target() {
        let first = normalized(vec![json!({"v": 1.5})]);
        let schema = infer_schema(&first);

        let second = normalized(vec![json!({"v": 3})]);
        assert!(to_record_batch(&second, &schema).is_ok());
    }

    #[test]
    fn test_float_into_int_target_rejected() {
        let first = normalized(vec![json!({"v": 1})]);
        let schema = infer_schema(&first);

        let second = normalized(vec![json!({"v": 2.5})]);
        let err = to_record_batch(&second, &schema).unwrap_err();
        assert!(err.to_string().contains("Float64"));
    }

    #[test]
    fn test_everything_coerces_into_utf8_target() {
        let first = normalized(vec![json!({"v": "text"})]);
        let schema = infer_schema(&first);

        let second = normalized(vec![
            json!({"v": 1}),
            json!({"v": 2.5}),
            json!({"v": true}),
            json!({"v": null}),
        ]);
        let record_batch = to_record_batch(&second, &schema).unwrap();
        assert_eq!(record_batch.num_rows(), 4);
    }

    #[test]
    fn test_rows_without_columns_rejected() {
        let batch = normalized(vec![json!({}), json!({})]);
        let schema = infer_schema(&batch);

        assert_eq!(schema.fields().len(), 0);
        let err = to_record_batch(&batch, &schema).unwrap_err();
        assert!(err.to_string().contains("without any columns"), "got: {}", err);
    }

    #[test]
    fn test_empty_records_null_fill_against_wider_schema() {
        let first = normalized(vec![json!({"a": 1})]);
        let schema = infer_schema(&first);

        let second = normalized(vec![json!({}), json!({})]);
        let record_batch = to_record_batch(&second, &schema).unwrap();

        assert_eq!(record_batch.num_rows(), 2);
        assert_eq!(record_batch.column(0).null_count(), 2);
    }
}
