//! Sequential read-back of converted files
//!
//! A converted file only ever holds nullable Boolean, Int64, Float64 and
//! Utf8 columns, so the reader maps every cell straight back to a
//! [`ScalarValue`]. Used by the round-trip tests and available to callers
//! for spot-checking output; it is deliberately forward-only.

use crate::{ConvertError, Result, ScalarValue};
use arrow_array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, SchemaRef};
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::ChunkReader;
use std::sync::Arc;

/// Reader over any cloneable chunk source (e.g. `bytes::Bytes`)
#[derive(Clone)]
pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R>
where
    R: ChunkReader + Clone + 'static,
{
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// File metadata, including row and row-group counts
    pub fn metadata(&self) -> Result<Arc<ParquetMetaData>> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner.clone())?;
        Ok(builder.metadata().clone())
    }

    /// Iterate rows in file order, each row a vector of scalars in schema
    /// column order
    pub fn read_rows(self) -> Result<RowIterator> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner)?;
        let schema = builder.schema().clone();
        let batch_reader = builder.build()?;

        Ok(RowIterator {
            batch_reader,
            schema,
            current_batch: None,
            current_row: 0,
        })
    }
}

/// Iterator over rows of a converted file
pub struct RowIterator {
    batch_reader: ParquetRecordBatchReader,
    schema: SchemaRef,
    current_batch: Option<RecordBatch>,
    current_row: usize,
}

impl RowIterator {
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }
}

impl Iterator for RowIterator {
    type Item = Result<Vec<ScalarValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ref batch) = self.current_batch {
                if self.current_row < batch.num_rows() {
                    let mut row = Vec::with_capacity(batch.num_columns());
                    for column in batch.columns() {
                        match array_to_scalar(column, self.current_row) {
                            Ok(value) => row.push(value),
                            Err(e) => return Some(Err(e)),
                        }
                    }
                    self.current_row += 1;
                    return Some(Ok(row));
                }
            }

            match self.batch_reader.next() {
                Some(Ok(batch)) => {
                    self.current_batch = Some(batch);
                    self.current_row = 0;
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }
}

fn array_to_scalar(array: &ArrayRef, index: usize) -> Result<ScalarValue> {
    if array.is_null(index) {
        return Ok(ScalarValue::Null);
    }

    match array.data_type() {
        DataType::Boolean => {
            let array = downcast::<BooleanArray>(array, "BooleanArray")?;
            Ok(ScalarValue::Boolean(array.value(index)))
        }
        DataType::Int64 => {
            let array = downcast::<Int64Array>(array, "Int64Array")?;
            Ok(ScalarValue::Int64(array.value(index)))
        }
        DataType::Float64 => {
            let array = downcast::<Float64Array>(array, "Float64Array")?;
            Ok(ScalarValue::Float64(array.value(index)))
        }
        DataType::Utf8 => {
            let array = downcast::<StringArray>(array, "StringArray")?;
            Ok(ScalarValue::String(array.value(index).to_string()))
        }
        other => Err(ConvertError::unsupported(format!("{:?}", other))),
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, expected: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ConvertError::unsupported(format!("expected {}", expected)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_rejected() {
        let reader = Reader::new(bytes::Bytes::from(vec![0u8; 64]));
        assert!(reader.metadata().is_err());
    }
}
