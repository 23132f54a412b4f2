//! Chunked reading of JSON-Lines input

use crate::{ConvertError, Result};
use serde_json::{Map, Value};
use std::io::BufRead;

/// One chunk of input records, at most `chunk_size` rows
pub type RowBatch = Vec<Map<String, Value>>;

/// Lazily pulls row batches out of a JSON-Lines source.
///
/// The iterator is finite and forward-only: each call to `next` reads at
/// most one chunk's worth of lines, so memory stays bounded by the chunk
/// size regardless of input size. Blank lines are skipped; every line is
/// still counted so errors can point at the offending line number.
pub struct BatchReader<R> {
    lines: std::io::Lines<R>,
    chunk_size: usize,
    line_no: u64,
}

impl<R: BufRead> BatchReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            lines: reader.lines(),
            chunk_size,
            line_no: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<Map<String, Value>> {
        let value: Value = serde_json::from_str(line).map_err(|source| {
            ConvertError::MalformedLine {
                line: self.line_no,
                source,
            }
        })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(ConvertError::NotAnObject {
                line: self.line_no,
                found: json_type_name(&other),
            }),
        }
    }
}

impl<R: BufRead> Iterator for BatchReader<R> {
    type Item = Result<RowBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rows: RowBatch = Vec::with_capacity(self.chunk_size.min(1024));

        while rows.len() < self.chunk_size {
            match self.lines.next() {
                None => break,
                Some(Err(e)) => return Some(Err(e.into())),
                Some(Ok(line)) => {
                    self.line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    match self.parse_line(&line) {
                        Ok(record) => rows.push(record),
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }

        if rows.is_empty() {
            None
        } else {
            Some(Ok(rows))
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
