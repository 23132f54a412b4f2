//! The streaming conversion pipeline
//!
//! One call, one pass: read a chunk, normalize it, encode it, append it as
//! a row group, record timings, repeat until the input is exhausted.
//! Everything runs synchronously on the calling thread; memory stays
//! bounded by the chunk size because no batch outlives its iteration.
//!
//! The caller must guarantee no other writer targets the output path for
//! the duration of the call. On failure the partially written output is
//! left on disk and must be treated as unusable.

use crate::batch::BatchReader;
use crate::encode::{infer_schema, to_record_batch};
use crate::normalize::normalize_batch;
use crate::{ConversionMetrics, ConversionRequest, ConvertError, ErrorContext, Result};
use arrow_schema::{Schema, SchemaRef};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Terminal outcome of one conversion run
#[derive(Debug)]
pub struct ConversionOutcome {
    /// Whether the whole run completed
    pub success: bool,
    /// Metrics for the chunks that completed, plus run totals on success
    pub metrics: ConversionMetrics,
    /// The error that aborted the run, when `success` is false
    pub error: Option<ConvertError>,
}

/// Convert a JSON-Lines file to Parquet.
///
/// Errors at any stage abort the run immediately; the outcome then carries
/// `success = false`, the error, and metrics for the completed chunks
/// only. No retry, no cleanup of partial output.
pub fn convert(request: &ConversionRequest) -> ConversionOutcome {
    let start = Instant::now();
    let mut metrics = ConversionMetrics::default();

    match run(request, &mut metrics, start) {
        Ok(()) => ConversionOutcome {
            success: true,
            metrics,
            error: None,
        },
        Err(err) => {
            error!(error = %err, input = %request.input_path.display(), "conversion failed");
            metrics.total_duration = start.elapsed();
            ConversionOutcome {
                success: false,
                metrics,
                error: Some(err),
            }
        }
    }
}

fn run(request: &ConversionRequest, metrics: &mut ConversionMetrics, start: Instant) -> Result<()> {
    request.validate()?;

    metrics.input_size = std::fs::metadata(&request.input_path)
        .with_context(|| format!("reading input {}", request.input_path.display()))?
        .len();

    let input = File::open(&request.input_path)
        .with_context(|| format!("opening input {}", request.input_path.display()))?;
    let batches = BatchReader::new(BufReader::new(input), request.chunk_size);

    let mut target_schema: Option<SchemaRef> =
        request.schema.as_ref().map(|declared| declared.to_arrow());
    let mut writer: Option<ArrowWriter<File>> = None;

    for (chunk_index, batch) in batches.enumerate() {
        let batch = batch?;
        let chunk_start = Instant::now();

        let normalized = normalize_batch(batch)?;
        let num_rows = normalized.num_rows();

        let compression_start = Instant::now();
        let schema = match &target_schema {
            Some(schema) => schema.clone(),
            None => {
                let inferred = infer_schema(&normalized);
                target_schema = Some(inferred.clone());
                inferred
            }
        };
        let record_batch = to_record_batch(&normalized, &schema)?;

        if writer.is_none() {
            writer = Some(open_writer(request, schema)?);
        }
        if let Some(writer) = writer.as_mut() {
            writer.write(&record_batch)?;
            // Ends the row group so the file holds one per chunk.
            writer.flush()?;
        }

        let compression_time = compression_start.elapsed();
        metrics.compression_time += compression_time;

        let chunk_time = chunk_start.elapsed();
        metrics.chunk_times.push(chunk_time);

        info!(
            chunk = chunk_index + 1,
            rows = num_rows,
            chunk_ms = chunk_time.as_millis() as u64,
            compression_ms = compression_time.as_millis() as u64,
            "chunk written"
        );
    }

    match writer {
        Some(writer) => {
            writer.close()?;
        }
        // Zero records still produce a valid, empty Parquet file. A
        // declared schema carries its columns; otherwise the file has none.
        None => {
            let schema = target_schema.unwrap_or_else(|| Arc::new(Schema::empty()));
            open_writer(request, schema)?.close()?;
        }
    }

    metrics.output_size = std::fs::metadata(&request.output_path)?.len();
    metrics.total_duration = start.elapsed();

    info!(
        total_ms = metrics.total_duration.as_millis() as u64,
        chunks = metrics.chunk_count(),
        avg_chunk_ms = metrics
            .average_chunk_time()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
        compression_ms = metrics.compression_time.as_millis() as u64,
        compression_ratio = metrics.compression_ratio().unwrap_or(0.0),
        "conversion completed"
    );

    Ok(())
}

fn open_writer(request: &ConversionRequest, schema: SchemaRef) -> Result<ArrowWriter<File>> {
    let output = File::create(&request.output_path)
        .with_context(|| format!("creating output {}", request.output_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(request.compression.to_parquet())
        .build();
    ArrowWriter::try_new(output, schema, Some(props)).map_err(Into::into)
}
