//! Streaming JSON-Lines to Parquet conversion
//!
//! `jsonl-parquet` converts a JSONL file to a Parquet file in a single
//! forward pass, processing the input in bounded-size chunks so memory
//! use is O(chunk size) rather than O(input size).
//!
//! # Key Components
//!
//! - **Conversion**: the one-shot pipeline through [`convert`]
//!   - One row group appended per chunk, in input order
//!   - Snappy, gzip, brotli or uncompressed row groups
//!   - Timing and size metrics in [`ConversionMetrics`]
//!
//! - **Normalization**: per-chunk schema flattening
//!   - Nested objects expand into `<parent>.<leafpath>` columns
//!   - Arrays are stringified to their JSON text
//!   - Column shapes decided by scanning the whole chunk
//!
//! - **Schema**: unified output schema across chunks
//!   - Inferred from the first chunk, or declared via [`SchemaSpec`]
//!   - Later chunks are coerced to it; conflicts surface as typed
//!     schema-mismatch errors rather than storage-layer failures
//!
//! - **Reader**: sequential read-back through [`Reader`] for verifying
//!   converted files
//!
//! # Example
//!
//! ```no_run
//! use jsonl_parquet::{convert, Compression, ConversionRequest};
//!
//! let request = ConversionRequest::new("events.jsonl", "events.parquet")
//!     .with_compression(Compression::Gzip)
//!     .with_chunk_size(50_000);
//!
//! let outcome = convert(&request);
//! if outcome.success {
//!     println!("wrote {} bytes", outcome.metrics.output_size);
//! }
//! ```
//!
//! The crate emits `tracing` events (per-chunk and summary lines at info
//! level, failures at error level) and never installs a subscriber; the
//! embedding application owns the logging sink.

pub mod batch;
pub mod convert;
mod encode;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod reader;
pub mod request;
pub mod schema;

pub use batch::{BatchReader, RowBatch};
pub use convert::{convert, ConversionOutcome};
pub use error::{ConvertError, ErrorContext, Result};
pub use metrics::ConversionMetrics;
pub use normalize::{normalize_batch, NormalizedBatch, ScalarValue};
pub use reader::{Reader, RowIterator};
pub use request::{Compression, ConversionRequest, DEFAULT_CHUNK_SIZE};
pub use schema::{ColumnSpec, ColumnType, SchemaBuilder, SchemaSpec};
