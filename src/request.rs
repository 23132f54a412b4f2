//! Conversion request configuration

use crate::{ConvertError, Result, SchemaSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default number of rows processed per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Compression codec applied to every row group of the output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Snappy,
    Gzip,
    Brotli,
    None,
}

impl Compression {
    /// All supported codec identifiers
    pub fn all() -> [Compression; 4] {
        [
            Compression::Snappy,
            Compression::Gzip,
            Compression::Brotli,
            Compression::None,
        ]
    }

    pub(crate) fn to_parquet(self) -> parquet::basic::Compression {
        match self {
            Compression::Snappy => parquet::basic::Compression::SNAPPY,
            Compression::Gzip => {
                parquet::basic::Compression::GZIP(parquet::basic::GzipLevel::default())
            }
            Compression::Brotli => {
                parquet::basic::Compression::BROTLI(parquet::basic::BrotliLevel::default())
            }
            Compression::None => parquet::basic::Compression::UNCOMPRESSED,
        }
    }
}

impl FromStr for Compression {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "snappy" => Ok(Compression::Snappy),
            "gzip" => Ok(Compression::Gzip),
            "brotli" => Ok(Compression::Brotli),
            "none" => Ok(Compression::None),
            other => Err(ConvertError::UnknownCodec(other.to_string())),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::Snappy => "snappy",
            Compression::Gzip => "gzip",
            Compression::Brotli => "brotli",
            Compression::None => "none",
        };
        f.write_str(name)
    }
}

/// Immutable input to one conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Caller-declared output schema. When present it is the unified
    /// target schema for every chunk; when absent the first chunk's
    /// inferred schema becomes the target.
    #[serde(default)]
    pub schema: Option<SchemaSpec>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl ConversionRequest {
    /// Create a request with default compression and chunk size
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            compression: Compression::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            schema: None,
        }
    }

    /// Set the compression codec
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the number of rows processed per chunk
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Declare the output schema instead of inferring it from the first chunk
    pub fn with_schema(mut self, schema: SchemaSpec) -> Self {
        self.schema = Some(schema);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ConvertError::invalid_argument(
                "chunk_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_parsing() {
        assert_eq!("snappy".parse::<Compression>().unwrap(), Compression::Snappy);
        assert_eq!("GZIP".parse::<Compression>().unwrap(), Compression::Gzip);
        assert_eq!("Brotli".parse::<Compression>().unwrap(), Compression::Brotli);
        assert_eq!("none".parse::<Compression>().unwrap(), Compression::None);

        let err = "zstd".parse::<Compression>().unwrap_err();
        assert!(err.to_string().contains("unknown compression codec"));
    }

    #[test]
    fn test_codec_display_roundtrip() {
        for codec in Compression::all() {
            assert_eq!(codec.to_string().parse::<Compression>().unwrap(), codec);
        }
    }

    #[test]
    fn test_request_defaults() {
        let request = ConversionRequest::new("in.jsonl", "out.parquet");
        assert_eq!(request.compression, Compression::Snappy);
        assert_eq!(request.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(request.schema.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let request = ConversionRequest::new("in.jsonl", "out.parquet").with_chunk_size(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_from_json_config() {
        let request: ConversionRequest = serde_json::from_str(
            r#"{"input_path": "in.jsonl", "output_path": "out.parquet", "compression": "gzip"}"#,
        )
        .unwrap();
        assert_eq!(request.compression, Compression::Gzip);
        assert_eq!(request.chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
