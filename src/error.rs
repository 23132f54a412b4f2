use thiserror::Error;

/// Core error type for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow errors from record batch construction
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet format errors
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// A line that is not parseable as JSON
    #[error("malformed JSON on line {line}: {source}")]
    MalformedLine {
        line: u64,
        source: serde_json::Error,
    },

    /// A line that parses but is not a JSON object
    #[error("line {line}: expected a JSON object, found {found}")]
    NotAnObject { line: u64, found: &'static str },

    /// A column that holds nested objects in some records and
    /// scalars or arrays in others within the same chunk
    #[error("column '{column}' mixes nested objects with non-object values in one chunk")]
    MixedColumn { column: String },

    /// Schema mismatch between a chunk and the output file schema
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Invalid argument errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown compression codec identifier
    #[error("unknown compression codec: {0}")]
    UnknownCodec(String),

    /// Column types the read-back path does not handle
    #[error("unsupported column type: {0}")]
    Unsupported(String),

    /// Errors wrapped with call-site context
    #[error("{0}")]
    Context(String),
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    /// Create a new schema mismatch error
    pub fn schema_mismatch<S: Into<String>>(msg: S) -> Self {
        ConvertError::SchemaMismatch(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ConvertError::InvalidArgument(msg.into())
    }

    /// Create a new unsupported type error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        ConvertError::Unsupported(msg.into())
    }
}

/// Extension trait to add context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, ctx: S) -> Result<T>;

    /// Add context with a closure that's only called on error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ConvertError>,
{
    fn context<S: Into<String>>(self, ctx: S) -> Result<T> {
        self.map_err(|e| {
            let base = e.into();
            ConvertError::Context(format!("{}: {}", ctx.into(), base))
        })
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let base = e.into();
            ConvertError::Context(format!("{}: {}", f().into(), base))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ConvertError::schema_mismatch("column 'b' not in file schema");
        assert_eq!(
            err.to_string(),
            "schema mismatch: column 'b' not in file schema"
        );

        let err = ConvertError::invalid_argument("chunk_size must be positive");
        assert_eq!(
            err.to_string(),
            "invalid argument: chunk_size must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConvertError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(ConvertError::invalid_argument("bad input"))
        }

        let result = failing_operation().context("while opening input");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("while opening input"));
    }

    #[test]
    fn test_error_with_context() {
        fn failing_operation() -> Result<()> {
            Err(ConvertError::unsupported("Dictionary"))
        }

        let path = "out.parquet";
        let result = failing_operation().with_context(|| format!("reading {}", path));

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("reading out.parquet"));
    }
}
