//! Error types for the codec and the store.

use crate::schema::{RecordType, WireKind};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for codec and store operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record is missing a required field and cannot be encoded or built.
    #[error("Schema violation: {record} is missing required field `{field}`")]
    SchemaViolation {
        record: RecordType,
        field: &'static str,
    },

    /// A known tag arrived with a wire kind its schema kind does not allow.
    #[error("Schema mismatch: {record} field `{field}` (tag {tag}) expects {expected:?}, got {found:?}")]
    SchemaMismatch {
        record: RecordType,
        field: &'static str,
        tag: u32,
        expected: WireKind,
        found: WireKind,
    },

    /// Input was exhausted without a required field being seen.
    #[error("Truncated record: {record} ended without required field `{field}`")]
    TruncatedRecord {
        record: RecordType,
        field: &'static str,
    },

    /// Bytes that do not form a valid key/payload stream.
    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("Corrupt store {}: {reason}", path.display())]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }
}

/// Result type for codec and store operations.
pub type Result<T> = std::result::Result<T, Error>;
