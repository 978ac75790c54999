//! Error types for schema inference and extraction

use thiserror::Error;

use crate::document::DocumentError;

/// Errors that can occur while inferring a schema or extracting rows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The input could not be parsed as a document
    #[error("Invalid document: {0}")]
    DocumentInvalid(String),

    /// The input is larger than the configured maximum
    #[error("Document size {size} exceeds maximum of {max} bytes")]
    SizeLimitExceeded { size: usize, max: usize },

    /// Explicit column names and types disagree in length
    #[error("Schema has {names} column names but {types} column types")]
    SchemaMismatch { names: usize, types: usize },

    /// Reading a source failed
    #[error("IO error: {0}")]
    Io(String),

    /// A subtree could not be written back to text
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DocumentError> for SchemaError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Write(message) => SchemaError::Serialization(message),
            other => SchemaError::DocumentInvalid(other.to_string()),
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(e: std::io::Error) -> Self {
        SchemaError::Io(e.to_string())
    }
}
