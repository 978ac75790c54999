//! Error types for document parsing and serialization

use thiserror::Error;

/// Errors that can occur while building or serializing a document tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Malformed markup reported by the XML reader
    #[error("XML parsing error at position {position}: {message}")]
    Parse { position: u64, message: String },

    /// The input contains no element at all
    #[error("Document has no root element")]
    NoRoot,

    /// More than one top-level element
    #[error("Document has more than one root element")]
    MultipleRoots,

    /// Input ended while an element was still open
    #[error("Unclosed element <{0}>")]
    UnclosedElement(String),

    /// Non-whitespace text outside the root element
    #[error("Text content outside the root element")]
    TextOutsideRoot,

    /// Elements nested deeper than the supported limit
    #[error("Elements nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Bytes that are not valid UTF-8
    #[error("Invalid UTF-8 in document")]
    Encoding,

    /// Writing a subtree back to text failed
    #[error("Serialization error: {0}")]
    Write(String),
}
