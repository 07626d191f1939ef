//! Error types for codec operations.

use crate::model::TermError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Position in a text document, for syntax diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl TextPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position at start of document
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Failure while decoding a wire payload into the in-memory representation.
///
/// Malformed input always surfaces as an error; decoders never truncate a
/// payload into a partial result.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("syntax error: {message} at {position}")]
    Syntax {
        message: String,
        position: TextPosition,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid term: {0}")]
    Term(#[from] TermError),
    #[error("malformed result document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed result document: {0}")]
    Structure(String),
    #[error("unsupported syntax: {0}")]
    UnsupportedSyntax(String),
}

impl DecodeError {
    /// Create a syntax error at a position
    pub fn syntax(message: impl Into<String>, position: TextPosition) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Create a structural error for a malformed result document
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    /// Create an unsupported-syntax error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedSyntax(message.into())
    }
}

/// Failure while encoding the in-memory representation into a display format.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("unsupported syntax: {0}")]
    UnsupportedSyntax(String),
}

impl EncodeError {
    /// Create an invalid-data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }
}

/// Result type for decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for encoding operations
pub type EncodeResult<T> = Result<T, EncodeError>;
