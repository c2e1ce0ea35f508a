//! Error types and result aliases for subtidy.
//!
//! Two terminal error kinds exist for a document:
//! - [`ParseError`]: the token stream cannot be turned into a document
//! - [`RenderError`]: the document violates a data-model invariant
//!
//! Recoverable anomalies (stray or missing commas) are not errors; they are
//! reported through the diagnostic sink and parsing continues.
//!
//! The crate-wide [`Result<T>`] alias is `anyhow::Result<T>`, used by the
//! CLI and process layers.

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// A hard parse failure, carrying the source position of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}:{line}:{col} {message}")]
pub struct ParseError {
    /// File name (or "stdin") the input came from
    pub source_name: String,
    /// 1-based line number
    pub line: usize,
    /// Column of the offending token
    pub col: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(
        source_name: impl Into<String>,
        line: usize,
        col: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            line,
            col,
            message: message.into(),
        }
    }
}

/// A failure while rendering a parsed document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An actual row's item count does not match the formal row.
    #[error("row {row:?} has {actual} items, {expected} expected")]
    RowLength {
        row: Vec<String>,
        actual: usize,
        expected: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
