//! Error types and location tracking for CSV parsing and field conversion
//!
//! Every failure in this crate is reported to the immediate caller. Nothing
//! here is fatal to the process; the caller decides whether a bad field
//! aborts the whole load or only skips the offending row.

use std::fmt;
use thiserror::Error;

/// Identifies a single cell in a parsed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Row number (1-based, counted over non-empty lines)
    pub row: usize,
    /// Column index (0-based)
    pub column: usize,
}

impl Location {
    /// Creates a location for the given row and column
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Returns the location of the next column on the same row
    pub fn next_column(self) -> Self {
        Self {
            row: self.row,
            column: self.column + 1,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self { row: 1, column: 0 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Main error type for document loading operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// I/O error while reading a source file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Field text could not be converted to the requested type
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Header or record lookup failed
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Serde deserialization error
    #[error("Serde error: {0}")]
    Serde(#[from] SerdeError),
}

/// The kinds of conversion failure, without their payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertErrorKind {
    EmptyInput,
    Format,
    Overflow,
    MalformedElement,
    DuplicateKey,
}

/// Text-to-value conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Numeric conversion of empty text
    #[error("Empty input in conversion to {target}")]
    EmptyInput { target: &'static str },

    /// Non-numeric text or trailing garbage after a number
    #[error("Invalid format '{text}': {message}")]
    Format { text: String, message: String },

    /// Value does not fit in the target type
    #[error("Numeric overflow converting '{text}' to {target}")]
    Overflow { text: String, target: &'static str },

    /// An array or map element did not split into the expected parts
    #[error("Malformed element '{element}': expected {expected}")]
    MalformedElement { element: String, expected: String },

    /// A map field repeats a key
    #[error("Duplicate key '{key}'")]
    DuplicateKey { key: String },
}

impl ConvertError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ConvertErrorKind {
        match self {
            ConvertError::EmptyInput { .. } => ConvertErrorKind::EmptyInput,
            ConvertError::Format { .. } => ConvertErrorKind::Format,
            ConvertError::Overflow { .. } => ConvertErrorKind::Overflow,
            ConvertError::MalformedElement { .. } => ConvertErrorKind::MalformedElement,
            ConvertError::DuplicateKey { .. } => ConvertErrorKind::DuplicateKey,
        }
    }

    pub(crate) fn format(text: &[u8], message: impl Into<String>) -> Self {
        ConvertError::Format {
            text: String::from_utf8_lossy(text).into_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn overflow(text: &[u8], target: &'static str) -> Self {
        ConvertError::Overflow {
            text: String::from_utf8_lossy(text).into_owned(),
            target,
        }
    }

    pub(crate) fn malformed(element: &[u8], expected: impl Into<String>) -> Self {
        ConvertError::MalformedElement {
            element: String::from_utf8_lossy(element).into_owned(),
            expected: expected.into(),
        }
    }

    pub(crate) fn duplicate(key: &[u8]) -> Self {
        ConvertError::DuplicateKey {
            key: String::from_utf8_lossy(key).into_owned(),
        }
    }
}

/// Header and record lookup errors
#[derive(Debug, Error)]
pub enum RecordError {
    /// The table has no row at the configured header position
    #[error("Missing header row {row}")]
    MissingHeader { row: usize },

    /// A required column is not present in the header
    #[error("Missing column '{name}'")]
    MissingColumn { name: String },

    /// A key/value table has no entry for the key
    #[error("Missing key '{key}'")]
    MissingKey { key: String },

    /// The header names the same column twice
    #[error("Duplicate column '{name}'")]
    DuplicateColumn { name: String },

    /// A field failed to convert
    #[error("Invalid field '{column}' at {location}: {source}")]
    Field {
        column: String,
        location: Location,
        #[source]
        source: ConvertError,
    },
}

/// Serde-specific errors
#[derive(Debug, Error)]
pub enum SerdeError {
    /// Custom error message raised by a `Deserialize` impl
    #[error("{0}")]
    Custom(String),

    /// The field shape does not match what the target type asked for
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The target type requested a shape this format cannot represent
    #[error("Unsupported type: {0}")]
    Unsupported(&'static str),
}

impl serde::de::Error for CsvError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CsvError::Serde(SerdeError::Custom(msg.to_string()))
    }
}

impl serde::de::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}
