//! Error types for the correction library.
//!
//! Errors are split into two groups: per-file errors that only skip the
//! offending upload, and request-level errors that abort the whole batch.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for correction operations.
pub type HyokiResult<T> = Result<T, HyokiError>;

/// Error type for all correction operations.
#[derive(Debug, Error)]
pub enum HyokiError {
    /// Declared MIME type matches neither DOCX nor Markdown/plain text
    #[error("Unsupported file type: {mime}")]
    UnsupportedFileType { mime: String },

    /// Uploaded bytes could not be parsed as the declared format
    #[error("Failed to decode {format} input: {reason}")]
    Decode { format: String, reason: String },

    /// Writing the output archive or document package failed
    #[error("Archive error: {reason}")]
    Archive { reason: String },

    /// Invalid request parameters
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Config error for '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HyokiError {
    pub fn decode(format: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    pub fn archive(reason: impl ToString) -> Self {
        Self::Archive {
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error only concerns a single uploaded file and the
    /// rest of the batch can still be processed.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::UnsupportedFileType { .. } | Self::Decode { .. })
    }
}

impl From<zip::result::ZipError> for HyokiError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::archive(err)
    }
}
