//! Unified error types for tempotrace
//!
//! Error strategy:
//! - Per-file errors (decode, analysis, insufficient data): Recoverable, skip and continue
//! - System errors (output, configuration): Fatal, abort batch
//!
//! A degenerate beat set (fewer than two detected beats) is *not* an error;
//! it is modeled as [`crate::types::TempoEstimate::Degenerate`] so callers
//! that tolerate silent or ambient tracks can treat it as a result.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF, OGG";

/// Top-level error type for tempotrace operations
#[derive(Debug, Error)]
pub enum TempotraceError {
    // =========================================================================
    // Recoverable errors - skip file, continue batch
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Analysis failed for '{path}': {reason}")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("Too few BPM samples for tempo-curve synthesis: have {have}, need at least {need}\n  Tip: Sparse or weak rhythmic content yields too few beats to fit a curve")]
    InsufficientData { have: usize, need: usize },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tempotrace operations
pub type Result<T> = std::result::Result<T, TempotraceError>;

impl TempotraceError {
    /// Returns true if this error is recoverable (should skip file, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TempotraceError::DecodeError { .. }
                | TempotraceError::UnsupportedFormat { .. }
                | TempotraceError::AnalysisError { .. }
                | TempotraceError::InsufficientData { .. }
                | TempotraceError::FileNotFound(_)
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TempotraceError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error about which file was being processed
    fn with_file_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn with_file_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| TempotraceError::AnalysisError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_is_recoverable() {
        let err = TempotraceError::InsufficientData { have: 2, need: 3 };
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_output_error_is_fatal() {
        let err = TempotraceError::OutputError {
            path: PathBuf::from("/out"),
            reason: "disk full".to_string(),
        };
        assert!(!err.is_recoverable());
    }
}
