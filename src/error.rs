//! Error types for the card generator

use thiserror::Error;

/// Failures talking to the photo source.
///
/// Clonable so it can ride inside UI messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Network, HTTP status or credential failure
    #[error("{operation} failed: {reason}")]
    Unavailable {
        operation: &'static str,
        reason: String,
    },

    /// The source answered but the payload could not be used
    #[error("Could not decode response: {reason}")]
    Decode { reason: String },
}

impl SourceError {
    pub fn unavailable(operation: &'static str, reason: impl ToString) -> Self {
        SourceError::Unavailable {
            operation,
            reason: reason.to_string(),
        }
    }

    pub fn decode(reason: impl ToString) -> Self {
        SourceError::Decode {
            reason: reason.to_string(),
        }
    }
}

/// Failures on the customize screen
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CardError {
    /// Name is empty after trimming
    #[error("Please enter your name")]
    Validation,

    /// The customize screen was opened without a selected photo
    #[error("No image selected")]
    NoSelection,

    /// Nothing has been rendered yet to export
    #[error("Card preview not found")]
    RenderTargetMissing,

    /// Rasterizing, encoding or writing the card failed
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// An export is already running
    #[error("An export is already in progress")]
    ExportInProgress,
}

/// Unusable configuration values
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
