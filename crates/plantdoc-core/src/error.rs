//! Error Types

use thiserror::Error;

/// Result type alias for classification operations
pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Shown when a selected file is not an image
pub const INVALID_FILE_MESSAGE: &str = "Please select a valid image file.";

/// Shown for every failed classification request
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to analyze the image. Please try again.";

/// Classification error types
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Selected file does not carry an `image/*` media type
    #[error("Invalid file type: {0:?}")]
    InvalidFileType(String),

    /// Request could not be sent or the connection dropped
    #[error("Transport error: {0}")]
    Transport(String),

    /// Inference endpoint answered with a non-success status
    #[error("Inference endpoint returned status {0}")]
    Status(u16),

    /// Response body was not the expected JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// Response carried neither `prediction` nor `data`
    #[error("Response contained no prediction")]
    MissingPrediction,

    /// Client-side timeout elapsed
    #[error("Request timed out")]
    Timeout,
}

impl ClassifyError {
    /// Check if retrying the same submission could succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout | Self::Status(500..=599)
        )
    }

    /// Convert to the message shown to the user
    ///
    /// Request failures collapse to one fixed message; the detail only goes
    /// to the logs.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) => INVALID_FILE_MESSAGE,
            _ => REQUEST_FAILED_MESSAGE,
        }
    }
}
