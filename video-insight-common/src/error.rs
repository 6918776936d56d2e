//! Error types for the common library.
//!
//! This module provides a unified error hierarchy using `thiserror` for
//! consistent error handling across the download, upload, and analysis steps.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration
//! - `Error::Download`: The video downloader failed or could not be started
//! - `Error::Api`: Gemini API errors (includes endpoint and status)
//! - `Error::FileNotReady`: An uploaded file did not reach the `ACTIVE` state
//! - `Error::Validation`: Input validation failures
//! - `Error::Io`: File system operations

use thiserror::Error;

/// Remote file state that is still worth waiting on.
const PROCESSING_STATE: &str = "PROCESSING";

/// Unified error type for the common library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Video download errors (downloader missing, non-zero exit)
    #[error("Download error: {0}")]
    Download(String),

    /// API errors with endpoint and HTTP status context
    ///
    /// Includes the API endpoint that failed, HTTP status code, and error message
    /// for debugging and user feedback.
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// The uploaded video never became usable for inference.
    #[error("The uploaded video file is not in an ACTIVE state (current state: {state})")]
    FileNotReady {
        /// Last state reported by the Files API
        state: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use video_insight_common::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://generativelanguage.googleapis.com/v1beta/files/abc",
    ///     500,
    ///     "Internal server error"
    /// );
    /// assert!(err.to_string().contains("generativelanguage"));
    /// assert!(err.to_string().contains("500"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new download error.
    pub fn download(message: impl Into<String>) -> Self {
        Error::Download(message.into())
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use video_insight_common::error::Error;
    ///
    /// let err = Error::validation("question cannot be empty");
    /// assert!(err.to_string().contains("question cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Create a new not-ready error for the given remote state.
    ///
    /// # Example
    ///
    /// ```
    /// use video_insight_common::error::Error;
    ///
    /// let err = Error::file_not_ready("FAILED");
    /// assert!(err.to_string().contains("FAILED"));
    /// assert!(!err.is_transient());
    /// ```
    pub fn file_not_ready(state: impl Into<String>) -> Self {
        Error::FileNotReady {
            state: state.into(),
        }
    }

    /// Whether the condition could clear up on its own.
    ///
    /// Only a file that was still processing when the poll budget ran out is
    /// transient. A failed file, a bad request, or a broken download is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::FileNotReady { state } if state == PROCESSING_STATE)
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
