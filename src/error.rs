//! Error handling for the photo uploader
//!
//! This module defines the error types used throughout the library,
//! covering both upload-run failures and local validation problems.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, UploaderError>;

/// Error types that can occur while preparing or running an upload
#[derive(Error, Debug)]
pub enum UploaderError {
    /// `start` was called with nothing to upload
    #[error("No photos to upload")]
    EmptyQueue,

    /// `start` was called while another run is still active
    #[error("An upload is already running")]
    AlreadyRunning,

    /// Reading, decoding or re-encoding a photo failed
    #[error("Failure while resizing image: {message}")]
    ResizeFailure { message: String },

    /// The request never produced a response
    #[error("Transport error: {message}")]
    TransportFailure { message: String },

    /// The remote API answered with an application-level error
    #[error("Server returned an error: {message} (code {code})")]
    ServerError { code: i64, message: String },

    /// The response body could not be parsed
    #[error("Failed to parse response: {message}")]
    MalformedResponse { message: String, body: String },

    /// Applying tags to an uploaded photo failed
    #[error("Error during tagging: {message}")]
    TagFailure { message: String },

    /// Invalid parameter
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploaderError {
    /// Create a new resize failure
    pub fn resize_failure(message: impl Into<String>) -> Self {
        UploaderError::ResizeFailure {
            message: message.into(),
        }
    }

    /// Create a new transport failure
    pub fn transport_failure(message: impl Into<String>) -> Self {
        UploaderError::TransportFailure {
            message: message.into(),
        }
    }

    /// Create a new server error
    pub fn server_error(code: i64, message: impl Into<String>) -> Self {
        UploaderError::ServerError {
            code,
            message: message.into(),
        }
    }

    /// Create a new malformed response error, keeping the raw body
    pub fn malformed_response(message: impl Into<String>, body: impl Into<String>) -> Self {
        UploaderError::MalformedResponse {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create a new tagging failure
    pub fn tag_failure(message: impl Into<String>) -> Self {
        UploaderError::TagFailure {
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        UploaderError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        UploaderError::ConfigError {
            message: message.into(),
        }
    }

    /// Stable code for presenting the error to a user
    pub fn kind(&self) -> &'static str {
        match self {
            UploaderError::EmptyQueue => "E_EMPTY_QUEUE",
            UploaderError::AlreadyRunning => "E_ALREADY_RUNNING",
            UploaderError::ResizeFailure { .. } => "E_RESIZE",
            UploaderError::TransportFailure { .. } => "E_TRANSPORT",
            UploaderError::ServerError { .. } => "E_SERVER",
            UploaderError::MalformedResponse { .. } => "E_MALFORMED_RESPONSE",
            UploaderError::TagFailure { .. } => "E_TAG",
            UploaderError::InvalidParameter { .. } => "E_INVALID_PARAMETER",
            UploaderError::ConfigError { .. } => "E_CONFIG",
            UploaderError::Io(_) => "E_IO",
            UploaderError::Json(_) => "E_JSON",
        }
    }

    /// Whether this error ends a run (as opposed to rejecting `start`)
    pub fn is_run_failure(&self) -> bool {
        !matches!(
            self,
            UploaderError::EmptyQueue | UploaderError::AlreadyRunning
        )
    }
}

impl From<reqwest::Error> for UploaderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploaderError::transport_failure(format!("request timed out: {}", err))
        } else {
            UploaderError::transport_failure(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = UploaderError::resize_failure("bad png");
        assert!(matches!(err, UploaderError::ResizeFailure { .. }));

        let err = UploaderError::server_error(100, "Invalid parameter");
        assert!(matches!(err, UploaderError::ServerError { code: 100, .. }));

        let err = UploaderError::malformed_response("not json", "<html>");
        match err {
            UploaderError::MalformedResponse { body, .. } => assert_eq!(body, "<html>"),
            _ => panic!("Expected MalformedResponse"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = UploaderError::server_error(321, "Album is full");
        assert_eq!(
            err.to_string(),
            "Server returned an error: Album is full (code 321)"
        );

        let err = UploaderError::EmptyQueue;
        assert_eq!(err.to_string(), "No photos to upload");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(UploaderError::AlreadyRunning.kind(), "E_ALREADY_RUNNING");
        assert_eq!(UploaderError::tag_failure("x").kind(), "E_TAG");
        assert!(!UploaderError::EmptyQueue.is_run_failure());
        assert!(UploaderError::transport_failure("reset").is_run_failure());
    }
}
