//! Error types for the API client.
//!
//! Every service call returns [`Result`]. Callers that want the backend-style
//! `{success, data, error}` object convert with [`ServiceResponse::from`].

use serde::Serialize;
use thiserror::Error;

/// Message used whenever a payload matches none of the known envelopes.
pub const UNEXPECTED_FORMAT: &str = "Unexpected response format from API";

/// API client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-2xx status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Payload matched none of the recognised envelopes
    #[error("{}", UNEXPECTED_FORMAT)]
    UnexpectedFormat,

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Auth service rejected the request
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Local token storage failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Uniform result object handed to presentation code.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<Result<T>> for ServiceResponse<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => ServiceResponse {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => ServiceResponse {
                success: false,
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}
