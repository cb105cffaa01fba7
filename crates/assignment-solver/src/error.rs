//! Error types for the assignment solver

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::interpreter::InterpretError;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a call to the model provider failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamReason {
    /// The provider rejected the credential
    InvalidCredential,
    /// The provider rejected the configured model name
    UnsupportedModel,
    /// Any other transport or response failure, including timeouts
    Unknown,
}

impl UpstreamReason {
    /// Stable string form used in error payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::UnsupportedModel => "unsupported_model",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for UpstreamReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solver errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request itself is unusable (missing or empty fields)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A file rule failed; wraps the rule's own error
    #[error("Error processing file '{filename}': {source}")]
    FileProcessing {
        filename: String,
        #[source]
        source: InterpretError,
    },

    /// Model provider failure
    #[error("Model provider error ({reason}): {message}")]
    Upstream {
        reason: UpstreamReason,
        message: String,
    },

    /// Config file error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an upstream error
    pub fn upstream(reason: UpstreamReason, message: impl Into<String>) -> Self {
        Self::Upstream {
            reason,
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Machine-readable error kind for the response body
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::BadRequest(_) => "bad_request",
            Error::FileProcessing { source, .. } => source.kind(),
            Error::Upstream { .. } => "upstream_error",
            Error::Toml(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Every failure class shares one status code; clients tell them apart by `type`.
        let mut error = json!({ "type": self.kind() });
        if let Error::Upstream { reason, .. } = &self {
            error["reason"] = json!(reason.as_str());
        }

        tracing::warn!(kind = self.kind(), "Request failed: {}", self);

        let body = Json(json!({
            "detail": self.to_string(),
            "error": error,
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_reason_strings() {
        assert_eq!(UpstreamReason::InvalidCredential.as_str(), "invalid_credential");
        assert_eq!(UpstreamReason::UnsupportedModel.as_str(), "unsupported_model");
        assert_eq!(UpstreamReason::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_file_processing_keeps_cause() {
        let err = Error::FileProcessing {
            filename: "sales.csv".to_string(),
            source: InterpretError::MalformedInput("missing column 'Product'".to_string()),
        };
        assert_eq!(err.kind(), "malformed_input");
        assert!(err.to_string().contains("sales.csv"));
        assert!(err.to_string().contains("missing column 'Product'"));
    }

    #[test]
    fn test_every_error_is_bad_request() {
        let errors = vec![
            Error::Config("x".to_string()),
            Error::bad_request("x"),
            Error::upstream(UpstreamReason::Unknown, "x"),
            Error::internal("x"),
        ];
        for err in errors {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }
}
