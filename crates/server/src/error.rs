use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devtools::ToolError;
use serde::Serialize;
use serde_json::{json, Value};

use crate::envelope::Envelope;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// The display string of every variant is the envelope `message` sent to the
/// client, so variants carry the full caller-facing text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    MissingField(String),

    #[error("{0}")]
    InvalidType(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    UnsupportedLanguage(String),

    #[error("{0}")]
    Syntax(String),

    #[error("{0}")]
    TransformFailure(String),

    #[error("{0}")]
    UpstreamFailure(String),

    #[error("Not Found - {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingField(_)
            | ServerError::InvalidType(_)
            | ServerError::InvalidFormat(_)
            | ServerError::UnsupportedLanguage(_)
            | ServerError::Syntax(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::TransformFailure(_)
            | ServerError::UpstreamFailure(_)
            | ServerError::Config(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::MissingField(_) => "MISSING_FIELD",
            ServerError::InvalidType(_) => "INVALID_TYPE",
            ServerError::InvalidFormat(_) => "INVALID_FORMAT",
            ServerError::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            ServerError::Syntax(_) => "SYNTAX_ERROR",
            ServerError::TransformFailure(_) => "TRANSFORM_FAILURE",
            ServerError::UpstreamFailure(_) => "UPSTREAM_FAILURE",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Re-label a library error with a route-specific message, keeping its
    /// kind (and so its status code).
    pub fn from_tool(err: &ToolError, message: impl Into<String>) -> Self {
        let message = message.into();
        match err {
            ToolError::MissingField(_) => ServerError::MissingField(message),
            ToolError::InvalidType(_) => ServerError::InvalidType(message),
            ToolError::InvalidFormat(_) => ServerError::InvalidFormat(message),
            ToolError::UnsupportedLanguage(_) => ServerError::UnsupportedLanguage(message),
            ToolError::Syntax(_) => ServerError::Syntax(message),
            ToolError::TransformFailure(_) => ServerError::TransformFailure(message),
            ToolError::UpstreamFailure(_) => ServerError::UpstreamFailure(message),
        }
    }

    /// Attach the route's `data` payload.
    pub fn with_data(self, data: impl Serialize) -> ApiError {
        ApiError::new(self, data)
    }
}

impl From<ToolError> for ServerError {
    fn from(err: ToolError) -> Self {
        let message = err.detail().to_string();
        ServerError::from_tool(&err, message)
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

/// A failed request: the error plus the zero-value `data` its route reports.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServerError,
    pub data: Value,
}

impl ApiError {
    pub fn new(error: ServerError, data: impl Serialize) -> Self {
        let data = serde_json::to_value(data).unwrap_or_else(|_| json!({}));
        Self { error, data }
    }
}

impl From<ServerError> for ApiError {
    fn from(error: ServerError) -> Self {
        Self {
            error,
            data: json!({}),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let message = self.error.to_string();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                code = self.error.error_code(),
                message = %message,
                "request failed"
            );
        } else {
            tracing::debug!(
                status = %status,
                code = self.error.error_code(),
                message = %message,
                "request rejected"
            );
        }

        (status, Envelope::new(message, self.data)).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
