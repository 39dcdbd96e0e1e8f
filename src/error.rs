use thiserror::Error;

/// Errors produced by the tool transforms.
///
/// The first four kinds are raised while checking caller input and never reach
/// a transform. `Syntax` is a parse failure inside the caller's source text.
/// `TransformFailure` and `UpstreamFailure` are runtime failures of the
/// transform or of the remote lookup service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid type: {0}")]
    InvalidType(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("transform failed: {0}")]
    TransformFailure(String),
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),
}

impl ToolError {
    /// The message without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            ToolError::MissingField(msg)
            | ToolError::InvalidType(msg)
            | ToolError::InvalidFormat(msg)
            | ToolError::UnsupportedLanguage(msg)
            | ToolError::Syntax(msg)
            | ToolError::TransformFailure(msg)
            | ToolError::UpstreamFailure(msg) => msg,
        }
    }

    /// True for failures detected before any transform runs.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ToolError::MissingField(_)
                | ToolError::InvalidType(_)
                | ToolError::InvalidFormat(_)
                | ToolError::UnsupportedLanguage(_)
                | ToolError::Syntax(_)
        )
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
