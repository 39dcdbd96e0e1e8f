use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::json as json_tool;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DOC: ToolDoc = ToolDoc {
    key: "json",
    title: "JSON Tools API",
    description: "JSON formatting and validation tools",
    endpoints: &[
        (
            "POST /format",
            "Format and validate JSON with optional prettify/minify",
        ),
        ("POST /validate", "Validate JSON structure"),
    ],
};

/// `json` is either document text or an already-parsed document.
#[derive(Debug, Default, Deserialize)]
pub struct FormatRequest {
    pub json: Option<Value>,
    pub spaces: Option<usize>,
    pub minify: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    pub json: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResponse {
    pub formatted: String,
    pub original_size: usize,
    pub formatted_size: usize,
    pub minified: bool,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

fn required_source(json: Option<Value>) -> Result<String, ApiError> {
    match json {
        Some(value) if !json_tool::is_blank(&value) => Ok(json_tool::source_text(&value)),
        _ => Err(ServerError::MissingField("JSON input is required".into())
            .with_data(json!({ "valid": false }))),
    }
}

pub async fn format(
    payload: Result<Json<FormatRequest>, JsonRejection>,
) -> Result<Envelope<FormatResponse>, ApiError> {
    let request = body_or_default(payload);
    let source = required_source(request.json)?;

    let parsed = json_tool::validate(&source).map_err(|error| {
        ServerError::InvalidFormat("Invalid JSON input".into())
            .with_data(json!({ "valid": false, "error": error }))
    })?;

    let minify = request.minify.unwrap_or(false);
    let spaces = request.spaces.unwrap_or(json_tool::DEFAULT_INDENT);
    let formatted = json_tool::format(&parsed, spaces, minify).map_err(|e| {
        ServerError::TransformFailure("Error formatting JSON".into())
            .with_data(json!({ "error": e.detail() }))
    })?;

    Ok(Envelope::new(
        "JSON formatted successfully",
        FormatResponse {
            original_size: source.chars().count(),
            formatted_size: formatted.chars().count(),
            formatted,
            minified: minify,
        },
    ))
}

/// Validation never fails the request: an invalid document is a 200 with
/// `valid: false`.
pub async fn validate(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Envelope<ValidateResponse>, ApiError> {
    let request = body_or_default(payload);
    let source = required_source(request.json)?;

    let envelope = match json_tool::validate(&source) {
        Ok(parsed) => Envelope::new(
            "JSON is valid",
            ValidateResponse {
                valid: true,
                error: None,
                parsed: Some(parsed),
            },
        ),
        Err(error) => Envelope::new(
            "JSON is invalid",
            ValidateResponse {
                valid: false,
                error: Some(error),
                parsed: None,
            },
        ),
    };
    Ok(envelope)
}
