use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::beautify::{self, BeautifyLanguage, BeautifyOptions, BeautifyStats};
use devtools::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DOC: ToolDoc = ToolDoc {
    key: "beautifier",
    title: "Code Beautifier API",
    description: "Code formatting tools",
    endpoints: &[("POST /format", "Format code (JavaScript, JSON, or CSS)")],
};

#[derive(Debug, Default, Deserialize)]
pub struct FormatRequest {
    pub content: Option<String>,
    pub language: Option<String>,
    /// Kept raw so a bad option is reported as such.
    pub options: Option<Value>,
}

#[derive(Debug, Default, Serialize)]
pub struct FormatResponse {
    pub formatted: String,
    pub stats: BeautifyStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

fn failure(error: ServerError, details: Option<Value>) -> ApiError {
    error.with_data(FormatResponse {
        error: details,
        ..FormatResponse::default()
    })
}

pub async fn format(
    payload: Result<Json<FormatRequest>, JsonRejection>,
) -> Result<Envelope<FormatResponse>, ApiError> {
    let request = body_or_default(payload);

    let Some(content) = request.content.filter(|c| !c.is_empty()) else {
        return Err(failure(
            ServerError::MissingField("Content is required".into()),
            None,
        ));
    };
    let Some(language) = request.language.filter(|l| !l.is_empty()) else {
        return Err(failure(
            ServerError::MissingField("Language is required".into()),
            None,
        ));
    };
    let language: BeautifyLanguage = language.parse().map_err(|_| {
        failure(
            ServerError::UnsupportedLanguage("Unsupported language".into()),
            Some(json!({ "supportedLanguages": BeautifyLanguage::SUPPORTED })),
        )
    })?;

    let options: BeautifyOptions = match request.options {
        None | Some(Value::Null) => BeautifyOptions::default(),
        Some(raw) => serde_json::from_value(raw).map_err(|e| {
            failure(
                ServerError::InvalidFormat("Invalid formatting options".into()),
                Some(json!({ "details": e.to_string() })),
            )
        })?,
    };

    let formatted = beautify::beautify(&content, language, &options).map_err(|e| {
        let message = match e {
            ToolError::Syntax(_) => "Invalid syntax in provided code",
            _ => "Failed to process code",
        };
        failure(
            ServerError::from_tool(&e, message),
            Some(json!({ "details": e.detail() })),
        )
    })?;

    Ok(Envelope::new(
        "Code formatted successfully",
        FormatResponse {
            stats: BeautifyStats::new(&content, &formatted),
            formatted,
            error: None,
        },
    ))
}
