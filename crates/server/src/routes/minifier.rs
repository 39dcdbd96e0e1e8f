use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::minify::{self, MinifyLanguage, MinifyStats};
use devtools::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DOC: ToolDoc = ToolDoc {
    key: "minifier",
    title: "Minifier API",
    description: "Code minification tools",
    endpoints: &[("POST /minify", "Minify JavaScript or CSS code")],
};

#[derive(Debug, Default, Deserialize)]
pub struct MinifyRequest {
    pub content: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct MinifyResponse {
    pub minified: String,
    pub stats: MinifyStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

fn failure(error: ServerError, details: Option<Value>) -> ApiError {
    error.with_data(MinifyResponse {
        error: details,
        ..MinifyResponse::default()
    })
}

pub async fn minify(
    payload: Result<Json<MinifyRequest>, JsonRejection>,
) -> Result<Envelope<MinifyResponse>, ApiError> {
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
    let language: MinifyLanguage = language.parse().map_err(|_| {
        failure(
            ServerError::UnsupportedLanguage("Unsupported language".into()),
            Some(json!({ "supportedLanguages": MinifyLanguage::SUPPORTED })),
        )
    })?;

    let minified = minify::minify(&content, language).map_err(|e| {
        let message = match e {
            ToolError::Syntax(_) => "Invalid syntax in provided code",
            _ => "Failed to minify code",
        };
        failure(
            ServerError::from_tool(&e, message),
            Some(json!({ "details": e.detail() })),
        )
    })?;

    Ok(Envelope::new(
        "Code minified successfully",
        MinifyResponse {
            stats: MinifyStats::new(&content, &minified),
            minified,
            error: None,
        },
    ))
}
