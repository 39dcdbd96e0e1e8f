use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::markdown::{self, MarkdownOptions, TextStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOC: ToolDoc = ToolDoc {
    key: "markdown",
    title: "Markdown Conversion API",
    description: "Markdown conversion tools",
    endpoints: &[("POST /convert", "Convert Markdown to HTML")],
};

#[derive(Debug, Default, Deserialize)]
pub struct ConvertRequest {
    pub markdown: Option<String>,
    #[serde(default)]
    pub options: MarkdownOptions,
}

#[derive(Debug, Default, Serialize)]
pub struct ConvertResponse {
    pub html: String,
    pub stats: TextStats,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

pub async fn convert(
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Envelope<ConvertResponse>, ApiError> {
    let request = body_or_default(payload);
    let Some(source) = request.markdown.filter(|m| !m.is_empty()) else {
        return Err(ServerError::MissingField("Markdown content is required".into())
            .with_data(ConvertResponse::default()));
    };

    let html = markdown::render(&source, request.options);
    Ok(Envelope::new(
        "Markdown converted successfully",
        ConvertResponse {
            html,
            stats: markdown::text_stats(&source),
        },
    ))
}
