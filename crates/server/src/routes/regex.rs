use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::pattern::{self, RegexMatch, SUPPORTED_FLAGS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DOC: ToolDoc = ToolDoc {
    key: "regex",
    title: "Regex Testing API",
    description: "Regular expression testing tools",
    endpoints: &[
        ("POST /test", "Test a regex pattern against input text"),
        ("GET /flags", "Get available regex flags and their descriptions"),
    ],
};

#[derive(Debug, Default, Deserialize)]
pub struct TestRequest {
    pub text: Option<String>,
    pub pattern: Option<String>,
    pub flags: Option<String>,
    /// Only affects the reported flag string; scanning is always global.
    pub global: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub matches: Vec<RegexMatch>,
    pub count: usize,
    pub pattern: String,
    pub flags: String,
    pub is_valid: bool,
    pub text: String,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

pub async fn flags() -> Envelope<Value> {
    let flags: Map<String, Value> = SUPPORTED_FLAGS
        .iter()
        .map(|(flag, description)| (flag.to_string(), Value::from(*description)))
        .collect();
    Envelope::new("Available regex flags", json!({ "flags": flags }))
}

pub async fn test(
    payload: Result<Json<TestRequest>, JsonRejection>,
) -> Result<Envelope<TestResponse>, ApiError> {
    let request = body_or_default(payload);

    let (Some(text), Some(pattern)) = (
        request.text.filter(|t| !t.is_empty()),
        request.pattern.filter(|p| !p.is_empty()),
    ) else {
        return Err(ServerError::MissingField("Text and pattern are required".into())
            .with_data(TestResponse::default()));
    };
    let flags = request.flags.unwrap_or_default();

    let (regex, parsed) = match pattern::compile(&pattern, &flags) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::debug!(error = %e, "regex rejected");
            return Err(ServerError::from_tool(&e, "Invalid regex pattern").with_data(
                TestResponse {
                    pattern,
                    flags,
                    text,
                    ..TestResponse::default()
                },
            ));
        }
    };

    let matches = pattern::find_all(&text, &regex, parsed.sticky);
    let reported_flags = if request.global.unwrap_or(true) {
        pattern::effective_flags(&flags)
    } else {
        flags
    };
    let message = if matches.is_empty() {
        "No matches found"
    } else {
        "Matches found"
    };

    Ok(Envelope::new(
        message,
        TestResponse {
            count: matches.len(),
            matches,
            pattern,
            flags: reported_flags,
            is_valid: true,
            text,
        },
    ))
}
