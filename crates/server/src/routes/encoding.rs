use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::encoding::{self, Operation, UrlMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOC: ToolDoc = ToolDoc {
    key: "encoding",
    title: "Encoding Tools API",
    description: "Text encoding and decoding tools",
    endpoints: &[
        ("POST /base64", "Encode or decode Base64 strings"),
        (
            "POST /url",
            "Encode or decode URLs (supports full URL and component encoding)",
        ),
    ],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64Request {
    pub input: Option<String>,
    pub operation: Option<String>,
    pub input_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlRequest {
    pub url: Option<String>,
    pub operation: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub result: String,
    pub input_size: usize,
    pub output_size: usize,
    pub operation: String,
    pub input_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub result: String,
    pub input_size: usize,
    pub output_size: usize,
    pub operation: String,
    pub mode: String,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

const INVALID_OPERATION: &str = "Invalid operation. Use \"encode\" or \"decode\"";

pub async fn base64(
    payload: Result<Json<Base64Request>, JsonRejection>,
) -> Result<Envelope<Base64Response>, ApiError> {
    let request = body_or_default(payload);
    let input_type = request.input_type.unwrap_or_else(|| "text".into());

    let failed = |error: &str, input_size: usize, operation: &str, input_type: &str| Base64Response {
        error: Some(error.to_string()),
        result: String::new(),
        input_size,
        output_size: 0,
        operation: operation.to_string(),
        input_type: input_type.to_string(),
    };

    let Some(input) = request.input.filter(|i| !i.is_empty()) else {
        return Err(ServerError::MissingField("Input must be a non-empty string".into())
            .with_data(failed("Invalid input format", 0, "encode", "text")));
    };
    let input_size = input.chars().count();

    let raw_operation = request.operation.unwrap_or_default();
    let Ok(operation) = raw_operation.parse::<Operation>() else {
        let echoed = if raw_operation.is_empty() { "encode" } else { raw_operation.as_str() };
        return Err(ServerError::InvalidFormat(INVALID_OPERATION.into()).with_data(failed(
            "Invalid operation type",
            input_size,
            echoed,
            &input_type,
        )));
    };

    let result = match operation {
        Operation::Encode => encoding::encode_base64(input.as_bytes()),
        Operation::Decode => encoding::decode_base64_text(&input).map_err(|_| {
            ServerError::InvalidFormat("Invalid base64 string provided".into()).with_data(failed(
                "Input is not a valid base64 string",
                input_size,
                "decode",
                &input_type,
            ))
        })?,
    };

    Ok(Envelope::new(
        format!("Base64 {operation} successful"),
        Base64Response {
            error: None,
            input_size,
            output_size: result.chars().count(),
            result,
            operation: operation.to_string(),
            input_type,
        },
    ))
}

pub async fn url(
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Envelope<UrlResponse>, ApiError> {
    let request = body_or_default(payload);
    let mode_label = request.mode.unwrap_or_else(|| "full".into());
    // anything but "component" behaves like encodeURI
    let mode = if mode_label == "component" {
        UrlMode::Component
    } else {
        UrlMode::Full
    };

    let failed = |error: &str, input_size: usize, operation: &str, mode: &str| UrlResponse {
        error: Some(error.to_string()),
        result: String::new(),
        input_size,
        output_size: 0,
        operation: operation.to_string(),
        mode: mode.to_string(),
    };

    let Some(url) = request.url.filter(|u| !u.is_empty()) else {
        return Err(ServerError::MissingField("URL must be a non-empty string".into())
            .with_data(failed("Invalid URL format", 0, "encode", "full")));
    };
    let input_size = url.chars().count();

    let raw_operation = request.operation.unwrap_or_default();
    let Ok(operation) = raw_operation.parse::<Operation>() else {
        let echoed = if raw_operation.is_empty() { "encode" } else { raw_operation.as_str() };
        return Err(ServerError::InvalidFormat(INVALID_OPERATION.into()).with_data(failed(
            "Invalid operation type",
            input_size,
            echoed,
            &mode_label,
        )));
    };

    if !encoding::is_valid_url_input(&url) {
        return Err(ServerError::InvalidFormat("Invalid URL string provided".into()).with_data(
            failed(
                "URL contains invalid characters",
                input_size,
                &operation.to_string(),
                &mode_label,
            ),
        ));
    }

    let result = match operation {
        Operation::Encode => encoding::encode_url(&url, mode),
        Operation::Decode => encoding::decode_url(&url, mode).map_err(|e| {
            ServerError::InvalidFormat("Error processing URL operation".into()).with_data(failed(
                e.detail(),
                input_size,
                "decode",
                &mode_label,
            ))
        })?,
    };

    Ok(Envelope::new(
        format!("URL {operation} successful"),
        UrlResponse {
            error: None,
            input_size,
            output_size: result.chars().count(),
            result,
            operation: operation.to_string(),
            mode: mode_label,
        },
    ))
}
