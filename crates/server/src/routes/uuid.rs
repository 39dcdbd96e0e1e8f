use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use devtools::identifier;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DOC: ToolDoc = ToolDoc {
    key: "uuid",
    title: "UUID Tools API",
    description: "UUID generation and validation tools",
    endpoints: &[
        ("GET /v4", "Generate a random UUID (v4)"),
        ("GET /v1", "Generate a timestamp-based UUID (v1)"),
        ("POST /validate", "Validate a UUID and get its version"),
    ],
};

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    pub uuid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedUuid {
    pub uuid: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub version: Option<u8>,
    pub uuid: String,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

pub async fn v4() -> Envelope<GeneratedUuid> {
    Envelope::new(
        "UUID v4 generated successfully",
        GeneratedUuid {
            uuid: identifier::generate_v4(),
        },
    )
}

pub async fn v1() -> Envelope<GeneratedUuid> {
    Envelope::new(
        "UUID v1 generated successfully",
        GeneratedUuid {
            uuid: identifier::generate_v1(),
        },
    )
}

pub async fn validate(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Envelope<ValidateResponse>, ApiError> {
    let request = body_or_default(payload);
    let uuid = request.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
        ServerError::MissingField("UUID is required and must be a string".into())
            .with_data(json!({ "valid": false }))
    })?;

    let valid = identifier::is_valid(&uuid);
    let message = if valid { "UUID is valid" } else { "UUID is invalid" };
    Ok(Envelope::new(
        message,
        ValidateResponse {
            valid,
            version: identifier::version(&uuid),
            uuid,
        },
    ))
}
