use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use axum::extract::rejection::JsonRejection;
use axum::extract::Query;
use axum::Json;
use devtools::time::{self, ConvertOperation, TimeConversion, TimeInput, TimeZoneSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOC: ToolDoc = ToolDoc {
    key: "time",
    title: "Time Conversion Tools API",
    description: "Time conversion and formatting tools",
    endpoints: &[
        ("POST /convert", "Convert between timestamps and dates"),
        ("GET /now", "Get current time in multiple formats"),
        ("GET /timezones", "List all available timezones"),
    ],
};

#[derive(Debug, Default, Deserialize)]
pub struct ConvertRequest {
    pub input: Option<TimeInput>,
    pub operation: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NowQuery {
    pub timezone: Option<String>,
}

/// Zero-value conversion plus the reason it failed.
#[derive(Debug, Serialize)]
pub struct ConversionFailure {
    #[serde(flatten)]
    pub conversion: TimeConversion,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct TimezoneList {
    pub current: String,
    pub all: Vec<String>,
    pub count: usize,
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

pub async fn convert(
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Envelope<TimeConversion>, ApiError> {
    let request = body_or_default(payload);

    let Some(input) = request.input.filter(|i| !i.is_blank()) else {
        return Err(ServerError::MissingField("Input is required".into())
            .with_data(TimeConversion::empty()));
    };

    let timezone = request.timezone.unwrap_or_else(|| "UTC".into());
    let converted = request
        .operation
        .unwrap_or_default()
        .parse::<ConvertOperation>()
        .and_then(|operation| {
            let zone = TimeZoneSpec::parse(&timezone)?;
            time::convert(&input, operation, &zone)
        })
        .map_err(|e| {
            ServerError::from_tool(&e, "Time conversion failed").with_data(ConversionFailure {
                conversion: TimeConversion::empty(),
                error: e.detail().to_string(),
            })
        })?;

    Ok(Envelope::new("Time conversion successful", converted))
}

pub async fn now(Query(query): Query<NowQuery>) -> Result<Envelope<TimeConversion>, ApiError> {
    let timezone = query
        .timezone
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(time::system_timezone);

    let current = TimeZoneSpec::parse(&timezone)
        .and_then(|zone| time::now(&zone))
        .map_err(|e| ServerError::from_tool(&e, e.detail()).with_data(TimeConversion::empty()))?;

    Ok(Envelope::new("Current time retrieved successfully", current))
}

pub async fn timezones() -> Envelope<TimezoneList> {
    let all = time::timezones();
    Envelope::new(
        "Available timezones",
        TimezoneList {
            current: time::system_timezone(),
            count: all.len(),
            all,
        },
    )
}
