//! Timestamp and date conversion.
//!
//! A zone is either an IANA name resolved through `chrono-tz`, or an offset
//! literal of the form `UTC+HH:MM` / `UTC-HH:MM`. The two are rendered
//! differently:
//!
//! - Offset literals (and bare `UTC`) shift the instant by a flat number of
//!   minutes and print `YYYY-MM-DD HH:MM:SS.sss (UTC+HH:MM)`. No daylight
//!   saving or historical offset rules are consulted, ever.
//! - Named zones go through the tz database and print
//!   `MM/DD/YYYY, HH:MM:SS ABBR` on a 24-hour clock. Only North American
//!   abbreviations and `UTC` are printed as names; every other zone prints
//!   its offset as `GMT`, `GMT+9` or `GMT+5:30`, the way en-US browsers do.
//!
//! Instants are UNIX milliseconds. The accepted range matches the
//! ECMAScript `Date` range so the service agrees with browser clients.

use crate::error::{ToolError, ToolResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, Utc};
use chrono_tz::{Tz, TZ_VARIANTS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Largest magnitude an ECMAScript `Date` can hold, in milliseconds.
pub const MAX_TIMESTAMP_MS: i64 = 8_640_000_000_000_000;

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^UTC([+-])(\d{2}):(\d{2})$").expect("static offset pattern compiles"));

/// Naive layouts accepted by [`parse_date_string`]; read as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A resolved timezone argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeZoneSpec {
    /// Flat offset east of UTC, in minutes, with the caller's label.
    Offset { minutes: i32, label: String },
    /// A zone from the tz database.
    Named(Tz),
}

impl TimeZoneSpec {
    /// Resolve a zone identifier, or fail with `Invalid timezone: <tz>`.
    pub fn parse(tz: &str) -> ToolResult<Self> {
        if tz == "UTC" {
            return Ok(TimeZoneSpec::Offset {
                minutes: 0,
                label: tz.to_string(),
            });
        }
        if let Some(caps) = OFFSET_RE.captures(tz) {
            let sign = if &caps[1] == "+" { 1 } else { -1 };
            let hours: i32 = caps[2].parse().unwrap_or_default();
            let minutes: i32 = caps[3].parse().unwrap_or_default();
            return Ok(TimeZoneSpec::Offset {
                minutes: sign * (hours * 60 + minutes),
                label: tz.to_string(),
            });
        }
        tz.parse::<Tz>()
            .map(TimeZoneSpec::Named)
            .map_err(|_| ToolError::InvalidFormat(format!("Invalid timezone: {tz}")))
    }

    /// The identifier as the caller spelled it.
    pub fn name(&self) -> &str {
        match self {
            TimeZoneSpec::Offset { label, .. } => label,
            TimeZoneSpec::Named(tz) => tz.name(),
        }
    }
}

impl FromStr for TimeZoneSpec {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeZoneSpec::parse(s)
    }
}

/// Returns true if `tz` names a zone or is an offset literal.
pub fn is_valid_timezone(tz: &str) -> bool {
    TimeZoneSpec::parse(tz).is_ok()
}

/// What the caller handed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Timestamp,
    Date,
}

/// Direction of a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOperation {
    /// Millisecond timestamp to formatted date.
    ToDate,
    /// Date string to millisecond timestamp.
    ToTimestamp,
}

impl FromStr for ConvertOperation {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toDate" => Ok(ConvertOperation::ToDate),
            "toTimestamp" => Ok(ConvertOperation::ToTimestamp),
            other => Err(ToolError::InvalidFormat(format!(
                "unknown operation '{other}', expected 'toDate' or 'toTimestamp'"
            ))),
        }
    }
}

impl fmt::Display for ConvertOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConvertOperation::ToDate => "toDate",
            ConvertOperation::ToTimestamp => "toTimestamp",
        })
    }
}

/// A conversion operand: JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    Number(f64),
    Text(String),
}

impl TimeInput {
    /// Zero and the empty string count as absent.
    pub fn is_blank(&self) -> bool {
        match self {
            TimeInput::Number(n) => *n == 0.0,
            TimeInput::Text(s) => s.is_empty(),
        }
    }
}

/// Every rendering of one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeConversion {
    pub result: String,
    pub timestamp: i64,
    pub iso8601: String,
    pub utc: String,
    pub input_type: InputType,
    pub timezone: String,
}

impl TimeConversion {
    /// Zero value used in error envelopes.
    pub fn empty() -> Self {
        Self {
            result: String::new(),
            timestamp: 0,
            iso8601: String::new(),
            utc: String::new(),
            input_type: InputType::Timestamp,
            timezone: "UTC".to_string(),
        }
    }
}

/// Render `timestamp_ms` in `zone`.
pub fn format_timestamp(timestamp_ms: i64, zone: &TimeZoneSpec) -> ToolResult<TimeConversion> {
    let instant = to_instant(timestamp_ms)?;

    let result = match zone {
        TimeZoneSpec::Offset { minutes, label } => {
            let shifted = instant
                .checked_add_signed(Duration::minutes(i64::from(*minutes)))
                .ok_or_else(|| ToolError::InvalidFormat("Invalid timestamp".to_string()))?;
            format!("{} ({label})", shifted.format("%Y-%m-%d %H:%M:%S%.3f"))
        }
        TimeZoneSpec::Named(tz) => {
            let local = instant.with_timezone(tz);
            format!("{} {}", local.format("%m/%d/%Y, %H:%M:%S"), zone_label(&local))
        }
    };

    Ok(TimeConversion {
        result,
        timestamp: timestamp_ms,
        iso8601: instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        utc: instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        input_type: InputType::Timestamp,
        timezone: zone.name().to_string(),
    })
}

/// Abbreviations en-US clients print by name.
const NAMED_ABBREVIATIONS: &[&str] = &[
    "UTC", "EST", "EDT", "CST", "CDT", "MST", "MDT", "PST", "PDT", "AKST", "AKDT", "HST", "HDT",
];

fn zone_label(local: &DateTime<Tz>) -> String {
    let abbreviation = local.format("%Z").to_string();
    if NAMED_ABBREVIATIONS.contains(&abbreviation.as_str()) {
        return abbreviation;
    }
    let seconds = local.offset().fix().local_minus_utc();
    if seconds == 0 {
        return "GMT".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    match minutes % 60 {
        0 => format!("GMT{sign}{}", minutes / 60),
        rest => format!("GMT{sign}{}:{rest:02}", minutes / 60),
    }
}

/// Run one conversion request end to end.
pub fn convert(
    input: &TimeInput,
    operation: ConvertOperation,
    zone: &TimeZoneSpec,
) -> ToolResult<TimeConversion> {
    match operation {
        ConvertOperation::ToDate => {
            let timestamp = match input {
                TimeInput::Number(n) => number_to_millis(*n)?,
                TimeInput::Text(s) => parse_timestamp_text(s)?,
            };
            if timestamp <= 0 {
                return Err(invalid_timestamp());
            }
            format_timestamp(timestamp, zone)
        }
        ConvertOperation::ToTimestamp => {
            let TimeInput::Text(text) = input else {
                return Err(ToolError::InvalidType("Invalid date string".to_string()));
            };
            let timestamp = parse_date_string(text)?;
            let mut out = format_timestamp(timestamp, zone)?;
            out.input_type = InputType::Date;
            Ok(out)
        }
    }
}

/// Current instant rendered in `zone`.
pub fn now(zone: &TimeZoneSpec) -> ToolResult<TimeConversion> {
    format_timestamp(Utc::now().timestamp_millis(), zone)
}

/// Parse a date string into UNIX milliseconds.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]` and
/// `YYYY-MM-DD`. Forms without an offset are read as UTC.
pub fn parse_date_string(input: &str) -> ToolResult<i64> {
    let input = input.trim();

    let parsed = DateTime::parse_from_rfc3339(input)
        .or_else(|_| DateTime::parse_from_rfc2822(input))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| ToolError::InvalidFormat("Invalid date format".to_string()))?;

    let millis = parsed.timestamp_millis();
    if millis.abs() > MAX_TIMESTAMP_MS {
        return Err(ToolError::InvalidFormat("Invalid date format".to_string()));
    }
    Ok(millis)
}

/// Read the leading integer of `input`, the way `parseInt(s, 10)` does.
pub fn parse_timestamp_text(input: &str) -> ToolResult<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return Err(invalid_timestamp());
    }
    let magnitude: i64 = rest[..digits_end]
        .parse()
        .map_err(|_| invalid_timestamp())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Sorted list of every accepted zone: `UTC`, the tz database and the
/// whole-hour offsets from `UTC-12:00` to `UTC+13:00`.
pub fn timezones() -> Vec<String> {
    let mut all: BTreeSet<String> = BTreeSet::new();
    all.insert("UTC".to_string());
    all.extend(TZ_VARIANTS.iter().map(|tz| tz.name().to_string()));
    all.extend((-12i32..=13).map(|offset| {
        let sign = if offset >= 0 { '+' } else { '-' };
        format!("UTC{sign}{:02}:00", offset.abs())
    }));
    all.into_iter().collect()
}

/// Zone the host is configured for via `TZ`, else `UTC`.
pub fn system_timezone() -> String {
    std::env::var("TZ")
        .ok()
        .filter(|tz| is_valid_timezone(tz))
        .unwrap_or_else(|| "UTC".to_string())
}

fn number_to_millis(n: f64) -> ToolResult<i64> {
    if !n.is_finite() || n.abs() > MAX_TIMESTAMP_MS as f64 {
        return Err(invalid_timestamp());
    }
    Ok(n.trunc() as i64)
}

fn to_instant(timestamp_ms: i64) -> ToolResult<DateTime<Utc>> {
    if timestamp_ms.abs() > MAX_TIMESTAMP_MS {
        return Err(invalid_timestamp());
    }
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).ok_or_else(invalid_timestamp)
}

fn invalid_timestamp() -> ToolError {
    ToolError::InvalidFormat("Invalid timestamp".to_string())
}
