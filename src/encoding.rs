//! Base64 and URL percent-encoding.
//!
//! URL handling mirrors the two browser primitives clients already know:
//! [`UrlMode::Full`] behaves like `encodeURI`/`decodeURI` and leaves URL
//! syntax characters alone, [`UrlMode::Component`] behaves like
//! `encodeURIComponent`/`decodeURIComponent` and escapes them.

use crate::error::{ToolError, ToolResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters `encodeURIComponent` leaves as-is.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters `encodeURI` leaves as-is: the component set plus URL syntax.
const FULL: &AsciiSet = &COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Escapes `decodeURI` keeps encoded.
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// Direction of an encoding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encode,
    Decode,
}

impl FromStr for Operation {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encode" => Ok(Operation::Encode),
            "decode" => Ok(Operation::Decode),
            other => Err(ToolError::InvalidFormat(format!(
                "unknown operation '{other}', expected 'encode' or 'decode'"
            ))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
        })
    }
}

/// Which characters URL encoding treats as structural.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    #[default]
    Full,
    Component,
}

impl FromStr for UrlMode {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(UrlMode::Full),
            "component" => Ok(UrlMode::Component),
            other => Err(ToolError::InvalidFormat(format!(
                "unknown url mode '{other}', expected 'full' or 'component'"
            ))),
        }
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode canonical, padded Base64.
pub fn decode_base64(input: &str) -> ToolResult<Vec<u8>> {
    let bytes = STANDARD
        .decode(input)
        .map_err(|e| ToolError::InvalidFormat(format!("Invalid Base64 string: {e}")))?;
    if STANDARD.encode(&bytes) != input {
        return Err(ToolError::InvalidFormat(
            "Invalid Base64 string: not in canonical form".to_string(),
        ));
    }
    Ok(bytes)
}

/// True when `input` decodes and re-encodes to exactly itself.
pub fn is_valid_base64(input: &str) -> bool {
    decode_base64(input).is_ok()
}

/// Decode Base64 and render the bytes as text, replacing invalid UTF-8.
pub fn decode_base64_text(input: &str) -> ToolResult<String> {
    let bytes = decode_base64(input)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn encode_url(input: &str, mode: UrlMode) -> String {
    let set = match mode {
        UrlMode::Full => FULL,
        UrlMode::Component => COMPONENT,
    };
    utf8_percent_encode(input, set).to_string()
}

/// Reverse [`encode_url`].
///
/// Malformed escapes and byte sequences that are not UTF-8 are rejected
/// rather than passed through.
pub fn decode_url(input: &str, mode: UrlMode) -> ToolResult<String> {
    // percent_decode passes bad escapes through untouched
    if !escapes_well_formed(input.as_bytes()) {
        return Err(malformed_url());
    }
    match mode {
        UrlMode::Component => percent_decode_str(input)
            .decode_utf8()
            .map(|text| text.into_owned())
            .map_err(|_| malformed_url()),
        UrlMode::Full => decode_keeping_reserved(input.as_bytes()),
    }
}

/// `decodeURI`: escapes of reserved characters stay encoded.
fn decode_keeping_reserved(src: &[u8]) -> ToolResult<String> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;

    while i < src.len() {
        if src[i] != b'%' {
            out.push(src[i]);
            i += 1;
            continue;
        }
        let mut byte = [0u8; 1];
        hex::decode_to_slice(&src[i + 1..i + 3], &mut byte).map_err(|_| malformed_url())?;

        if RESERVED.contains(&byte[0]) {
            out.extend_from_slice(&src[i..i + 3]);
        } else {
            out.push(byte[0]);
        }
        i += 3;
    }

    String::from_utf8(out).map_err(|_| malformed_url())
}

fn escapes_well_formed(src: &[u8]) -> bool {
    src.iter().enumerate().filter(|(_, b)| **b == b'%').all(|(i, _)| {
        matches!(src.get(i + 1..i + 3), Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
    })
}

/// Cheap structural check applied before URL transforms.
pub fn is_valid_url_input(input: &str) -> bool {
    !input.is_empty() && !input.contains('\n') && !input.contains('\r')
}

fn malformed_url() -> ToolError {
    ToolError::InvalidFormat("Invalid URL encoded string".to_string())
}
