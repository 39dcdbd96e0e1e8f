//! JSON validation and re-formatting.
//!
//! Key order is preserved (`serde_json` is built with `preserve_order`), so a
//! minified document keeps the caller's layout apart from whitespace.

use crate::error::{ToolError, ToolResult};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

/// Indent widths above this are clamped, matching `JSON.stringify`.
pub const MAX_INDENT: usize = 10;

pub const DEFAULT_INDENT: usize = 2;

/// Parse `input`; the error is the parser's message.
pub fn validate(input: &str) -> Result<Value, String> {
    serde_json::from_str(input).map_err(|e| e.to_string())
}

/// Serialize `value` compactly when `minify` is set, otherwise indented by
/// `spaces` (clamped to [`MAX_INDENT`]; zero means compact).
pub fn format(value: &Value, spaces: usize, minify: bool) -> ToolResult<String> {
    let spaces = spaces.min(MAX_INDENT);
    if minify || spaces == 0 {
        return serde_json::to_string(value)
            .map_err(|e| ToolError::TransformFailure(format!("Formatting error: {e}")));
    }
    pretty(value, &" ".repeat(spaces))
}

/// Pretty-print with an arbitrary indent string.
pub fn pretty(value: &Value, indent: &str) -> ToolResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ToolError::TransformFailure(format!("Formatting error: {e}")))?;
    String::from_utf8(buf).map_err(|e| ToolError::TransformFailure(format!("Formatting error: {e}")))
}

/// Treat a JSON string as document text, and anything else as an already
/// parsed document to be re-serialized.
pub fn source_text(json: &Value) -> String {
    match json {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Null, `false`, `0` and `""` count as no input.
pub fn is_blank(json: &Value) -> bool {
    match json {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_print_default_indent() {
        let value = validate(r#"{"name":"John","age":30}"#).unwrap();
        let out = format(&value, DEFAULT_INDENT, false).unwrap();
        assert_eq!(out, "{\n  \"name\": \"John\",\n  \"age\": 30\n}");
    }

    #[test]
    fn minify_keeps_key_order() {
        let value = validate("{\n  \"name\": \"John\",\n  \"age\": 30\n}").unwrap();
        assert_eq!(format(&value, 4, true).unwrap(), r#"{"name":"John","age":30}"#);
    }

    #[test]
    fn indent_is_clamped() {
        let value = json!({"a": 1});
        let out = format(&value, 40, false).unwrap();
        assert_eq!(out, format!("{{\n{}\"a\": 1\n}}", " ".repeat(MAX_INDENT)));
    }

    #[test]
    fn invalid_json_reports_parser_message() {
        let err = validate("{invalid json}").unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn source_text_and_blank() {
        assert_eq!(source_text(&json!("{\"a\":1}")), "{\"a\":1}");
        assert_eq!(source_text(&json!({"a": 1})), "{\"a\":1}");
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(!is_blank(&json!({})));
    }
}
