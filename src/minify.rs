//! JavaScript and CSS minification on top of the `minifier` crate.

use crate::error::{ToolError, ToolResult};
use crate::lexer::{self, Dialect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages accepted by [`minify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyLanguage {
    Javascript,
    Css,
}

impl MinifyLanguage {
    pub const SUPPORTED: &'static [&'static str] = &["javascript", "css"];

    pub fn as_str(self) -> &'static str {
        match self {
            MinifyLanguage::Javascript => "javascript",
            MinifyLanguage::Css => "css",
        }
    }
}

impl FromStr for MinifyLanguage {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" => Ok(MinifyLanguage::Javascript),
            "css" => Ok(MinifyLanguage::Css),
            _ => Err(ToolError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for MinifyLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyStats {
    pub original_size: usize,
    pub minified_size: usize,
    /// Percentage saved, two decimals.
    pub compression_ratio: f64,
}

impl MinifyStats {
    pub fn new(original: &str, minified: &str) -> Self {
        let original_size = original.chars().count();
        let minified_size = minified.chars().count();
        MinifyStats {
            original_size,
            minified_size,
            compression_ratio: compression_ratio(original_size, minified_size),
        }
    }
}

pub fn compression_ratio(original: usize, minified: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let ratio = (1.0 - minified as f64 / original as f64) * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// Minify `content`.
///
/// Source that does not tokenize or whose brackets do not balance is refused
/// up front; the `minifier` crate would otherwise pass it through mangled.
pub fn minify(content: &str, language: MinifyLanguage) -> ToolResult<String> {
    let dialect = match language {
        MinifyLanguage::Javascript => Dialect::Js,
        MinifyLanguage::Css => Dialect::Css,
    };
    lexer::tokenize(content, dialect)
        .and_then(|tokens| lexer::check_balanced(&tokens))
        .map_err(|e| ToolError::TransformFailure(e.detail().to_string()))?;

    let minified = match language {
        MinifyLanguage::Javascript => minifier::js::minify(content).to_string(),
        MinifyLanguage::Css => minifier::css::minify(content)
            .map_err(|e| ToolError::TransformFailure(e.to_string()))?
            .to_string(),
    };
    tracing::debug!(
        language = %language,
        before = content.len(),
        after = minified.len(),
        "minified"
    );
    Ok(minified)
}
