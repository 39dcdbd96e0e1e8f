//! API route handlers
//!
//! One module per tool, each exposing its handlers plus a `DOC` entry that
//! feeds both `GET /api/v1` and the tool's own `GET /api/v1/<tool>` page.
//!
//! - `health`: liveness and readiness probes
//! - `uuid`, `json`, `encoding`, `time`, `regex`: in-process transforms
//! - `ip`: geolocation through the configured lookup backend
//! - `markdown`, `minifier`, `beautifier`: document and code transforms

pub mod beautifier;
pub mod encoding;
pub mod health;
pub mod ip;
pub mod json;
pub mod markdown;
pub mod minifier;
pub mod regex;
pub mod time;
pub mod uuid;

use crate::envelope::Envelope;
use crate::error::ServerError;
use axum::http::Uri;
use serde_json::{json, Map, Value};

/// Static description of one tool's endpoints.
pub struct ToolDoc {
    /// Path segment under `/api/v1`.
    pub key: &'static str,
    /// Message of the tool's documentation page.
    pub title: &'static str,
    pub description: &'static str,
    pub endpoints: &'static [(&'static str, &'static str)],
}

impl ToolDoc {
    pub fn base(&self) -> String {
        format!("/api/v1/{}", self.key)
    }

    fn endpoint_map(&self, with_index: bool) -> Map<String, Value> {
        let mut map = Map::new();
        if with_index {
            map.insert("GET /".into(), "API documentation".into());
        }
        for (route, summary) in self.endpoints {
            map.insert((*route).into(), (*summary).into());
        }
        map
    }

    /// The tool's own documentation envelope.
    pub fn envelope(&self) -> Envelope<Value> {
        Envelope::new(self.title, json!({ "endpoints": self.endpoint_map(false) }))
    }
}

/// Every tool, in listing order.
pub const CATALOG: &[&ToolDoc] = &[
    &json::DOC,
    &encoding::DOC,
    &uuid::DOC,
    &time::DOC,
    &regex::DOC,
    &ip::DOC,
    &markdown::DOC,
    &minifier::DOC,
    &beautifier::DOC,
];

/// Service banner (GET /)
pub async fn api_info() -> Envelope<Value> {
    Envelope::new(
        "DevTools API",
        json!({
            "name": "devtools-server",
            "version": env!("CARGO_PKG_VERSION"),
            "apiVersion": "v1",
            "docs": "/api/v1",
        }),
    )
}

/// API index (GET /api/v1)
///
/// Lists every tool with its base path, a one-line description and its
/// endpoints.
pub async fn api_index() -> Envelope<Value> {
    let apis: Map<String, Value> = CATALOG
        .iter()
        .map(|doc| {
            let entry = json!({
                "base": doc.base(),
                "description": doc.description,
                "endpoints": doc.endpoint_map(true),
            });
            (doc.key.to_string(), entry)
        })
        .collect();

    Envelope::new(
        "API - 👋 Welcome to DevTools API v1",
        json!({ "availableAPIs": apis }),
    )
}

/// 404 Not Found handler
pub async fn not_found(uri: Uri) -> ServerError {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
    ServerError::NotFound(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys: Vec<&str> = CATALOG.iter().map(|d| d.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[tokio::test]
    async fn index_lists_every_tool() {
        let envelope = api_index().await;
        let apis = envelope.data["availableAPIs"].as_object().unwrap();
        assert_eq!(apis.len(), 9);
        assert_eq!(apis["uuid"]["base"], "/api/v1/uuid");
        assert_eq!(apis["uuid"]["endpoints"]["GET /"], "API documentation");
    }

    #[test]
    fn tool_page_omits_index_entry() {
        let page = uuid::DOC.envelope();
        assert_eq!(page.message, "UUID Tools API");
        assert!(page.data["endpoints"].get("GET /").is_none());
        assert!(page.data["endpoints"].get("GET /v4").is_some());
    }
}
