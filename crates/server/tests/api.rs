//! End-to-end tests for the HTTP surface
//!
//! Every request goes through the full router, middleware included, with a
//! canned IP lookup backend in place of the network.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use devtools::{IpInfo, IpLookup, ToolError, ToolResult};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

struct CannedLookup;

#[async_trait]
impl IpLookup for CannedLookup {
    async fn lookup(&self, ip: &str) -> ToolResult<IpInfo> {
        if ip == "10.9.9.9" {
            return Err(ToolError::UpstreamFailure(
                "Failed to fetch IP info: connection refused".into(),
            ));
        }
        let mut info = IpInfo::invalid(ip);
        info.city = Some("Testville".into());
        info.country = Some("TV".into());
        Ok(info)
    }
}

fn app() -> Router {
    let state = ServerState::with_lookup(ServerConfig::default(), Arc::new(CannedLookup));
    build_router(Arc::new(state))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn banner_and_index() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "DevTools API");
    assert_eq!(body["data"]["apiVersion"], "v1");

    let (status, body) = get("/api/v1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API - 👋 Welcome to DevTools API v1");
    let apis = body["data"]["availableAPIs"].as_object().unwrap();
    assert_eq!(apis.len(), 9);
    assert_eq!(apis["beautifier"]["base"], "/api/v1/beautifier");
}

#[tokio::test]
async fn tool_documentation_pages() {
    let (status, body) = get("/api/v1/ip").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "IP Info Lookup API");
    assert_eq!(
        body["data"]["endpoints"]["POST /lookup"],
        "Lookup IP address information"
    );
}

#[tokio::test]
async fn unknown_route_is_enveloped_404() {
    let (status, body) = get("/api/v1/nope?x=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found - /api/v1/nope?x=1");
}

#[tokio::test]
async fn request_id_is_echoed_or_minted() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-42");

    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let minted = response.headers()["x-request-id"].to_str().unwrap();
    assert!(devtools::identifier::is_valid(minted));
}

#[tokio::test]
async fn readiness_reports_lookup_provider() {
    let (status, body) = get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["ip_lookup"], "ip-api");
}

#[tokio::test]
async fn uuid_generation_and_validation() {
    let (status, body) = get("/api/v1/uuid/v4").await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["uuid"].as_str().unwrap().to_string();

    let (status, body) = post("/api/v1/uuid/validate", json!({ "uuid": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "UUID is valid");
    assert_eq!(body["data"]["version"], 4);

    let (_, body) = get("/api/v1/uuid/v1").await;
    let id = body["data"]["uuid"].as_str().unwrap();
    assert_eq!(devtools::identifier::version(id), Some(1));

    let (status, body) = post("/api/v1/uuid/validate", json!({ "uuid": "nope" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["version"], Value::Null);

    let (status, body) = post("/api/v1/uuid/validate", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "UUID is required and must be a string");
    assert_eq!(body["data"]["valid"], false);
}

#[tokio::test]
async fn json_format_and_validate() {
    let (status, body) = post("/api/v1/json/format", json!({ "json": "{\"a\":1}" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["formatted"], "{\n  \"a\": 1\n}");
    assert_eq!(body["data"]["minified"], false);

    let (_, body) = post(
        "/api/v1/json/format",
        json!({ "json": { "a": [1, 2] }, "minify": true }),
    )
    .await;
    assert_eq!(body["data"]["formatted"], "{\"a\":[1,2]}");

    let (status, body) = post("/api/v1/json/format", json!({ "json": "{oops" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON input");
    assert_eq!(body["data"]["valid"], false);

    let (status, body) = post("/api/v1/json/validate", json!({ "json": "[1," })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "JSON is invalid");

    let (status, body) = post("/api/v1/json/validate", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "JSON input is required");
}

#[tokio::test]
async fn malformed_body_fails_presence_check() {
    let (status, body) = send(
        Request::builder()
            .method("POST")
            .uri("/api/v1/markdown/convert")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Markdown content is required");
}

#[tokio::test]
async fn base64_round_trip_and_errors() {
    let (status, body) = post(
        "/api/v1/encoding/base64",
        json!({ "input": "hello", "operation": "encode" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Base64 encode successful");
    assert_eq!(body["data"]["result"], "aGVsbG8=");
    assert_eq!(body["data"]["inputType"], "text");

    let (_, body) = post(
        "/api/v1/encoding/base64",
        json!({ "input": "aGVsbG8=", "operation": "decode" }),
    )
    .await;
    assert_eq!(body["data"]["result"], "hello");

    let (status, body) = post(
        "/api/v1/encoding/base64",
        json!({ "input": "hello", "operation": "rot13" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["operation"], "rot13");
    assert_eq!(body["data"]["error"], "Invalid operation type");

    let (status, body) = post("/api/v1/encoding/base64", json!({ "operation": "encode" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Input must be a non-empty string");
}

#[tokio::test]
async fn url_encoding_modes() {
    let (status, body) = post(
        "/api/v1/encoding/url",
        json!({ "url": "a b&c", "operation": "encode", "mode": "component" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "a%20b%26c");
    assert_eq!(body["data"]["mode"], "component");

    let (_, body) = post(
        "/api/v1/encoding/url",
        json!({ "url": "a b&c", "operation": "encode" }),
    )
    .await;
    assert_eq!(body["data"]["result"], "a%20b&c");
    assert_eq!(body["data"]["mode"], "full");
}

#[tokio::test]
async fn time_conversion() {
    let (status, body) = post(
        "/api/v1/time/convert",
        json!({ "input": 1_700_000_000_000_i64, "operation": "toDate" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["iso8601"], "2023-11-14T22:13:20.000Z");
    assert_eq!(body["data"]["inputType"], "timestamp");

    let (status, body) = post(
        "/api/v1/time/convert",
        json!({ "input": "2023-11-14T22:13:20Z", "operation": "toTimestamp" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timestamp"], 1_700_000_000_000_i64);
    assert_eq!(body["data"]["inputType"], "date");

    let (status, body) = post(
        "/api/v1/time/convert",
        json!({ "input": 1_700_000_000_000_i64, "operation": "toDate", "timezone": "Mars/Base" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Time conversion failed");

    let (status, body) = post("/api/v1/time/convert", json!({ "operation": "toDate" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Input is required");
}

#[tokio::test]
async fn time_now_and_zone_list() {
    let (status, body) = get("/api/v1/time/now?timezone=Asia/Tokyo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timezone"], "Asia/Tokyo");

    let (status, body) = get("/api/v1/time/now?timezone=Nowhere/Land").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid timezone: Nowhere/Land");

    let (status, body) = get("/api/v1/time/timezones").await;
    assert_eq!(status, StatusCode::OK);
    let count = body["data"]["count"].as_u64().unwrap();
    assert_eq!(count as usize, body["data"]["all"].as_array().unwrap().len());
}

#[tokio::test]
async fn regex_matching() {
    let (status, body) = post(
        "/api/v1/regex/test",
        json!({ "text": "a1b22", "pattern": "\\d+", "flags": "g" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Matches found");
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["matches"][1]["match"], "22");
    assert_eq!(body["data"]["matches"][1]["index"], 3);

    let (status, body) = post(
        "/api/v1/regex/test",
        json!({ "text": "abc", "pattern": "\\d" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No matches found");

    let (status, body) = post(
        "/api/v1/regex/test",
        json!({ "text": "abc", "pattern": "(" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid regex pattern");
    assert_eq!(body["data"]["isValid"], false);

    let (status, body) = post("/api/v1/regex/test", json!({ "text": "abc" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Text and pattern are required");

    let (status, body) = get("/api/v1/regex/flags").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["flags"]["i"].is_string());
}

#[tokio::test]
async fn regex_always_scans_globally() {
    for global in [false, true] {
        let (status, body) = post(
            "/api/v1/regex/test",
            json!({ "text": "Hello HELLO hello", "pattern": "hello", "flags": "i", "global": global }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 3);
        assert_eq!(body["data"]["matches"][1]["match"], "HELLO");
        assert_eq!(body["data"]["matches"][2]["index"], 12);
        let reported = if global { "gi" } else { "i" };
        assert_eq!(body["data"]["flags"], reported);
    }
}

#[tokio::test]
async fn language_names_are_case_sensitive() {
    let (status, body) = post(
        "/api/v1/minifier/minify",
        json!({ "content": "a{color:red}", "language": "CSS" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unsupported language");

    let (status, _) = post(
        "/api/v1/beautifier/format",
        json!({ "content": "a()", "language": "JavaScript" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn huge_tab_width_still_answers() {
    let (status, body) = post(
        "/api/v1/beautifier/format",
        json!({ "content": "a{color:red}", "language": "css", "options": { "tabWidth": u64::MAX } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["indentationLevel"], 16);

    let (status, body) = post(
        "/api/v1/beautifier/format",
        json!({ "content": "{\"a\":1}", "language": "json", "options": { "tabWidth": 20 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["indentationLevel"], 10);
}

#[tokio::test]
async fn ip_lookup_through_backend() {
    let (status, body) = post("/api/v1/ip/lookup", json!({ "ip": "8.8.8.8" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "IP information retrieved successfully");
    assert_eq!(body["data"]["city"], "Testville");

    let (status, body) = post("/api/v1/ip/lookup", json!({ "ip": "999.1.1.1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid IP address format");
    assert_eq!(body["data"]["ip"], "999.1.1.1");
    assert_eq!(body["data"]["error"], "Invalid IP address format");

    let (status, body) = post("/api/v1/ip/lookup", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "IP address is required");

    let (status, body) = post("/api/v1/ip/lookup", json!({ "ip": "10.9.9.9" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "Failed to fetch IP info: connection refused"
    );
    assert_eq!(
        body["data"]["error"],
        "Failed to fetch IP info: connection refused"
    );
    assert_eq!(body["data"]["ip"], "10.9.9.9");
    assert_eq!(body["data"]["isValid"], false);
}

#[tokio::test]
async fn my_ip_prefers_forwarded_header() {
    let (status, body) = send(
        Request::builder()
            .uri("/api/v1/ip/myip")
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ip"], "198.51.100.4");

    // no connect info under oneshot
    let (_, body) = get("/api/v1/ip/myip").await;
    assert_eq!(body["data"]["ip"], "0.0.0.0");
}

#[tokio::test]
async fn markdown_conversion() {
    let (status, body) = post(
        "/api/v1/markdown/convert",
        json!({ "markdown": "# Title\n\nSome *text*" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let html = body["data"]["html"].as_str().unwrap();
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<em>text</em>"));
    assert_eq!(body["data"]["stats"]["words"], 4);
}

#[tokio::test]
async fn minifier_routes() {
    let (status, body) = post(
        "/api/v1/minifier/minify",
        json!({ "content": ".a {\n  color: red;\n}\n", "language": "css" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Code minified successfully");
    let minified = body["data"]["minified"].as_str().unwrap();
    assert!(minified.starts_with(".a{color:red"));
    assert!(body["data"]["stats"]["compressionRatio"].as_f64().unwrap() > 0.0);

    let (status, body) = post(
        "/api/v1/minifier/minify",
        json!({ "content": "x", "language": "python" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unsupported language");
    assert_eq!(
        body["data"]["error"]["supportedLanguages"],
        json!(["javascript", "css"])
    );

    let (status, body) = post("/api/v1/minifier/minify", json!({ "content": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Language is required");
}

#[tokio::test]
async fn beautifier_routes() {
    let (status, body) = post(
        "/api/v1/beautifier/format",
        json!({ "content": "function test(){return true}", "language": "javascript" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Code formatted successfully");
    assert_eq!(
        body["data"]["formatted"],
        "function test() {\n  return true;\n}\n"
    );
    assert_eq!(body["data"]["stats"]["indentationLevel"], 2);

    let (status, body) = post(
        "/api/v1/beautifier/format",
        json!({ "content": "{\"a\":", "language": "json" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid syntax in provided code");

    let (status, body) = post(
        "/api/v1/beautifier/format",
        json!({ "content": "a{}", "language": "css", "options": { "tabWidth": "wide" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid formatting options");
}
