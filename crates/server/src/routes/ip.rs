use super::ToolDoc;
use crate::envelope::{body_or_default, Envelope};
use crate::error::{ApiError, ServerError};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::Json;
use devtools::ip::{self, IpInfo};
use devtools::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

pub const DOC: ToolDoc = ToolDoc {
    key: "ip",
    title: "IP Info Lookup API",
    description: "IP address information and validation tools",
    endpoints: &[
        ("POST /lookup", "Lookup IP address information"),
        ("GET /myip", "Get information about your IP address"),
    ],
};

const FALLBACK_IP: &str = "0.0.0.0";

#[derive(Debug, Default, Deserialize)]
pub struct LookupRequest {
    pub ip: Option<String>,
}

/// Zero-value record plus the reason the lookup failed.
#[derive(Debug, Serialize)]
pub struct LookupFailure {
    #[serde(flatten)]
    pub info: IpInfo,
    pub error: String,
}

fn failure(err: ToolError, address: &str) -> ApiError {
    let data = LookupFailure {
        info: IpInfo::invalid(address),
        error: err.detail().to_string(),
    };
    ServerError::from(err).with_data(data)
}

pub async fn docs() -> Envelope<Value> {
    DOC.envelope()
}

pub async fn lookup(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Envelope<IpInfo>, ApiError> {
    let request = body_or_default(payload);
    let address = request.ip.unwrap_or_default();

    let info = ip::lookup_checked(state.ip_lookup.as_ref(), &address)
        .await
        .map_err(|e| failure(e, &address))?;

    Ok(Envelope::new("IP information retrieved successfully", info))
}

/// Look up the caller's own address.
pub async fn my_ip(
    State(state): State<Arc<ServerState>>,
    request: Request,
) -> Result<Envelope<IpInfo>, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let address = client_ip(request.headers(), peer);
    tracing::debug!(client_ip = %address, "resolving caller address");

    let info = state
        .ip_lookup
        .lookup(&address)
        .await
        .map_err(|e| failure(e, &address))?;

    Ok(Envelope::new("IP information retrieved successfully", info))
}

/// First `X-Forwarded-For` hop, else the socket peer, else `0.0.0.0`.
pub fn client_ip(headers: &HeaderMap, peer: Option<std::net::IpAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(ip::normalize_ip_text)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| peer.map(ip::display_ip))
        .unwrap_or_else(|| FALLBACK_IP.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn forwarded_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer = Some(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(client_ip(&headers, peer), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_peer_then_default() {
        let headers = HeaderMap::new();
        let mapped = IpAddr::V6(Ipv4Addr::new(192, 0, 2, 1).to_ipv6_mapped());
        assert_eq!(client_ip(&headers, Some(mapped)), "192.0.2.1");
        assert_eq!(client_ip(&headers, None), "0.0.0.0");
    }
}
