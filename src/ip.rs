//! IPv4 validation and geolocation lookup.
//!
//! The lookup itself sits behind [`IpLookup`] so the HTTP layer can be swapped
//! out. [`HttpIpLookup`] asks `ipinfo.io` when it has a token and the free
//! `ip-api.com` endpoint otherwise.

use crate::error::{ToolError, ToolResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .expect("static ipv4 pattern compiles")
});

/// Dotted-quad IPv4 check.
pub fn is_valid_ipv4(ip: &str) -> bool {
    IPV4_RE.is_match(ip)
}

/// Render a peer address, unwrapping IPv4-mapped IPv6.
pub fn display_ip(addr: IpAddr) -> String {
    addr.to_canonical().to_string()
}

/// Same as [`display_ip`] for an address that arrived as text.
pub fn normalize_ip_text(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix("::ffff:").unwrap_or(trimmed).to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "ipinfo")]
    IpInfo,
    #[serde(rename = "ip-api")]
    IpApi,
}

/// What a lookup knows about an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpInfo {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub country: Option<String>,
    /// `"lat,lon"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timezone: Option<String>,
    pub is_valid: bool,
    pub provider: Provider,
}

impl IpInfo {
    /// The record returned alongside a failed lookup.
    pub fn invalid(ip: impl Into<String>) -> Self {
        IpInfo {
            ip: ip.into(),
            ..IpInfo::default()
        }
    }
}

#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> ToolResult<IpInfo>;
}

#[cfg(feature = "http-lookup")]
pub use http::HttpIpLookup;

#[cfg(feature = "http-lookup")]
mod http {
    use super::{IpInfo, IpLookup, Provider};
    use crate::error::{ToolError, ToolResult};
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::time::Duration;

    const IPINFO_URL: &str = "https://ipinfo.io";
    const IP_API_URL: &str = "http://ip-api.com/json";

    /// `ipinfo.io` response body.
    #[derive(Debug, Deserialize)]
    struct IpInfoBody {
        ip: String,
        hostname: Option<String>,
        city: Option<String>,
        region: Option<String>,
        country: Option<String>,
        loc: Option<String>,
        org: Option<String>,
        timezone: Option<String>,
    }

    /// `ip-api.com` response body.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct IpApiBody {
        status: Option<String>,
        message: Option<String>,
        query: Option<String>,
        reverse: Option<String>,
        city: Option<String>,
        region_name: Option<String>,
        country: Option<String>,
        lat: Option<f64>,
        lon: Option<f64>,
        org: Option<String>,
        isp: Option<String>,
        timezone: Option<String>,
    }

    pub struct HttpIpLookup {
        client: reqwest::Client,
        token: Option<String>,
    }

    impl HttpIpLookup {
        pub fn new(token: Option<String>, timeout: Duration) -> ToolResult<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ToolError::UpstreamFailure(e.to_string()))?;
            Ok(HttpIpLookup {
                client,
                token: token.filter(|t| !t.is_empty()),
            })
        }

        async fn fetch<T: serde::de::DeserializeOwned>(&self, url: String) -> ToolResult<T> {
            let response = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(failure)?;
            if !response.status().is_success() {
                return Err(failure(format!(
                    "Request failed with status code {}",
                    response.status().as_u16()
                )));
            }
            response.json().await.map_err(failure)
        }
    }

    #[async_trait]
    impl IpLookup for HttpIpLookup {
        async fn lookup(&self, ip: &str) -> ToolResult<IpInfo> {
            if let Some(token) = &self.token {
                let body: IpInfoBody = self.fetch(format!("{IPINFO_URL}/{ip}?token={token}")).await?;
                return Ok(IpInfo {
                    ip: body.ip,
                    hostname: body.hostname,
                    city: body.city,
                    region: body.region,
                    country: body.country,
                    loc: body.loc,
                    org: body.org,
                    timezone: body.timezone,
                    is_valid: true,
                    provider: Provider::IpInfo,
                });
            }

            let body: IpApiBody = self.fetch(format!("{IP_API_URL}/{ip}")).await?;
            if body.status.as_deref() == Some("fail") {
                return Err(failure(body.message.unwrap_or_else(|| "lookup failed".into())));
            }
            let loc = match (body.lat, body.lon) {
                (Some(lat), Some(lon)) => Some(format!("{lat},{lon}")),
                _ => None,
            };
            Ok(IpInfo {
                ip: body.query.unwrap_or_else(|| ip.to_string()),
                hostname: body.reverse.filter(|r| !r.is_empty()),
                city: body.city,
                region: body.region_name,
                country: body.country,
                loc,
                org: body.org.filter(|o| !o.is_empty()).or(body.isp),
                timezone: body.timezone,
                is_valid: true,
                provider: Provider::IpApi,
            })
        }
    }

    fn failure(err: impl std::fmt::Display) -> ToolError {
        ToolError::UpstreamFailure(format!("Failed to fetch IP info: {err}"))
    }
}

/// Validate `ip` before handing it to `lookup`.
pub async fn lookup_checked(lookup: &dyn IpLookup, ip: &str) -> ToolResult<IpInfo> {
    if ip.is_empty() {
        return Err(ToolError::MissingField("IP address is required".into()));
    }
    if !is_valid_ipv4(ip) {
        return Err(ToolError::InvalidFormat("Invalid IP address format".into()));
    }
    lookup.lookup(ip).await
}
