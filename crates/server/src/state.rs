use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use devtools::{HttpIpLookup, IpLookup};
use std::sync::Arc;

/// Shared application state
///
/// Read-only after startup; every handler gets a clone of the `Arc`.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Geolocation backend for the IP routes
    pub ip_lookup: Arc<dyn IpLookup>,
}

impl ServerState {
    /// Create state with the HTTP lookup backend described by `config`
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let lookup = HttpIpLookup::new(config.ipinfo_token.clone(), config.lookup_timeout())
            .map_err(|e| ServerError::Config(e.detail().to_string()))?;
        Ok(Self::with_lookup(config, Arc::new(lookup)))
    }

    /// Create state around an existing lookup backend
    pub fn with_lookup(config: ServerConfig, ip_lookup: Arc<dyn IpLookup>) -> Self {
        Self {
            config: Arc::new(config),
            ip_lookup,
        }
    }
}
