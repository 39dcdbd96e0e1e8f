//! DevTools Server - HTTP REST API for everyday developer transforms
//!
//! This crate exposes the `devtools` library over HTTP. Every tool lives
//! under `/api/v1/<tool>` and answers with the same `{message, data}`
//! envelope, on success and on failure alike.
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: Status codes derived from typed tool errors
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /api/v1` - Tool index
//! - `POST /api/v1/json/format`, `POST /api/v1/json/validate`
//! - `POST /api/v1/encoding/base64`, `POST /api/v1/encoding/url`
//! - `GET /api/v1/uuid/v4`, `GET /api/v1/uuid/v1`, `POST /api/v1/uuid/validate`
//! - `POST /api/v1/time/convert`, `GET /api/v1/time/now`, `GET /api/v1/time/timezones`
//! - `POST /api/v1/regex/test`, `GET /api/v1/regex/flags`
//! - `POST /api/v1/ip/lookup`, `GET /api/v1/ip/myip`
//! - `POST /api/v1/markdown/convert`
//! - `POST /api/v1/minifier/minify`
//! - `POST /api/v1/beautifier/format`
//!
//! `GET /api/v1/<tool>` describes each tool's endpoints.

pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
