//! DevTools Server - HTTP REST API for developer transforms
//!
//! Reads `.env` when present, then environment and file configuration.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    server::start_server(config).await?;

    Ok(())
}
