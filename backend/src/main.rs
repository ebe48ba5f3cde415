//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! Configuration comes from the environment (see `.env.example`);
//! `ALLOWED_ORIGINS` is a comma-separated CORS allow-list.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = ServerConfig::default();
    if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
        config.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    start_server(config).await
}
