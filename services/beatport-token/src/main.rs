//! Beatport token manager CLI
//!
//! Interactive front end for the `beatport-auth` library:
//! 1. Loads `.env` and the optional TOML config
//! 2. Reuses the stored token if it is still valid (refreshing it if expired)
//! 3. Otherwise logs in with BEATPORT_USERNAME / BEATPORT_PASSWORD
//! 4. Optionally checks the token against the introspection endpoint

mod config;
mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use beatport_auth::{FileTokenStore, TokenManager};
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; variables already in the environment win
    let dotenv = dotenvy::dotenv();

    // Logs go to stderr so prompts and results on stdout stay readable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = &dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config = Config::resolve(cli_config_path).context("failed to load configuration")?;

    info!(
        token_url = %config.api.token_url,
        base_url = %config.api.base_url,
        token_file = %config.storage.token_file.display(),
        "configuration loaded"
    );

    let store = Arc::new(FileTokenStore::new(config.storage.token_file.clone()));
    let manager = TokenManager::new(reqwest::Client::new(), store, config.endpoints());

    session::run(
        &manager,
        config::credentials_from_env,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}
