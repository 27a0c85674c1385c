//! Configuration types and loading
//!
//! Config file precedence: `--config` CLI arg > `CONFIG_PATH` env var >
//! `beatport-token.toml` in the working directory. Every field has a
//! default, so running without any config file is normal.
//!
//! Credentials never live in the TOML. They come from `BEATPORT_USERNAME`
//! and `BEATPORT_PASSWORD`, which a `.env` file may provide.

use std::path::{Path, PathBuf};

use beatport_auth::{API_BASE_URL, Credentials, Endpoints, TOKEN_ENDPOINT, TOKEN_FILE};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "beatport-token.toml";
pub const USERNAME_ENV: &str = "BEATPORT_USERNAME";
pub const PASSWORD_ENV: &str = "BEATPORT_PASSWORD";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

/// Token endpoint and API location
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub token_url: String,
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_url: TOKEN_ENDPOINT.to_string(),
            base_url: API_BASE_URL.to_string(),
        }
    }
}

/// Where the token record is persisted
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub token_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(TOKEN_FILE),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and load configuration.
    ///
    /// An explicitly named file (CLI arg or `CONFIG_PATH`) must exist. The
    /// default file is optional; without it the built-in defaults apply.
    pub fn resolve(cli_path: Option<&str>) -> common::Result<Self> {
        if let Some(p) = cli_path {
            return Self::load(Path::new(p));
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return Self::load(Path::new(&p));
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load(default_path);
        }
        Ok(Self::default())
    }

    fn validate(&self) -> common::Result<()> {
        for (name, url) in [
            ("token_url", &self.api.token_url),
            ("base_url", &self.api.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if self.storage.token_file.as_os_str().is_empty() {
            return Err(common::Error::Config(
                "token_file must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            token_url: self.api.token_url.clone(),
            base_url: self.api.base_url.clone(),
        }
    }
}

/// Read account credentials from the environment.
pub fn credentials_from_env() -> common::Result<Credentials> {
    let username = require_env(USERNAME_ENV)?;
    let password = require_env(PASSWORD_ENV)?;
    Ok(Credentials::new(username, password))
}

fn require_env(key: &str) -> common::Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(common::Error::MissingEnv(key.to_string())),
    }
}
