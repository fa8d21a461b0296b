//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub importer: ImporterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Profile registered at startup and used as the default namespace.
    pub profile: String,
    pub profile_name: String,
    /// Display currency code, passed through to consumers untouched.
    pub currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub database_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImporterConfig {
    pub enabled: bool,
    pub api_key_env: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
