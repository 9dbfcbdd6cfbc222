//! Configuration management for the forecast service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TWF_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Client key used when none is configured
pub const DEFAULT_CLIENT_API_KEY: &str = "default_client_key";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Forecast storage backend
    pub storage: StorageConfig,

    /// CWA open data API configuration
    pub cwa: CwaConfig,

    /// Client authentication
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CwaConfig {
    /// CWA API base URL
    pub base_url: String,

    /// CWA authorization key
    pub api_key: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Key clients must present in `X-API-Key`
    pub client_api_key: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("TWF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/forecasts")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("storage.backend", "postgres")?
            .set_default("cwa.base_url", "https://opendata.cwa.gov.tw/api")?
            .set_default("cwa.api_key", "")?
            .set_default("cwa.timeout_ms", 3000)?
            .set_default("auth.client_api_key", DEFAULT_CLIENT_API_KEY)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TWF_ prefix)
            .add_source(
                Environment::with_prefix("TWF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Settings that load fine but will not work well in practice
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.cwa.api_key.trim().is_empty() {
            warnings.push("Missing CWA API key - set TWF__CWA__API_KEY".to_string());
        }

        if self.auth.client_api_key == DEFAULT_CLIENT_API_KEY {
            warnings.push(
                "Using default client API key - set TWF__AUTH__CLIENT_API_KEY".to_string(),
            );
        }

        if self.storage.backend == StorageBackend::Memory && self.environment == "production" {
            warnings.push("In-memory storage does not survive restarts".to_string());
        }

        warnings
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/forecasts".to_string(),
                max_connections: 10,
                min_connections: 2,
                acquire_timeout_secs: 30,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            cwa: CwaConfig {
                base_url: "https://opendata.cwa.gov.tw/api".to_string(),
                api_key: "CWA-KEY".to_string(),
                timeout_ms: 3000,
            },
            auth: AuthConfig {
                client_api_key: "secret".to_string(),
            },
        }
    }

    #[test]
    fn test_no_warnings_for_complete_config() {
        assert!(sample().warnings().is_empty());
    }

    #[test]
    fn test_warnings_for_missing_keys() {
        let mut config = sample();
        config.cwa.api_key = String::new();
        config.auth.client_api_key = DEFAULT_CLIENT_API_KEY.to_string();
        config.environment = "production".to_string();
        assert_eq!(config.warnings().len(), 3);
    }
}
