//! Server configuration with validation.
//!
//! Configuration merges, in increasing precedence: built-in defaults, a
//! `triplecast.toml` file, and `TRIPLECAST_`-prefixed environment
//! variables (nested keys separated by `__`, e.g.
//! `TRIPLECAST_SERVER__PORT=8080`).

use crate::error::{ServiceError, ServiceResult};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use validator::Validate;

/// Default configuration file name
pub const CONFIG_FILE: &str = "triplecast.toml";

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(nested)]
    pub server: ServerSettings,

    #[validate(nested)]
    pub backend: BackendSettings,

    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,

    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

/// Backing store settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BackendSettings {
    /// SPARQL endpoint URL of the backing store
    #[validate(length(min = 1))]
    pub endpoint: String,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8100,
                request_timeout_secs: 30,
            },
            backend: BackendSettings {
                endpoint: "http://localhost:3030/ds/query".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, an optional file, and the
    /// environment, then validate it.
    pub fn load(path: Option<&Path>) -> ServiceResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
        figment = match path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment.merge(Toml::file(CONFIG_FILE)),
        };
        let config: ServerConfig = figment
            .merge(Env::prefixed("TRIPLECAST_").split("__"))
            .extract()
            .map_err(|e| ServiceError::configuration(format!("failed to load configuration: {e}")))?;

        config
            .validate()
            .map_err(|e| ServiceError::configuration(format!("invalid configuration: {e}")))?;

        if let Some(path) = path {
            info!("configuration loaded from {}", path.display());
        }
        Ok(config)
    }
}
