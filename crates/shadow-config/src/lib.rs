//! # shadow-config
//!
//! Layered configuration loading for shadowsync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SHADOWSYNC_*` prefix, `__` as separator)
//! 2. Project-level `.shadowsync/config.toml`
//! 3. User-level `~/.config/shadowsync/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SHADOWSYNC_CONNECTION__REGION` -> `connection.region`,
//! `SHADOWSYNC_BATCH__CONCURRENCY` -> `batch.concurrency`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use shadow_config::ShadowConfig;
//!
//! let config = ShadowConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("endpoint: {}", config.connection.endpoint_url());
//! ```

mod batch;
mod connection;
mod credentials;
mod error;
mod provisioning;

pub use batch::{BatchConfig, DEFAULT_CONCURRENCY};
pub use connection::ConnectionConfig;
pub use credentials::CredentialsConfig;
pub use error::ConfigError;
pub use provisioning::ProvisioningConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShadowConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
}

impl ShadowConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".shadowsync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SHADOWSYNC_").split("__"))
    }

    /// Reject values that would make the client or orchestrator unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.concurrency",
                reason: "must be at least 1",
            });
        }
        if self.connection.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connection.request_timeout_secs",
                reason: "must be at least 1",
            });
        }
        if self.connection.region.trim().is_empty() && self.connection.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "connection.region",
                reason: "must be set when connection.endpoint is empty",
            });
        }
        Ok(())
    }

    /// Fail unless the provisioning section is usable.
    pub fn require_provisioning(&self) -> Result<&ProvisioningConfig, ConfigError> {
        if self.provisioning.is_configured() {
            Ok(&self.provisioning)
        } else {
            Err(ConfigError::MissingSection {
                section: "provisioning",
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shadowsync").join("config.toml"))
    }
}
