//! Configuration module with area-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `api` - Verification API endpoints and gateway selection
//! - `environment` - Environment detection and logging configuration
//! - `machine` - Verification state machine timing
//!
//! [`AppConfig::load`] layers the sources in this order, later ones winning:
//! environment defaults, an optional config file, then `PV__*` variables
//! (e.g. `PV__API__BASE_URL`, `PV__MACHINE__VERIFIED_LINGER_MS`).

pub mod api;
pub mod environment;
pub mod machine;

use config::{Config, Environment as EnvSource, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigResult;

// Re-export commonly used types
pub use api::{ApiConfig, GatewayProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use machine::{MachineConfig, DEFAULT_VERIFIED_LINGER_MS};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "PV";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Verification API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// State machine configuration
    #[serde(default)]
    pub machine: MachineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Create configuration for development environment
    ///
    /// Development talks to the mock gateway so the flow can be exercised
    /// without a running verification API.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig::mock("123456"),
            machine: MachineConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig::default(),
            machine: MachineConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Defaults for the given environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Load configuration for the environment named by `ENVIRONMENT`
    ///
    /// # Arguments
    ///
    /// * `path` - Explicit config file. When absent the environment's
    ///   default file (e.g. `config.development.toml`) is used if it exists.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(Environment::from_env(), path)
    }

    /// Load configuration for an explicit environment
    pub fn load_with(environment: Environment, path: Option<&Path>) -> ConfigResult<Self> {
        let defaults = Self::for_environment(environment);

        let builder = Config::builder().add_source(Config::try_from(&defaults)?);
        let builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(environment.config_file()).required(false)),
        };

        let config: Self = builder
            .add_source(EnvSource::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.machine.validate()?;
        Ok(())
    }
}
