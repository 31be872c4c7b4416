//! Shared utilities and common types for Phone Verify
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types and the layered configuration loader
//! - Shared error types
//! - Utility functions (phone normalization, masking for logs)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    ApiConfig, AppConfig, Environment, GatewayProvider, LogFormat, LoggingConfig,
    MachineConfig,
};
pub use errors::{ConfigError, ConfigResult};
pub use utils::phone;
