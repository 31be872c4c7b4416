//! # Infrastructure Layer
//!
//! Concrete implementations of the [`OtpGateway`] seam defined in `pv_core`.
//!
//! ## Architecture
//!
//! - **HTTP**: a small JSON fetcher over `reqwest` and the gateway that
//!   talks to the verification API with it
//! - **Mock**: an in-process gateway for development and demos
//!
//! [`create_gateway`] picks the implementation named by the configuration.

use std::sync::Arc;

use pv_core::services::verification::OtpGateway;
use pv_shared::config::{ApiConfig, GatewayProvider};

/// HTTP transport and gateway
pub mod http;

/// In-process gateway
pub mod mock;

pub use http::{HttpOtpGateway, JsonFetcher};
pub use mock::MockOtpGateway;

/// Create the gateway selected by `config`
///
/// # Arguments
///
/// * `config` - API configuration; validated before anything is built
///
/// # Returns
///
/// A shared gateway ready to hand to a machine
pub fn create_gateway(config: &ApiConfig) -> Result<Arc<dyn OtpGateway>, InfrastructureError> {
    config
        .validate()
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let gateway: Arc<dyn OtpGateway> = match config.provider {
        GatewayProvider::Http => Arc::new(HttpOtpGateway::new(config)?),
        GatewayProvider::Mock => Arc::new(MockOtpGateway::new(config.mock_otp.clone())),
    };

    tracing::info!(
        provider = %config.provider,
        gateway = gateway.name(),
        event = "gateway_created",
        "Verification gateway initialized"
    );

    Ok(gateway)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
