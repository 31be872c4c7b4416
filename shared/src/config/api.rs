//! Verification API configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{ConfigError, ConfigResult};

/// Which gateway implementation backs the OTP operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProvider {
    /// JSON over HTTP against the verification API
    Http,
    /// In-process gateway for development
    Mock,
}

impl std::fmt::Display for GatewayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayProvider::Http => write!(f, "http"),
            GatewayProvider::Mock => write!(f, "mock"),
        }
    }
}

/// Verification API configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Gateway provider
    #[serde(default = "default_provider")]
    pub provider: GatewayProvider,

    /// Base URL of the verification API (e.g. `http://localhost:3000`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the send endpoint
    #[serde(default = "default_send_otp_path")]
    pub send_otp_path: String,

    /// Path of the verify endpoint
    #[serde(default = "default_verify_otp_path")]
    pub verify_otp_path: String,

    /// Path of the endpoint returning the profile's saved phone
    #[serde(default = "default_saved_phone_path")]
    pub saved_phone_path: String,

    /// Optional request timeout. Unset means requests are never timed out
    /// client-side and only the server decides the outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Code accepted by the mock gateway
    #[serde(default = "default_mock_otp")]
    pub mock_otp: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            send_otp_path: default_send_otp_path(),
            verify_otp_path: default_verify_otp_path(),
            saved_phone_path: default_saved_phone_path(),
            request_timeout_secs: None,
            mock_otp: default_mock_otp(),
        }
    }
}

impl ApiConfig {
    /// Create an HTTP configuration for the given base URL
    pub fn http(base_url: impl Into<String>) -> Self {
        Self {
            provider: GatewayProvider::Http,
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a mock configuration accepting the given code
    pub fn mock(accepted_otp: impl Into<String>) -> Self {
        Self {
            provider: GatewayProvider::Mock,
            mock_otp: accepted_otp.into(),
            ..Default::default()
        }
    }

    /// Set a client-side request timeout
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Request timeout as a duration, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Full URL of the send endpoint
    pub fn send_otp_url(&self) -> String {
        join_url(&self.base_url, &self.send_otp_path)
    }

    /// Full URL of the verify endpoint
    pub fn verify_otp_url(&self) -> String {
        join_url(&self.base_url, &self.verify_otp_path)
    }

    /// Full URL of the saved-phone endpoint
    pub fn saved_phone_url(&self) -> String {
        join_url(&self.base_url, &self.saved_phone_path)
    }

    /// Validate values that serde cannot check
    pub fn validate(&self) -> ConfigResult<()> {
        if self.provider == GatewayProvider::Http && self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid(
                "api.base_url",
                "must be set when the http provider is selected",
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "api.request_timeout_secs",
                "must be greater than zero when set",
            ));
        }
        if self.provider == GatewayProvider::Mock && self.mock_otp.is_empty() {
            return Err(ConfigError::invalid("api.mock_otp", "must not be empty"));
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_provider() -> GatewayProvider {
    GatewayProvider::Http
}

fn default_base_url() -> String {
    String::from("http://localhost:3000")
}

fn default_send_otp_path() -> String {
    String::from("/api/sendOtp")
}

fn default_verify_otp_path() -> String {
    String::from("/api/verifyOtp")
}

fn default_saved_phone_path() -> String {
    String::from("/api/getSavedPhone")
}

fn default_mock_otp() -> String {
    String::from("123456")
}
