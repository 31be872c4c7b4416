//! Trait for the verification API integration

use async_trait::async_trait;

use super::types::{SendReceipt, VerifyReceipt};
use crate::errors::GatewayError;

/// Remote operations the verification machine invokes
///
/// Every outcome is delivered as one of the two tagged results; an
/// implementation must not panic on transport or decode failures.
#[async_trait]
pub trait OtpGateway: Send + Sync {
    /// Ask the API to send an OTP to `phone`
    async fn send_otp(&self, phone: &str) -> Result<SendReceipt, GatewayError>;

    /// Ask the API to verify `otp`
    async fn verify_otp(&self, otp: &str) -> Result<VerifyReceipt, GatewayError>;

    /// Get the gateway name for logs (e.g., "http", "mock")
    fn name(&self) -> &str {
        "gateway"
    }
}
