use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use pv_core::errors::GatewayError;
use pv_core::services::verification::{OtpGateway, Receipt, SendReceipt, VerifyReceipt};
use pv_shared::phone::{is_plausible_phone, mask_phone_number};

/// Mock gateway for development and testing
///
/// This implementation:
/// - Rejects phones that do not look dialable with status 400
/// - Accepts exactly one code on verification, anything else is a 401
/// - Can simulate an unavailable API (status 503) per operation
/// - Tracks call counts for assertions
#[derive(Debug)]
pub struct MockOtpGateway {
    accepted_otp: String,
    latency: Option<Duration>,
    fail_sends: AtomicBool,
    fail_verifies: AtomicBool,
    send_count: AtomicU64,
    verify_count: AtomicU64,
}

impl MockOtpGateway {
    /// Create a mock gateway that accepts `accepted_otp`
    pub fn new(accepted_otp: impl Into<String>) -> Self {
        Self {
            accepted_otp: accepted_otp.into(),
            latency: None,
            fail_sends: AtomicBool::new(false),
            fail_verifies: AtomicBool::new(false),
            send_count: AtomicU64::new(0),
            verify_count: AtomicU64::new(0),
        }
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Enable or disable failure simulation for `send_otp`
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Enable or disable failure simulation for `verify_otp`
    pub fn set_fail_verifies(&self, fail: bool) {
        self.fail_verifies.store(fail, Ordering::SeqCst);
    }

    /// Number of `send_otp` calls so far
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Number of `verify_otp` calls so far
    pub fn verify_count(&self) -> u64 {
        self.verify_count.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn unavailable() -> GatewayError {
        GatewayError::Rejected {
            status: 503,
            body: json!({ "success": false, "message": "Simulated service failure" }),
        }
    }
}

impl Default for MockOtpGateway {
    fn default() -> Self {
        Self::new("123456")
    }
}

#[async_trait]
impl OtpGateway for MockOtpGateway {
    async fn send_otp(&self, phone: &str) -> Result<SendReceipt, GatewayError> {
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.simulate_latency().await;

        let masked_phone = mask_phone_number(phone);
        if !is_plausible_phone(phone) {
            warn!(provider = "mock", phone = %masked_phone, "Rejecting implausible phone");
            return Err(GatewayError::Rejected {
                status: 400,
                body: json!({ "success": false, "message": "Invalid phone number" }),
            });
        }

        if self.fail_sends.load(Ordering::SeqCst) {
            warn!(provider = "mock", phone = %masked_phone, "Simulating send failure");
            return Err(Self::unavailable());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        info!(
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            count = count,
            "Mock OTP dispatched"
        );

        Ok(Receipt::new(json!({
            "success": true,
            "message_id": message_id,
        })))
    }

    async fn verify_otp(&self, otp: &str) -> Result<VerifyReceipt, GatewayError> {
        self.verify_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_verifies.load(Ordering::SeqCst) {
            warn!(provider = "mock", "Simulating verify failure");
            return Err(Self::unavailable());
        }

        if otp != self.accepted_otp {
            return Err(GatewayError::Rejected {
                status: 401,
                body: json!({ "success": false, "message": "Invalid OTP" }),
            });
        }

        Ok(Receipt::new(json!({ "success": true })))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
