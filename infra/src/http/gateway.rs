use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use pv_core::errors::GatewayError;
use pv_core::services::verification::{OtpGateway, Receipt, SendReceipt, VerifyReceipt};
use pv_shared::config::ApiConfig;
use pv_shared::phone::mask_phone_number;

use super::fetcher::JsonFetcher;
use crate::InfrastructureError;

/// Gateway backed by the verification API
///
/// `send_otp` posts `{"phone": ...}` and `verify_otp` posts `{"otp": ...}`
/// to the configured endpoints.
#[derive(Debug, Clone)]
pub struct HttpOtpGateway {
    fetcher: JsonFetcher,
    send_otp_url: String,
    verify_otp_url: String,
    saved_phone_url: String,
}

impl HttpOtpGateway {
    /// Create a gateway for the endpoints in `config`
    pub fn new(config: &ApiConfig) -> Result<Self, InfrastructureError> {
        Ok(Self::with_fetcher(
            config,
            JsonFetcher::new(config.request_timeout())?,
        ))
    }

    /// Create a gateway that reuses an existing fetcher
    pub fn with_fetcher(config: &ApiConfig, fetcher: JsonFetcher) -> Self {
        Self {
            fetcher,
            send_otp_url: config.send_otp_url(),
            verify_otp_url: config.verify_otp_url(),
            saved_phone_url: config.saved_phone_url(),
        }
    }

    /// Fetch the phone currently saved on the profile
    ///
    /// Expects a body of the form `{"data": {"phone": "..."}}`.
    pub async fn fetch_saved_phone(&self) -> Result<String, GatewayError> {
        let body = self.fetcher.get_json(&self.saved_phone_url).await?;
        extract_saved_phone(&body).ok_or_else(|| {
            GatewayError::decode(format!(
                "{} did not return data.phone",
                self.saved_phone_url
            ))
        })
    }
}

fn extract_saved_phone(body: &Value) -> Option<String> {
    match body.pointer("/data/phone")? {
        Value::String(phone) => Some(phone.clone()),
        Value::Number(phone) => Some(phone.to_string()),
        _ => None,
    }
}

#[async_trait]
impl OtpGateway for HttpOtpGateway {
    async fn send_otp(&self, phone: &str) -> Result<SendReceipt, GatewayError> {
        debug!(
            url = %self.send_otp_url,
            phone = %mask_phone_number(phone),
            "Requesting OTP dispatch"
        );
        let body = self
            .fetcher
            .post_json(&self.send_otp_url, &json!({ "phone": phone }))
            .await?;
        Ok(Receipt::new(body))
    }

    async fn verify_otp(&self, otp: &str) -> Result<VerifyReceipt, GatewayError> {
        debug!(url = %self.verify_otp_url, "Requesting OTP verification");
        let body = self
            .fetcher
            .post_json(&self.verify_otp_url, &json!({ "otp": otp }))
            .await?;
        Ok(Receipt::new(body))
    }

    fn name(&self) -> &str {
        "http"
    }
}
