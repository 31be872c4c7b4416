//! Events delivered to the verification state machine.

use serde::{Deserialize, Serialize};

/// An external event dispatched by the UI layer
///
/// Serialized as a tagged object, e.g. `{"type":"UPDATE_PHONE","phone":"777"}`
/// or `{"type":"SEND_OTP"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// The phone input changed
    UpdatePhone { phone: String },
    /// The OTP input changed
    UpdateOtp { otp: String },
    /// Request (or re-request) an OTP for the current phone
    SendOtp,
    /// Submit the current OTP for verification
    VerifyOtp,
    /// Abandon the current attempt and go back to editing the phone
    ///
    /// The phone is optional; it is applied only where the transition table
    /// updates the phone on this event.
    ChangePhone {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
    },
}

impl Event {
    /// `UPDATE_PHONE` carrying the new value
    pub fn update_phone(phone: impl Into<String>) -> Self {
        Event::UpdatePhone {
            phone: phone.into(),
        }
    }

    /// `UPDATE_OTP` carrying the new value
    pub fn update_otp(otp: impl Into<String>) -> Self {
        Event::UpdateOtp { otp: otp.into() }
    }

    /// `CHANGE_PHONE` without a payload
    pub fn change_phone() -> Self {
        Event::ChangePhone { phone: None }
    }

    /// `CHANGE_PHONE` carrying a replacement phone
    pub fn change_phone_to(phone: impl Into<String>) -> Self {
        Event::ChangePhone {
            phone: Some(phone.into()),
        }
    }

    /// Event type tag, as on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Event::UpdatePhone { .. } => "UPDATE_PHONE",
            Event::UpdateOtp { .. } => "UPDATE_OTP",
            Event::SendOtp => "SEND_OTP",
            Event::VerifyOtp => "VERIFY_OTP",
            Event::ChangePhone { .. } => "CHANGE_PHONE",
        }
    }
}
