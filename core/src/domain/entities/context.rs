//! Machine context: the phone being edited and the OTP being entered.

use serde::{Deserialize, Serialize};

/// Extended state carried alongside the state tag
///
/// Lives for the lifetime of one machine instance. Only machine actions
/// replace its fields; nothing resets it automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Current phone value. Always defined.
    pub phone: String,

    /// Current OTP value. Only meaningful once an OTP has been sent.
    pub otp: String,
}

impl Context {
    /// Creates the initial context for a session
    ///
    /// # Arguments
    ///
    /// * `phone` - The phone the profile currently holds
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            otp: String::new(),
        }
    }

    /// Copy with the phone replaced
    pub fn with_phone(&self, phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            otp: self.otp.clone(),
        }
    }

    /// Copy with the OTP replaced
    pub fn with_otp(&self, otp: impl Into<String>) -> Self {
        Self {
            phone: self.phone.clone(),
            otp: otp.into(),
        }
    }
}
