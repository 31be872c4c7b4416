//! Types for verification operation results

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful response of a verification operation
///
/// The body is opaque to the machine, which only needs to know the
/// operation succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Parsed response body
    pub body: Value,
}

impl Receipt {
    /// Wrap a parsed response body
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// A receipt with an empty JSON object body
    pub fn empty() -> Self {
        Self {
            body: Value::Object(Default::default()),
        }
    }
}

/// Result of a successful `send_otp`
pub type SendReceipt = Receipt;

/// Result of a successful `verify_otp`
pub type VerifyReceipt = Receipt;
