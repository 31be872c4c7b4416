//! Domain-specific error types and error handling.
//!
//! None of these errors is fatal to a machine: gateway failures are
//! funneled into the failed states, and the only construction error is
//! the absence of a runtime to drive effects on.

use serde_json::Value;
use thiserror::Error;


/// Failure payload returned by an OTP gateway
///
/// The machine treats every variant alike (the attempt failed); the
/// payload is kept for observers and for UIs that want to show details.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The API answered with a non-success status
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, body: Value },

    /// The request never produced a response
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A response arrived but its body could not be decoded
    #[error("Malformed response: {message}")]
    Decode { message: String },
}

impl GatewayError {
    /// Shorthand for a [`GatewayError::Transport`]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for a [`GatewayError::Decode`]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// HTTP status when the API rejected the request
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A failed verification attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    /// Dispatching the OTP failed (network or validation)
    #[error("Failed to send OTP: {0}")]
    SendFailure(GatewayError),

    /// Verifying the OTP failed (network, validation, or incorrect code)
    #[error("Failed to verify OTP: {0}")]
    VerifyFailure(GatewayError),
}

impl VerificationError {
    /// The underlying gateway payload
    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            VerificationError::SendFailure(err) | VerificationError::VerifyFailure(err) => err,
        }
    }
}

/// Errors raised while building a machine
#[derive(Error, Debug)]
pub enum MachineError {
    #[error("No Tokio runtime available to drive the verification machine")]
    NoRuntime,
}

pub type MachineResult<T> = Result<T, MachineError>;
