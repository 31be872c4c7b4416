//! State tags of the verification state machine.

use serde::{Deserialize, Serialize};

/// Where the user is in the send/verify lifecycle
///
/// The machine is cyclic: there is no terminal state. Exactly one state is
/// active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum State {
    /// No verification in progress; the phone is trusted as last verified
    Idle,
    /// Request to send an OTP is in flight
    OtpSending,
    /// OTP dispatched, awaiting user entry
    OtpSent,
    /// The send attempt failed
    OtpSendFailed,
    /// Request to verify the OTP is in flight
    OtpVerifying,
    /// OTP confirmed; the phone is now trusted
    OtpVerified,
    /// Verification failed
    OtpVerifyFailed,
}

impl State {
    /// Every state, in lifecycle order
    pub const ALL: [State; 7] = [
        State::Idle,
        State::OtpSending,
        State::OtpSent,
        State::OtpSendFailed,
        State::OtpVerifying,
        State::OtpVerified,
        State::OtpVerifyFailed,
    ];

    /// The state tag as used on the wire and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::OtpSending => "otpSending",
            State::OtpSent => "otpSent",
            State::OtpSendFailed => "otpSendFailed",
            State::OtpVerifying => "otpVerifying",
            State::OtpVerified => "otpVerified",
            State::OtpVerifyFailed => "otpVerifyFailed",
        }
    }

    /// Whether entering this state invokes a remote operation
    pub fn is_invoking(&self) -> bool {
        matches!(self, State::OtpSending | State::OtpVerifying)
    }

    /// Whether this state records a failed attempt
    pub fn is_failed(&self) -> bool {
        matches!(self, State::OtpSendFailed | State::OtpVerifyFailed)
    }
}

impl Default for State {
    fn default() -> Self {
        State::Idle
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        State::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown state: {}", s))
    }
}
