//! Verification state machine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{ConfigError, ConfigResult};

/// Default time the machine lingers in `otpVerified` before returning to `idle`
pub const DEFAULT_VERIFIED_LINGER_MS: u64 = 1300;

/// Verification state machine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MachineConfig {
    /// Milliseconds spent in `otpVerified` before the automatic return to `idle`
    #[serde(default = "default_verified_linger_ms")]
    pub verified_linger_ms: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            verified_linger_ms: DEFAULT_VERIFIED_LINGER_MS,
        }
    }
}

impl MachineConfig {
    /// Replace the linger duration
    ///
    /// Durations beyond `u64::MAX` milliseconds saturate.
    pub fn with_verified_linger(mut self, linger: Duration) -> Self {
        self.verified_linger_ms = u64::try_from(linger.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Linger duration for the `otpVerified` state
    pub fn verified_linger(&self) -> Duration {
        Duration::from_millis(self.verified_linger_ms)
    }

    /// Validate values that serde cannot check
    pub fn validate(&self) -> ConfigResult<()> {
        if self.verified_linger_ms == 0 {
            return Err(ConfigError::invalid(
                "machine.verified_linger_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_verified_linger_ms() -> u64 {
    DEFAULT_VERIFIED_LINGER_MS
}
