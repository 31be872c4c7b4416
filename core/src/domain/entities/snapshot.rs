//! Point-in-time view of a machine.

use serde::{Deserialize, Serialize};

use super::context::Context;
use crate::domain::value_objects::State;

/// State tag and context, read together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Active state
    pub state: State,
    /// Context at the time of the read
    pub context: Context,
}

impl Snapshot {
    /// Creates a snapshot
    pub fn new(state: State, context: Context) -> Self {
        Self { state, context }
    }

    /// Whether the snapshot is in the given state
    pub fn matches(&self, state: State) -> bool {
        self.state == state
    }

    /// The phone that was just verified, if the machine is in `otpVerified`
    pub fn verified_phone(&self) -> Option<&str> {
        match self.state {
            State::OtpVerified => Some(&self.context.phone),
            _ => None,
        }
    }
}
