//! Observability hook invoked by the driver after each committed transition.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pv_shared::phone::mask_phone_number;

use crate::domain::{Snapshot, State};
use crate::errors::VerificationError;

/// One committed transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    /// Machine instance the transition belongs to
    pub session_id: Uuid,
    /// State before the transition
    pub from: State,
    /// State after the transition
    pub to: State,
    /// Label of the input that caused it (e.g. `SEND_OTP`, `done.sendOtp`)
    pub trigger: &'static str,
    /// When the transition was committed
    pub at: DateTime<Utc>,
    /// Snapshot after the transition
    pub snapshot: Snapshot,
}

impl TransitionRecord {
    /// False for action-only transitions
    pub fn changed_state(&self) -> bool {
        self.from != self.to
    }
}

/// Receives transition and failure notifications from a machine
///
/// Called outside the machine lock, after the transition is committed and
/// its effects started. Implementations must not block.
pub trait TransitionObserver: Send + Sync {
    /// A transition was committed
    fn on_transition(&self, record: &TransitionRecord);

    /// An invoked operation failed and the machine entered a failed state
    fn on_operation_failed(&self, _session_id: Uuid, _error: &VerificationError) {}
}

/// Observer that writes structured `tracing` events
///
/// Phones are masked and OTP values are never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransitionObserver for TracingObserver {
    fn on_transition(&self, record: &TransitionRecord) {
        if record.changed_state() {
            info!(
                session_id = %record.session_id,
                from = %record.from,
                to = %record.to,
                trigger = record.trigger,
                event = "state_transition",
                "Verification state changed"
            );
        } else {
            debug!(
                session_id = %record.session_id,
                state = %record.to,
                trigger = record.trigger,
                phone = %mask_phone_number(&record.snapshot.context.phone),
                otp_len = record.snapshot.context.otp.len(),
                event = "context_updated",
                "Verification context updated"
            );
        }
    }

    fn on_operation_failed(&self, session_id: Uuid, error: &VerificationError) {
        warn!(
            session_id = %session_id,
            error = %error,
            status = ?error.gateway_error().status(),
            event = "operation_failed",
            "Verification operation failed"
        );
    }
}
