//! Verification state machine
//!
//! The machine is split in two halves:
//! - [`transition`] is a pure function from `(state, context, input)` to the
//!   next state, the next context, and the entry/exit effects to run
//! - [`OtpMachine`] is the driver: it owns one instance, serializes inputs
//!   (run-to-completion), runs effects on the Tokio runtime, suppresses stale
//!   results, and notifies observers and subscribers
//!
//! | State | Accepts |
//! |---|---|
//! | `idle` | `SEND_OTP`, `UPDATE_PHONE` |
//! | `otpSending` | send result |
//! | `otpSent` | `SEND_OTP`, `VERIFY_OTP`, `CHANGE_PHONE`, `UPDATE_OTP` |
//! | `otpSendFailed` | `SEND_OTP`, `CHANGE_PHONE` |
//! | `otpVerifying` | verify result |
//! | `otpVerified` | `SEND_OTP`, `UPDATE_PHONE`, linger timeout |
//! | `otpVerifyFailed` | `SEND_OTP`, `VERIFY_OTP`, `CHANGE_PHONE`, `UPDATE_OTP` |

mod instance;
mod observer;
mod transition;

#[cfg(test)]
pub(crate) mod tests;

pub use instance::{Listener, MachineBuilder, OtpMachine, SubscriptionId};
pub use observer::{TracingObserver, TransitionObserver, TransitionRecord};
pub use transition::{can_handle, transition, Effect, Input, Step};
