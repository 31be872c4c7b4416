use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

use pv_shared::phone::mask_phone_number;

use crate::domain::{Event, Snapshot, State};
use crate::machine::{OtpMachine, SubscriptionId};

/// What the UI should render for the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// The editable profile (`idle` or `otpVerified`)
    Profile {
        /// Show the "OTP verified and phone saved" notice
        just_verified: bool,
        /// The edited phone differs from the saved one
        verification_needed: bool,
    },
    /// Waiting for the OTP to be dispatched
    SendingOtp,
    /// Dispatch failed; only resend or change phone are offered
    SendFailed,
    /// OTP input
    OtpEntry {
        /// Input and submit are disabled while the code is checked
        verifying: bool,
        /// The previous code was not accepted
        verify_failed: bool,
    },
}

/// Result of submitting the profile form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The phone changed and an OTP is being sent
    VerificationStarted,
    /// Nothing needed verification; the profile is saved as is
    Saved,
    /// The profile screen is not showing
    Ignored,
}

/// One profile editing session backed by a verification machine
///
/// The saved phone is seeded with the machine's initial phone and replaced
/// every time the machine enters `otpVerified`.
pub struct ProfileForm {
    machine: OtpMachine,
    saved_phone: Arc<Mutex<String>>,
    subscription: SubscriptionId,
}

impl ProfileForm {
    /// Attach a form to `machine`
    pub fn new(machine: OtpMachine) -> Self {
        let saved_phone = Arc::new(Mutex::new(machine.snapshot().context.phone));

        let saved = Arc::clone(&saved_phone);
        let session_id = machine.session_id();
        let subscription = machine.subscribe(move |snapshot: &Snapshot| {
            if let Some(phone) = snapshot.verified_phone() {
                info!(
                    session_id = %session_id,
                    phone = %mask_phone_number(phone),
                    event = "phone_saved",
                    "Verified phone saved"
                );
                *saved.lock().unwrap_or_else(PoisonError::into_inner) = phone.to_string();
            }
        });

        Self {
            machine,
            saved_phone,
            subscription,
        }
    }

    /// The underlying machine
    pub fn machine(&self) -> &OtpMachine {
        &self.machine
    }

    /// Current machine snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// Phone currently in the form
    pub fn phone(&self) -> String {
        self.machine.snapshot().context.phone
    }

    /// Last phone that was verified (or the initial one)
    pub fn saved_phone(&self) -> String {
        self.saved_phone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the edited phone differs from the saved one
    pub fn is_verification_needed(&self) -> bool {
        self.phone() != self.saved_phone()
    }

    /// Classify the current state into a screen
    pub fn screen(&self) -> Screen {
        match self.machine.state() {
            state @ (State::Idle | State::OtpVerified) => Screen::Profile {
                just_verified: state == State::OtpVerified,
                verification_needed: self.is_verification_needed(),
            },
            State::OtpSending => Screen::SendingOtp,
            State::OtpSendFailed => Screen::SendFailed,
            state @ (State::OtpSent | State::OtpVerifying | State::OtpVerifyFailed) => {
                Screen::OtpEntry {
                    verifying: state.is_invoking(),
                    verify_failed: state.is_failed(),
                }
            }
        }
    }

    /// Submit the profile form
    ///
    /// Starts verification when the phone changed, otherwise the profile is
    /// saved without involving the machine.
    pub fn submit(&self) -> SubmitOutcome {
        if !matches!(self.screen(), Screen::Profile { .. }) {
            return SubmitOutcome::Ignored;
        }

        if self.is_verification_needed() {
            self.machine.send(Event::SendOtp);
            SubmitOutcome::VerificationStarted
        } else {
            info!(
                session_id = %self.machine.session_id(),
                event = "profile_saved",
                "Profile saved without verification"
            );
            SubmitOutcome::Saved
        }
    }

    /// Edit the phone field
    pub fn update_phone(&self, phone: impl Into<String>) {
        self.machine.send(Event::update_phone(phone));
    }

    /// Edit the OTP field
    pub fn update_otp(&self, otp: impl Into<String>) {
        self.machine.send(Event::update_otp(otp));
    }

    /// Submit the OTP for verification
    pub fn submit_otp(&self) {
        self.machine.send(Event::VerifyOtp);
    }

    /// Request another OTP
    pub fn resend_otp(&self) {
        self.machine.send(Event::SendOtp);
    }

    /// Abandon verification and go back to the profile
    pub fn change_phone(&self) {
        self.machine.send(Event::change_phone());
    }
}

impl Drop for ProfileForm {
    fn drop(&mut self) {
        self.machine.unsubscribe(self.subscription);
    }
}
