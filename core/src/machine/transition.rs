//! Pure transition table of the verification machine.

use crate::domain::{Context, Event, State};
use crate::errors::GatewayError;
use crate::services::verification::{SendReceipt, VerifyReceipt};

/// Anything the machine reacts to
///
/// External events come from the UI; the other variants are posted back
/// by the driver when an invoked operation settles or the linger timer
/// elapses.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// An event dispatched by the UI
    Event(Event),
    /// `send_otp` settled
    SendOtpSettled(Result<SendReceipt, GatewayError>),
    /// `verify_otp` settled
    VerifyOtpSettled(Result<VerifyReceipt, GatewayError>),
    /// The `otpVerified` linger delay elapsed
    VerifiedTimeout,
}

impl Input {
    /// Short label used in logs and transition records
    pub fn label(&self) -> &'static str {
        match self {
            Input::Event(event) => event.kind(),
            Input::SendOtpSettled(Ok(_)) => "done.sendOtp",
            Input::SendOtpSettled(Err(_)) => "error.sendOtp",
            Input::VerifyOtpSettled(Ok(_)) => "done.verifyOtp",
            Input::VerifyOtpSettled(Err(_)) => "error.verifyOtp",
            Input::VerifiedTimeout => "after.otpVerified",
        }
    }
}

impl From<Event> for Input {
    fn from(event: Event) -> Self {
        Input::Event(event)
    }
}

/// Side effect requested by a transition, run by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start `send_otp` for the given phone
    InvokeSendOtp { phone: String },
    /// Start `verify_otp` for the given code
    InvokeVerifyOtp { otp: String },
    /// The invoking state was left; its result must be ignored
    AbandonOperation,
    /// Start the `otpVerified` linger timer
    ArmVerifiedTimer,
    /// Cancel the linger timer
    DisarmVerifiedTimer,
}

/// Outcome of a handled input
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// State after the transition
    pub target: State,
    /// Context after the transition's actions
    pub context: Context,
    /// Exit effects of the old state followed by entry effects of the new one
    pub effects: Vec<Effect>,
    /// False for action-only transitions, which neither exit nor re-enter
    pub changes_state: bool,
}

impl Step {
    fn stay(state: State, context: Context) -> Self {
        Self {
            target: state,
            context,
            effects: Vec::new(),
            changes_state: false,
        }
    }

    fn goto(from: State, to: State, context: Context) -> Self {
        let mut effects = exit_effects(from);
        effects.extend(entry_effects(to, &context));
        Self {
            target: to,
            context,
            effects,
            changes_state: true,
        }
    }
}

fn exit_effects(state: State) -> Vec<Effect> {
    match state {
        State::OtpSending | State::OtpVerifying => vec![Effect::AbandonOperation],
        State::OtpVerified => vec![Effect::DisarmVerifiedTimer],
        _ => Vec::new(),
    }
}

fn entry_effects(state: State, context: &Context) -> Vec<Effect> {
    match state {
        State::OtpSending => vec![Effect::InvokeSendOtp {
            phone: context.phone.clone(),
        }],
        State::OtpVerifying => vec![Effect::InvokeVerifyOtp {
            otp: context.otp.clone(),
        }],
        State::OtpVerified => vec![Effect::ArmVerifiedTimer],
        _ => Vec::new(),
    }
}

/// Compute the transition for `input` in `state`
///
/// Returns `None` when the state does not handle the input. Callers treat
/// that as a no-op: nothing changes and nobody is notified.
pub fn transition(state: State, context: &Context, input: &Input) -> Option<Step> {
    use State::*;

    let step = match (state, input) {
        (Idle, Input::Event(Event::SendOtp)) => Step::goto(state, OtpSending, context.clone()),
        (Idle, Input::Event(Event::UpdatePhone { phone })) => {
            Step::stay(state, context.with_phone(phone.as_str()))
        }

        (OtpSending, Input::SendOtpSettled(Ok(_))) => Step::goto(state, OtpSent, context.clone()),
        (OtpSending, Input::SendOtpSettled(Err(_))) => {
            Step::goto(state, OtpSendFailed, context.clone())
        }

        (OtpSent, Input::Event(Event::SendOtp)) => Step::goto(state, OtpSending, context.clone()),
        (OtpSent, Input::Event(Event::VerifyOtp)) => {
            Step::goto(state, OtpVerifying, context.clone())
        }
        (OtpSent, Input::Event(Event::ChangePhone { .. })) => {
            Step::goto(state, Idle, context.clone())
        }
        (OtpSent, Input::Event(Event::UpdateOtp { otp })) => {
            Step::stay(state, context.with_otp(otp.as_str()))
        }

        (OtpSendFailed, Input::Event(Event::SendOtp)) => {
            Step::goto(state, OtpSending, context.clone())
        }
        (OtpSendFailed, Input::Event(Event::ChangePhone { .. })) => {
            Step::goto(state, Idle, context.clone())
        }

        (OtpVerifying, Input::VerifyOtpSettled(Ok(_))) => {
            Step::goto(state, OtpVerified, context.clone())
        }
        (OtpVerifying, Input::VerifyOtpSettled(Err(_))) => {
            Step::goto(state, OtpVerifyFailed, context.clone())
        }

        (OtpVerified, Input::Event(Event::SendOtp)) => {
            Step::goto(state, OtpSending, context.clone())
        }
        (OtpVerified, Input::Event(Event::UpdatePhone { phone })) => {
            Step::goto(state, Idle, context.with_phone(phone.as_str()))
        }
        (OtpVerified, Input::VerifiedTimeout) => Step::goto(state, Idle, context.clone()),

        (OtpVerifyFailed, Input::Event(Event::SendOtp)) => {
            Step::goto(state, OtpSending, context.clone())
        }
        (OtpVerifyFailed, Input::Event(Event::VerifyOtp)) => {
            Step::goto(state, OtpVerifying, context.clone())
        }
        (OtpVerifyFailed, Input::Event(Event::ChangePhone { phone })) => {
            let context = match phone {
                Some(phone) => context.with_phone(phone.as_str()),
                None => context.clone(),
            };
            Step::goto(state, Idle, context)
        }
        (OtpVerifyFailed, Input::Event(Event::UpdateOtp { otp })) => {
            Step::stay(state, context.with_otp(otp.as_str()))
        }

        _ => return None,
    };

    Some(step)
}

/// Whether `state` reacts to `event` at all
///
/// Useful for enabling or disabling UI controls.
pub fn can_handle(state: State, event: &Event) -> bool {
    transition(state, &Context::default(), &Input::Event(event.clone())).is_some()
}
