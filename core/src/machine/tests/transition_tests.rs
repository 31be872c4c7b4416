//! Unit tests for the pure transition table

use crate::domain::{Context, Event, State};
use crate::errors::GatewayError;
use crate::machine::{can_handle, transition, Effect, Input};
use crate::services::verification::Receipt;

fn event(state: State, context: &Context, event: Event) -> Option<crate::machine::Step> {
    transition(state, context, &Input::Event(event))
}

fn all_events() -> Vec<Event> {
    vec![
        Event::update_phone("999"),
        Event::update_otp("000000"),
        Event::SendOtp,
        Event::VerifyOtp,
        Event::change_phone(),
        Event::change_phone_to("888"),
    ]
}

#[test]
fn test_idle_send_otp_invokes_send_with_current_phone() {
    let context = Context::new("777");
    let step = event(State::Idle, &context, Event::SendOtp).unwrap();

    assert_eq!(step.target, State::OtpSending);
    assert!(step.changes_state);
    assert_eq!(
        step.effects,
        vec![Effect::InvokeSendOtp {
            phone: "777".to_string()
        }]
    );
}

#[test]
fn test_update_phone_in_idle_is_action_only() {
    let step = event(State::Idle, &Context::new("555"), Event::update_phone("777")).unwrap();

    assert_eq!(step.target, State::Idle);
    assert!(!step.changes_state);
    assert!(step.effects.is_empty());
    assert_eq!(step.context, Context::new("777"));
}

#[test]
fn test_update_phone_in_verified_returns_to_idle() {
    let step = event(State::OtpVerified, &Context::new("555"), Event::update_phone("777")).unwrap();

    assert_eq!(step.target, State::Idle);
    assert!(step.changes_state);
    assert_eq!(step.context.phone, "777");
    assert_eq!(step.effects, vec![Effect::DisarmVerifiedTimer]);
}

#[test]
fn test_send_settlement_outcomes() {
    let context = Context::new("777");
    let ok = transition(
        State::OtpSending,
        &context,
        &Input::SendOtpSettled(Ok(Receipt::empty())),
    )
    .unwrap();
    assert_eq!(ok.target, State::OtpSent);
    assert_eq!(ok.effects, vec![Effect::AbandonOperation]);

    let failed = transition(
        State::OtpSending,
        &context,
        &Input::SendOtpSettled(Err(GatewayError::transport("down"))),
    )
    .unwrap();
    assert_eq!(failed.target, State::OtpSendFailed);
    assert_eq!(failed.context, context);
}

#[test]
fn test_verify_uses_context_otp_and_arms_timer_on_success() {
    let context = Context::new("777").with_otp("123456");
    let step = event(State::OtpSent, &context, Event::VerifyOtp).unwrap();
    assert_eq!(
        step.effects,
        vec![Effect::InvokeVerifyOtp {
            otp: "123456".to_string()
        }]
    );

    let verified = transition(
        State::OtpVerifying,
        &context,
        &Input::VerifyOtpSettled(Ok(Receipt::empty())),
    )
    .unwrap();
    assert_eq!(verified.target, State::OtpVerified);
    assert_eq!(
        verified.effects,
        vec![Effect::AbandonOperation, Effect::ArmVerifiedTimer]
    );

    let timeout = transition(State::OtpVerified, &context, &Input::VerifiedTimeout).unwrap();
    assert_eq!(timeout.target, State::Idle);
    assert_eq!(timeout.effects, vec![Effect::DisarmVerifiedTimer]);
}

#[test]
fn test_resend_from_verified_disarms_timer_then_invokes() {
    let step = event(State::OtpVerified, &Context::new("777"), Event::SendOtp).unwrap();
    assert_eq!(
        step.effects,
        vec![
            Effect::DisarmVerifiedTimer,
            Effect::InvokeSendOtp {
                phone: "777".to_string()
            }
        ]
    );
}

#[test]
fn test_change_phone_payload_applies_only_after_failed_verification() {
    let context = Context::new("555").with_otp("111111");

    let from_failed = event(State::OtpVerifyFailed, &context, Event::change_phone_to("777")).unwrap();
    assert_eq!(from_failed.target, State::Idle);
    assert_eq!(from_failed.context.phone, "777");

    let bare = event(State::OtpVerifyFailed, &context, Event::change_phone()).unwrap();
    assert_eq!(bare.target, State::Idle);
    assert_eq!(bare.context.phone, "555");

    for state in [State::OtpSent, State::OtpSendFailed] {
        let step = event(state, &context, Event::change_phone_to("777")).unwrap();
        assert_eq!(step.target, State::Idle);
        assert_eq!(step.context.phone, "555", "{state} must not apply the payload");
    }
}

#[test]
fn test_update_otp_only_where_otp_is_entered() {
    let context = Context::new("555");
    for state in State::ALL {
        let handled = event(state, &context, Event::update_otp("42"));
        match state {
            State::OtpSent | State::OtpVerifyFailed => {
                let step = handled.unwrap();
                assert_eq!(step.target, state);
                assert_eq!(step.context.otp, "42");
            }
            _ => assert!(handled.is_none(), "{state} must ignore UPDATE_OTP"),
        }
    }
}

#[test]
fn test_invoking_states_ignore_every_event() {
    let context = Context::new("555");
    for state in [State::OtpSending, State::OtpVerifying] {
        for e in all_events() {
            assert!(event(state, &context, e.clone()).is_none(), "{state} handled {e:?}");
        }
    }
}

#[test]
fn test_settlements_outside_their_state_are_ignored() {
    let context = Context::new("555");
    for state in State::ALL {
        if state != State::OtpSending {
            let input = Input::SendOtpSettled(Ok(Receipt::empty()));
            assert!(transition(state, &context, &input).is_none());
        }
        if state != State::OtpVerifying {
            let input = Input::VerifyOtpSettled(Err(GatewayError::transport("late")));
            assert!(transition(state, &context, &input).is_none());
        }
        if state != State::OtpVerified {
            assert!(transition(state, &context, &Input::VerifiedTimeout).is_none());
        }
    }
}

#[test]
fn test_every_handled_input_lands_in_a_defined_state() {
    let context = Context::new("555").with_otp("1");
    let mut inputs: Vec<Input> = all_events().into_iter().map(Input::from).collect();
    inputs.push(Input::SendOtpSettled(Ok(Receipt::empty())));
    inputs.push(Input::SendOtpSettled(Err(GatewayError::transport("x"))));
    inputs.push(Input::VerifyOtpSettled(Ok(Receipt::empty())));
    inputs.push(Input::VerifyOtpSettled(Err(GatewayError::transport("x"))));
    inputs.push(Input::VerifiedTimeout);

    for state in State::ALL {
        for input in &inputs {
            if let Some(step) = transition(state, &context, input) {
                assert!(State::ALL.contains(&step.target));
                // Action-only steps never carry effects
                if !step.changes_state {
                    assert_eq!(step.target, state);
                    assert!(step.effects.is_empty());
                }
            }
        }
    }
}

#[test]
fn test_can_handle() {
    assert!(can_handle(State::Idle, &Event::SendOtp));
    assert!(!can_handle(State::Idle, &Event::VerifyOtp));
    assert!(can_handle(State::OtpSendFailed, &Event::change_phone()));
    assert!(!can_handle(State::OtpSendFailed, &Event::update_otp("1")));
    assert!(!can_handle(State::OtpSent, &Event::update_phone("1")));
}

#[test]
fn test_input_labels() {
    assert_eq!(Input::from(Event::SendOtp).label(), "SEND_OTP");
    assert_eq!(
        Input::SendOtpSettled(Ok(Receipt::empty())).label(),
        "done.sendOtp"
    );
    assert_eq!(
        Input::VerifyOtpSettled(Err(GatewayError::transport("x"))).label(),
        "error.verifyOtp"
    );
    assert_eq!(Input::VerifiedTimeout.label(), "after.otpVerified");
}
