//! Unit tests for state tags

use crate::domain::value_objects::State;

#[test]
fn test_state_tags_round_trip_through_from_str() {
    for state in State::ALL {
        assert_eq!(state.as_str().parse::<State>().unwrap(), state);
        assert_eq!(state.to_string(), state.as_str());
    }
    assert!("verified".parse::<State>().is_err());
}

#[test]
fn test_state_serializes_as_camel_case_tag() {
    let json = serde_json::to_string(&State::OtpVerifyFailed).unwrap();
    assert_eq!(json, "\"otpVerifyFailed\"");

    let state: State = serde_json::from_str("\"otpSending\"").unwrap();
    assert_eq!(state, State::OtpSending);
}

#[test]
fn test_state_classification() {
    let invoking: Vec<State> = State::ALL.into_iter().filter(State::is_invoking).collect();
    assert_eq!(invoking, vec![State::OtpSending, State::OtpVerifying]);

    let failed: Vec<State> = State::ALL.into_iter().filter(State::is_failed).collect();
    assert_eq!(failed, vec![State::OtpSendFailed, State::OtpVerifyFailed]);

    assert_eq!(State::default(), State::Idle);
}
