//! Unit tests for context and snapshot entities

use crate::domain::entities::{Context, Snapshot};
use crate::domain::value_objects::State;

#[test]
fn test_new_context_has_empty_otp() {
    let context = Context::new("555");
    assert_eq!(context.phone, "555");
    assert!(context.otp.is_empty());
}

#[test]
fn test_with_phone_keeps_otp() {
    let context = Context::new("555").with_otp("123456");
    let updated = context.with_phone("777");

    assert_eq!(updated.phone, "777");
    assert_eq!(updated.otp, "123456");
    // Original is untouched
    assert_eq!(context.phone, "555");
}

#[test]
fn test_verified_phone_only_in_verified_state() {
    let context = Context::new("+14155552671");

    let verified = Snapshot::new(State::OtpVerified, context.clone());
    assert_eq!(verified.verified_phone(), Some("+14155552671"));
    assert!(verified.matches(State::OtpVerified));

    for state in State::ALL.into_iter().filter(|s| *s != State::OtpVerified) {
        let snapshot = Snapshot::new(state, context.clone());
        assert_eq!(snapshot.verified_phone(), None);
    }
}

#[test]
fn test_snapshot_serialization() {
    let snapshot = Snapshot::new(State::OtpSent, Context::new("777").with_otp("12"));
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["state"], "otpSent");
    assert_eq!(value["context"]["phone"], "777");
    assert_eq!(value["context"]["otp"], "12");
}
