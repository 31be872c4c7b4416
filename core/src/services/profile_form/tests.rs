use std::sync::Arc;
use std::time::Duration;

use super::{ProfileForm, Screen, SubmitOutcome};
use crate::domain::State;
use crate::machine::tests::mocks::{ok_receipt, rejected, wait_for_state, ControlledGateway};
use crate::machine::OtpMachine;

fn form(phone: &str) -> (ProfileForm, Arc<ControlledGateway>) {
    let gateway = ControlledGateway::new();
    let machine = OtpMachine::create(phone, gateway.clone()).unwrap();
    (ProfileForm::new(machine), gateway)
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_phone_saves_without_verification() {
    let (form, gateway) = form("555");

    assert!(!form.is_verification_needed());
    assert_eq!(
        form.screen(),
        Screen::Profile {
            just_verified: false,
            verification_needed: false
        }
    );
    assert_eq!(form.submit(), SubmitOutcome::Saved);
    assert_eq!(form.machine().state(), State::Idle);
    assert!(gateway.sent_phones().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_changed_phone_is_verified_then_saved() {
    let (form, gateway) = form("555");

    form.update_phone("777");
    assert!(form.is_verification_needed());
    assert_eq!(form.submit(), SubmitOutcome::VerificationStarted);
    assert_eq!(form.screen(), Screen::SendingOtp);

    gateway.resolve_send(ok_receipt());
    wait_for_state(form.machine(), State::OtpSent).await;
    assert_eq!(
        form.screen(),
        Screen::OtpEntry {
            verifying: false,
            verify_failed: false
        }
    );

    form.update_otp("123456");
    form.submit_otp();
    assert_eq!(
        form.screen(),
        Screen::OtpEntry {
            verifying: true,
            verify_failed: false
        }
    );
    // Submitting the profile is not possible from the OTP screen
    assert_eq!(form.submit(), SubmitOutcome::Ignored);

    gateway.resolve_verify(ok_receipt());
    wait_for_state(form.machine(), State::OtpVerified).await;
    assert_eq!(form.saved_phone(), "777");
    assert_eq!(
        form.screen(),
        Screen::Profile {
            just_verified: true,
            verification_needed: false
        }
    );

    wait_for_state(form.machine(), State::Idle).await;
    assert_eq!(
        form.screen(),
        Screen::Profile {
            just_verified: false,
            verification_needed: false
        }
    );
    assert_eq!(gateway.sent_phones(), vec!["777"]);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_reflected_on_screen() {
    let (form, gateway) = form("555");
    form.update_phone("777");
    form.submit();

    gateway.resolve_send(rejected(503));
    wait_for_state(form.machine(), State::OtpSendFailed).await;
    assert_eq!(form.screen(), Screen::SendFailed);

    form.resend_otp();
    gateway.resolve_send(ok_receipt());
    wait_for_state(form.machine(), State::OtpSent).await;

    form.update_otp("000000");
    form.submit_otp();
    gateway.resolve_verify(rejected(401));
    wait_for_state(form.machine(), State::OtpVerifyFailed).await;
    assert_eq!(
        form.screen(),
        Screen::OtpEntry {
            verifying: false,
            verify_failed: true
        }
    );
    assert_eq!(form.saved_phone(), "555");
}

#[tokio::test(start_paused = true)]
async fn test_change_phone_returns_to_profile_with_pending_change() {
    let (form, gateway) = form("555");
    form.update_phone("777");
    form.submit();
    gateway.resolve_send(ok_receipt());
    wait_for_state(form.machine(), State::OtpSent).await;

    form.change_phone();

    assert_eq!(
        form.screen(),
        Screen::Profile {
            just_verified: false,
            verification_needed: true
        }
    );
    assert_eq!(form.phone(), "777");
    assert_eq!(form.saved_phone(), "555");
}

#[tokio::test(start_paused = true)]
async fn test_editing_phone_during_verified_notice() {
    let (form, gateway) = form("555");
    form.update_phone("777");
    form.submit();
    gateway.resolve_send(ok_receipt());
    wait_for_state(form.machine(), State::OtpSent).await;
    form.update_otp("123456");
    form.submit_otp();
    gateway.resolve_verify(ok_receipt());
    wait_for_state(form.machine(), State::OtpVerified).await;

    form.update_phone("888");

    assert_eq!(form.machine().state(), State::Idle);
    assert!(form.is_verification_needed());
    assert_eq!(form.saved_phone(), "777");

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(form.machine().state(), State::Idle);
}
