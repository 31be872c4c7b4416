//! Integration tests for the verification machine through its public API

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use pv_core::{
        Event, GatewayError, OtpGateway, OtpMachine, ProfileForm, Receipt, Screen, SendReceipt,
        Snapshot, State, SubmitOutcome, VerifyReceipt,
    };

    // Gateway that answers after a fixed latency and accepts one code
    struct ScriptedGateway {
        accepted_otp: String,
        latency: Duration,
        fail_sends: Mutex<u32>,
    }

    impl ScriptedGateway {
        fn new(accepted_otp: &str) -> Self {
            Self {
                accepted_otp: accepted_otp.to_string(),
                latency: Duration::from_millis(200),
                fail_sends: Mutex::new(0),
            }
        }

        fn failing_first_sends(self, count: u32) -> Self {
            *self.fail_sends.lock().unwrap() = count;
            self
        }
    }

    #[async_trait]
    impl OtpGateway for ScriptedGateway {
        async fn send_otp(&self, phone: &str) -> Result<SendReceipt, GatewayError> {
            tokio::time::sleep(self.latency).await;
            let mut remaining = self.fail_sends.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(GatewayError::Rejected {
                    status: 502,
                    body: json!({ "message": "upstream unavailable" }),
                });
            }
            Ok(Receipt::new(json!({ "success": true, "phone": phone })))
        }

        async fn verify_otp(&self, otp: &str) -> Result<VerifyReceipt, GatewayError> {
            tokio::time::sleep(self.latency).await;
            if otp == self.accepted_otp {
                Ok(Receipt::new(json!({ "success": true })))
            } else {
                Err(GatewayError::Rejected {
                    status: 401,
                    body: json!({ "message": "invalid otp" }),
                })
            }
        }
    }

    fn record_states(machine: &OtpMachine) -> Arc<Mutex<Vec<Snapshot>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        machine.subscribe(move |snapshot| log.lock().unwrap().push(snapshot.clone()));
        seen
    }

    async fn settle(machine: &OtpMachine, state: State) {
        machine
            .watch()
            .wait_for(|snapshot| snapshot.state == state)
            .await
            .expect("machine alive");
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_verification_scenario() {
        let machine = OtpMachine::create("555", Arc::new(ScriptedGateway::new("123456"))).unwrap();
        let seen = record_states(&machine);

        machine.send(Event::update_phone("777"));
        machine.send(Event::SendOtp);
        settle(&machine, State::OtpSent).await;
        machine.send(Event::update_otp("123456"));
        machine.send(Event::VerifyOtp);
        settle(&machine, State::OtpVerified).await;
        settle(&machine, State::Idle).await;

        let seen = seen.lock().unwrap();
        let states: Vec<State> = seen.iter().map(|snapshot| snapshot.state).collect();
        assert_eq!(
            states,
            vec![
                State::Idle,
                State::OtpSending,
                State::OtpSent,
                State::OtpSent,
                State::OtpVerifying,
                State::OtpVerified,
                State::Idle,
            ]
        );
        let last = seen.last().unwrap();
        assert_eq!(last.context.phone, "777");
        assert_eq!(last.context.otp, "123456");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_code_then_change_phone() {
        let machine = OtpMachine::create("555", Arc::new(ScriptedGateway::new("123456"))).unwrap();

        machine.send(Event::SendOtp);
        settle(&machine, State::OtpSent).await;
        machine.send(Event::update_otp("999999"));
        machine.send(Event::VerifyOtp);
        settle(&machine, State::OtpVerifyFailed).await;

        machine.send(Event::change_phone_to("888"));

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.state, State::Idle);
        assert_eq!(snapshot.context.phone, "888");
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_form_retries_failed_send() {
        let gateway = ScriptedGateway::new("123456").failing_first_sends(1);
        let machine = OtpMachine::create("555", Arc::new(gateway)).unwrap();
        let form = ProfileForm::new(machine.clone());

        form.update_phone("777");
        assert_eq!(form.submit(), SubmitOutcome::VerificationStarted);
        settle(&machine, State::OtpSendFailed).await;
        assert_eq!(form.screen(), Screen::SendFailed);

        form.resend_otp();
        settle(&machine, State::OtpSent).await;
        form.update_otp("123456");
        form.submit_otp();
        settle(&machine, State::OtpVerified).await;

        assert_eq!(form.saved_phone(), "777");
        assert_eq!(form.submit(), SubmitOutcome::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_round_trip_through_json() {
        let machine = OtpMachine::create("555", Arc::new(ScriptedGateway::new("1"))).unwrap();

        let wire = r#"{"type":"UPDATE_PHONE","phone":"777"}"#;
        let event: Event = serde_json::from_str(wire).unwrap();
        machine.send(event);

        let snapshot = serde_json::to_value(machine.snapshot()).unwrap();
        assert_eq!(
            snapshot,
            json!({ "state": "idle", "context": { "phone": "777", "otp": "" } })
        );
    }
}
