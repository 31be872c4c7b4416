//! Driver that runs the transition table against real effects.

use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use pv_shared::config::MachineConfig;
use pv_shared::phone::mask_phone_number;

use super::observer::{TracingObserver, TransitionObserver, TransitionRecord};
use super::transition::{transition, Effect, Input};
use crate::domain::{Context, Event, Snapshot, State};
use crate::errors::{MachineError, MachineResult, VerificationError};
use crate::services::verification::OtpGateway;

/// Callback invoked with the new snapshot after every committed transition
pub type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Handle returned by [`OtpMachine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Builder for [`OtpMachine`]
pub struct MachineBuilder {
    gateway: Arc<dyn OtpGateway>,
    config: MachineConfig,
    observer: Arc<dyn TransitionObserver>,
    session_id: Option<Uuid>,
}

impl MachineBuilder {
    /// Override the machine configuration
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`TracingObserver`]
    pub fn observer(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use a caller-chosen session id instead of a random one
    pub fn session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Create the machine at `idle` with the given phone and an empty OTP
    ///
    /// Must be called from within a Tokio runtime; effects are spawned on it.
    pub fn build(self, initial_phone: impl Into<String>) -> MachineResult<OtpMachine> {
        let runtime = Handle::try_current().map_err(|_| MachineError::NoRuntime)?;
        let session_id = self.session_id.unwrap_or_else(Uuid::new_v4);
        let context = Context::new(initial_phone);
        let (watch_tx, _) = watch::channel(Snapshot::new(State::Idle, context.clone()));

        info!(
            session_id = %session_id,
            gateway = self.gateway.name(),
            phone = %mask_phone_number(&context.phone),
            verified_linger_ms = self.config.verified_linger_ms,
            event = "session_started",
            "Verification session started"
        );

        Ok(OtpMachine {
            shared: Arc::new(Shared {
                session_id,
                gateway: self.gateway,
                verified_linger: self.config.verified_linger(),
                observer: self.observer,
                runtime,
                watch_tx,
                core: Mutex::new(Core {
                    state: State::Idle,
                    context,
                    entry_epoch: 0,
                    queue: VecDeque::new(),
                    processing: false,
                    stopped: false,
                    operation: None,
                    timer: None,
                    listeners: Vec::new(),
                    next_subscription: 0,
                }),
            }),
        })
    }
}

/// A running verification state machine
///
/// Cloning yields another handle to the same instance. Inputs are processed
/// one at a time to completion; events sent while another input is being
/// processed (including from a subscriber) are queued in order.
#[derive(Clone)]
pub struct OtpMachine {
    shared: Arc<Shared>,
}

struct Shared {
    session_id: Uuid,
    gateway: Arc<dyn OtpGateway>,
    verified_linger: Duration,
    observer: Arc<dyn TransitionObserver>,
    runtime: Handle,
    watch_tx: watch::Sender<Snapshot>,
    core: Mutex<Core>,
}

struct Core {
    state: State,
    context: Context,
    /// Bumped on every state entry; settlements carry the epoch they were
    /// started in and are discarded when it no longer matches.
    entry_epoch: u64,
    queue: VecDeque<Queued>,
    processing: bool,
    stopped: bool,
    operation: Option<JoinHandle<()>>,
    timer: Option<JoinHandle<()>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

struct Queued {
    input: Input,
    epoch: Option<u64>,
}

struct Committed {
    record: TransitionRecord,
    failure: Option<VerificationError>,
    listeners: Vec<Listener>,
}

impl OtpMachine {
    /// Start building a machine backed by `gateway`
    pub fn builder(gateway: Arc<dyn OtpGateway>) -> MachineBuilder {
        MachineBuilder {
            gateway,
            config: MachineConfig::default(),
            observer: Arc::new(TracingObserver),
            session_id: None,
        }
    }

    /// Create a machine with default configuration
    pub fn create(
        initial_phone: impl Into<String>,
        gateway: Arc<dyn OtpGateway>,
    ) -> MachineResult<Self> {
        Self::builder(gateway).build(initial_phone)
    }

    /// Identifier of this session, attached to every log line
    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    /// Deliver one event
    ///
    /// Events the current state does not handle are ignored.
    pub fn send(&self, event: Event) {
        Shared::dispatch(
            &self.shared,
            Queued {
                input: Input::Event(event),
                epoch: None,
            },
        );
    }

    /// Read the current state and context together
    pub fn snapshot(&self) -> Snapshot {
        let core = self.shared.lock();
        Snapshot::new(core.state, core.context.clone())
    }

    /// Current state tag
    pub fn state(&self) -> State {
        self.shared.lock().state
    }

    /// Register a callback for every committed transition
    ///
    /// Deliveries that the current state ignores never reach the callback.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut core = self.shared.lock();
        let id = SubscriptionId(core.next_subscription);
        core.next_subscription += 1;
        core.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut core = self.shared.lock();
        let before = core.listeners.len();
        core.listeners.retain(|(existing, _)| *existing != id);
        core.listeners.len() != before
    }

    /// Watch channel that always holds the latest committed snapshot
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.shared.watch_tx.subscribe()
    }

    /// End the session
    ///
    /// Aborts the pending operation and the linger timer, drops queued
    /// inputs and listeners, and ignores every later event.
    pub fn stop(&self) {
        let mut core = self.shared.lock();
        if core.stopped {
            return;
        }
        core.stopped = true;
        core.queue.clear();
        core.listeners.clear();
        if let Some(operation) = core.operation.take() {
            operation.abort();
        }
        if let Some(timer) = core.timer.take() {
            timer.abort();
        }

        info!(
            session_id = %self.shared.session_id,
            state = %core.state,
            event = "session_stopped",
            "Verification session stopped"
        );
    }

    /// Whether [`OtpMachine::stop`] was called
    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    #[cfg(test)]
    pub(crate) fn deliver(&self, input: Input, epoch: Option<u64>) {
        Shared::dispatch(&self.shared, Queued { input, epoch });
    }

    #[cfg(test)]
    pub(crate) fn entry_epoch(&self) -> u64 {
        self.shared.lock().entry_epoch
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an input and, unless another call is already draining the
    /// queue, process inputs until it is empty
    fn dispatch(shared: &Arc<Shared>, queued: Queued) {
        let mut core = shared.lock();
        if core.stopped {
            debug!(
                session_id = %shared.session_id,
                trigger = queued.input.label(),
                "Session stopped, input dropped"
            );
            return;
        }

        core.queue.push_back(queued);
        if core.processing {
            return;
        }
        core.processing = true;

        while let Some(next) = core.queue.pop_front() {
            let Some(committed) = Self::step(shared, &mut core, next) else {
                continue;
            };

            // Observers and listeners run unlocked so they may read the
            // snapshot or send further events
            drop(core);
            shared.publish(committed);
            core = shared.lock();
        }

        core.processing = false;
    }

    fn step(shared: &Arc<Shared>, core: &mut Core, queued: Queued) -> Option<Committed> {
        let trigger = queued.input.label();

        if let Some(epoch) = queued.epoch {
            if epoch != core.entry_epoch {
                debug!(
                    session_id = %shared.session_id,
                    trigger,
                    epoch,
                    current_epoch = core.entry_epoch,
                    state = %core.state,
                    event = "stale_result_discarded",
                    "Discarding result for a state the machine has left"
                );
                return None;
            }
        }

        let Some(step) = transition(core.state, &core.context, &queued.input) else {
            trace!(
                session_id = %shared.session_id,
                state = %core.state,
                trigger,
                "Input not handled in current state"
            );
            return None;
        };

        let from = core.state;
        core.context = step.context;
        if step.changes_state {
            core.state = step.target;
            core.entry_epoch += 1;
        }

        for effect in step.effects {
            Self::run_effect(shared, core, effect);
        }

        let snapshot = Snapshot::new(core.state, core.context.clone());
        shared.watch_tx.send_replace(snapshot.clone());

        let failure = match queued.input {
            Input::SendOtpSettled(Err(err)) => Some(VerificationError::SendFailure(err)),
            Input::VerifyOtpSettled(Err(err)) => Some(VerificationError::VerifyFailure(err)),
            _ => None,
        };

        Some(Committed {
            record: TransitionRecord {
                session_id: shared.session_id,
                from,
                to: core.state,
                trigger,
                at: Utc::now(),
                snapshot,
            },
            failure,
            listeners: core
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect(),
        })
    }

    fn run_effect(shared: &Arc<Shared>, core: &mut Core, effect: Effect) {
        match effect {
            Effect::InvokeSendOtp { phone } => {
                debug!(
                    session_id = %shared.session_id,
                    phone = %mask_phone_number(&phone),
                    event = "send_otp_invoked",
                    "Invoking send_otp"
                );
                let gateway = Arc::clone(&shared.gateway);
                core.operation = Some(Self::spawn_settlement(
                    shared,
                    core.entry_epoch,
                    async move { Input::SendOtpSettled(gateway.send_otp(&phone).await) },
                ));
            }
            Effect::InvokeVerifyOtp { otp } => {
                debug!(
                    session_id = %shared.session_id,
                    event = "verify_otp_invoked",
                    "Invoking verify_otp"
                );
                let gateway = Arc::clone(&shared.gateway);
                core.operation = Some(Self::spawn_settlement(
                    shared,
                    core.entry_epoch,
                    async move { Input::VerifyOtpSettled(gateway.verify_otp(&otp).await) },
                ));
            }
            Effect::AbandonOperation => {
                // Detached, not aborted: the request runs to completion and
                // its settlement is dropped by the epoch check
                core.operation.take();
            }
            Effect::ArmVerifiedTimer => {
                let linger = shared.verified_linger;
                core.timer = Some(Self::spawn_settlement(
                    shared,
                    core.entry_epoch,
                    async move {
                        tokio::time::sleep(linger).await;
                        Input::VerifiedTimeout
                    },
                ));
            }
            Effect::DisarmVerifiedTimer => {
                if let Some(timer) = core.timer.take() {
                    timer.abort();
                }
            }
        }
    }

    /// Run `future` out-of-line and post its input back tagged with `epoch`
    ///
    /// The task only holds a weak reference, so dropping every machine
    /// handle ends the session even while a request is in flight.
    fn spawn_settlement<F>(shared: &Arc<Shared>, epoch: u64, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Input> + Send + 'static,
    {
        let weak: Weak<Shared> = Arc::downgrade(shared);
        shared.runtime.spawn(async move {
            let input = future.await;
            if let Some(shared) = weak.upgrade() {
                Shared::dispatch(
                    &shared,
                    Queued {
                        input,
                        epoch: Some(epoch),
                    },
                );
            }
        })
    }

    /// Run observer hooks and listeners for one committed transition
    ///
    /// A panicking callback is logged and skipped. It must not unwind
    /// through `dispatch`, which would leave the queue marked as processing.
    fn publish(&self, committed: Committed) {
        self.isolate("observer", || self.observer.on_transition(&committed.record));
        if let Some(failure) = &committed.failure {
            self.isolate("observer", || {
                self.observer.on_operation_failed(self.session_id, failure)
            });
        }
        for listener in &committed.listeners {
            self.isolate("listener", || listener(&committed.record.snapshot));
        }
    }

    fn isolate(&self, callback: &'static str, f: impl FnOnce()) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
            warn!(
                session_id = %self.session_id,
                callback,
                panic = %panic_message(payload.as_ref()),
                event = "callback_panicked",
                "Transition callback panicked"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(operation) = core.operation.take() {
            operation.abort();
        }
        if let Some(timer) = core.timer.take() {
            timer.abort();
        }
    }
}
