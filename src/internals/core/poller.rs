use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, RwLock,
    },
    time::Duration,
};

use futures::{future::BoxFuture, FutureExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::models::poll_spec::{OverlapPolicy, PollSpec};

/// Periods below this are clamped, a zero period would spin.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// The work a poller invokes on every tick.
pub type PollTask = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Wrap an async closure into a [`PollTask`].
pub fn poll_task<F, Fut>(f: F) -> PollTask
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Repeating timer whose period switches between the active and idle
/// interval of its [`PollSpec`].
///
/// Every registration owns one spawned timer task. Changing the activity
/// or the `PollSpec` tears the registration down and starts a new one, so the
/// next tick comes one full new period later. The invoked closure lives in
/// a slot that [`AdaptivePoller::set_task`] swaps without re-registering.
///
/// Invocations are spawned, a slow or failing task never delays the timer.
/// Whether invocations may overlap is decided by [`OverlapPolicy`].
pub struct AdaptivePoller {
    name: &'static str,
    task: Arc<Mutex<PollTask>>,
    in_flight: Arc<AtomicBool>,
    state: Mutex<PollerState>,
}

struct PollerState {
    spec: PollSpec,
    is_active: bool,
    registration: Option<Registration>,
    cancelled: bool,
}

/// One live timer.
struct Registration {
    token: CancellationToken,
    live: Arc<RwLock<bool>>,
}

impl Registration {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            live: Arc::new(RwLock::new(true)),
        }
    }

    /// Once this returns no further invocation is dispatched. A dispatch
    /// racing with it holds the read lock, so this waits for it.
    fn cancel(&self) {
        let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
        *live = false;
        self.token.cancel();
    }
}

impl AdaptivePoller {
    /// Register `task` and start its timer. Must be called from within a
    /// tokio runtime.
    pub fn schedule(name: &'static str, task: PollTask, spec: PollSpec, is_active: bool) -> Self {
        let poller = Self {
            name,
            task: Arc::new(Mutex::new(task)),
            in_flight: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(PollerState {
                spec,
                is_active,
                registration: None,
                cancelled: false,
            }),
        };
        {
            let mut state = lock(&poller.state);
            poller.register(&mut state);
        }
        poller
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spec(&self) -> PollSpec {
        lock(&self.state).spec
    }

    /// Period of the live registration.
    pub fn period(&self) -> Duration {
        let state = lock(&self.state);
        state.spec.period(state.is_active).max(MIN_PERIOD)
    }

    /// Re-register when `spec` or `is_active` differ from the current
    /// registration. Returns whether a new timer was started.
    pub fn update(&self, spec: PollSpec, is_active: bool) -> bool {
        let mut state = lock(&self.state);
        if state.cancelled {
            return false;
        }
        if state.spec == spec && state.is_active == is_active {
            return false;
        }
        if let Some(old) = state.registration.take() {
            old.cancel();
        }
        state.spec = spec;
        state.is_active = is_active;
        self.register(&mut state);
        true
    }

    /// Switch between the active and idle period.
    pub fn set_active(&self, is_active: bool) -> bool {
        let spec = self.spec();
        self.update(spec, is_active)
    }

    /// Swap the invoked closure. The running timer picks it up on its next
    /// tick.
    pub fn set_task(&self, task: PollTask) {
        *lock(&self.task) = task;
    }

    /// Stop the timer for good. No invocation is dispatched after this
    /// returns; invocations already running finish on their own.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        if state.cancelled {
            return;
        }
        state.cancelled = true;
        if let Some(registration) = state.registration.take() {
            registration.cancel();
        }
        debug!("Poller '{}' cancelled.", self.name);
    }

    fn register(&self, state: &mut PollerState) {
        let period = state.spec.period(state.is_active).max(MIN_PERIOD);
        let registration = Registration::new();
        let dispatcher = Dispatcher {
            name: self.name,
            task: self.task.clone(),
            in_flight: self.in_flight.clone(),
            overlap: state.spec.overlap,
            live: registration.live.clone(),
        };

        debug!(
            "Poller '{}' registered. Active: {}, period: {:?}.",
            self.name, state.is_active, period
        );

        if state.spec.run_on_mount {
            dispatcher.fire();
        }
        tokio::spawn(task_poll_timer(
            registration.token.clone(),
            period,
            dispatcher,
        ));
        state.registration = Some(registration);
    }
}

impl Drop for AdaptivePoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Everything a timer needs to dispatch one invocation.
struct Dispatcher {
    name: &'static str,
    task: Arc<Mutex<PollTask>>,
    in_flight: Arc<AtomicBool>,
    overlap: OverlapPolicy,
    live: Arc<RwLock<bool>>,
}

/// Clears the in-flight flag when an invocation ends, panics included.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Dispatcher {
    /// Dispatch one invocation of the current task. Returns `false` once
    /// the registration has been cancelled.
    fn fire(&self) -> bool {
        let live = self.live.read().unwrap_or_else(PoisonError::into_inner);
        if !*live {
            return false;
        }

        let guard = match self.overlap {
            OverlapPolicy::Allow => None,
            OverlapPolicy::SkipWhileInFlight => {
                if self.in_flight.swap(true, Ordering::AcqRel) {
                    trace!("Poller '{}' skipped a tick, still in flight.", self.name);
                    return true;
                }
                Some(InFlight(self.in_flight.clone()))
            }
        };

        let task = lock(&self.task).clone();
        let invocation = task();
        let name = self.name;
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = invocation.await {
                warn!("Poll task '{}' failed. Error: {:#}", name, e);
            }
        });
        true
    }
}

/// Task: Fires the dispatcher every `period`, starting one period from now.
/// Can be cancelled.
#[tracing::instrument(skip_all, fields(poller = dispatcher.name))]
async fn task_poll_timer(token: CancellationToken, period: Duration, dispatcher: Dispatcher) {
    trace!("Started.");
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                trace!("Cancelled.");
                break;
            },
            _ = interval.tick() => {
                if !dispatcher.fire() {
                    trace!("Registration is gone.");
                    break;
                }
            }
        }
    }
}
