use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::api::{ToneArmMoveRequest, ToneArmPosition};
use tokio::{
    sync::watch,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::models::{
    jog::{JogDirection, RampProfile},
    notification::Surface,
};

use super::{
    notifier::Notifier,
    ports::{RemoteResult, ToneArmPort},
};

/// How the controller moves the tone-arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JogConfig {
    pub ramp: RampProfile,

    /// Step count of a single (non-held) jog.
    pub discrete_steps: u32,

    /// Send moves as calibration moves that leave the server's logical
    /// position alone.
    pub from_settings: bool,
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            ramp: RampProfile::default(),
            discrete_steps: 5,
            from_settings: true,
        }
    }
}

/// What [`JogController::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogStart {
    Started,

    /// A hold in the same direction is already running.
    AlreadyHolding,

    /// A hold in the other direction is running.
    Refused,
}

/// Turns a press-and-hold into a ramped series of relative tone-arm moves.
///
/// A hold starts slow and accelerates over the ramp: each step is larger
/// and comes sooner than the last. Releasing (or dropping the controller)
/// ends the session; a step already on the wire completes, but nothing is
/// issued or scheduled after it.
pub struct JogController {
    shared: Arc<JogShared>,
}

struct JogShared {
    tone_arm: Arc<dyn ToneArmPort>,
    notifier: Arc<Notifier>,
    config: JogConfig,
    session: Mutex<JogSession>,
    position: watch::Sender<Option<ToneArmPosition>>,
}

/// The one hold session of a controller. `direction == None` is idle.
#[derive(Default)]
struct JogSession {
    direction: Option<JogDirection>,
    started_at: Option<Instant>,

    /// Bumped on every start. A hold loop only acts while its own
    /// generation is the current one.
    generation: u64,
    token: Option<CancellationToken>,
}

/// Immutable facts of one hold, owned by its loop.
struct Hold {
    direction: JogDirection,
    generation: u64,
    started_at: Instant,
}

impl JogController {
    pub fn new(tone_arm: Arc<dyn ToneArmPort>, notifier: Arc<Notifier>, config: JogConfig) -> Self {
        let (position, _) = watch::channel(None);
        Self {
            shared: Arc::new(JogShared {
                tone_arm,
                notifier,
                config,
                session: Mutex::new(JogSession::default()),
                position,
            }),
        }
    }

    /// Begin holding `direction`. Must be called from within a tokio
    /// runtime.
    pub fn start(&self, direction: JogDirection) -> JogStart {
        let mut session = self.shared.lock_session();
        match session.direction {
            Some(current) if current == direction => return JogStart::AlreadyHolding,
            Some(current) => {
                warn!("Refusing to jog {} while holding {}.", direction, current);
                return JogStart::Refused;
            }
            None => {}
        }

        session.generation += 1;
        let hold = Hold {
            direction,
            generation: session.generation,
            started_at: Instant::now(),
        };
        let token = CancellationToken::new();
        session.direction = Some(direction);
        session.started_at = Some(hold.started_at);
        session.token = Some(token.clone());
        drop(session);

        info!("Holding jog {}.", direction);
        self.shared.notifier.resolve(Surface::ToneArm);
        tokio::spawn(task_jog_hold(token, self.shared.clone(), hold));
        JogStart::Started
    }

    /// Release the hold. Returns whether a hold was running.
    pub fn stop(&self) -> bool {
        self.shared.stop()
    }

    pub fn direction(&self) -> Option<JogDirection> {
        self.shared.lock_session().direction
    }

    pub fn is_holding(&self) -> bool {
        self.direction().is_some()
    }

    /// Time since the current hold started.
    pub fn held_for(&self) -> Option<std::time::Duration> {
        self.shared
            .lock_session()
            .started_at
            .map(|started_at| started_at.elapsed())
    }

    /// One fixed-size jog, independent of any hold.
    pub async fn jog_once(&self, direction: JogDirection) -> RemoteResult<()> {
        let steps = direction.signed(self.shared.config.discrete_steps);
        let request = ToneArmMoveRequest::relative(steps, self.shared.config.from_settings);
        self.move_and_refresh(request).await
    }

    /// Move the tone-arm to an absolute angle.
    pub async fn move_to_angle(&self, angle_deg: f64) -> RemoteResult<()> {
        self.move_and_refresh(ToneArmMoveRequest::to_angle(angle_deg))
            .await
    }

    /// Park the tone-arm at its home position.
    pub async fn home(&self) -> RemoteResult<()> {
        self.move_to_angle(0.0).await
    }

    async fn move_and_refresh(&self, request: ToneArmMoveRequest) -> RemoteResult<()> {
        let result = self.shared.tone_arm.move_tone_arm(request).await;
        if let Err(e) = &result {
            error!("Failed to move tone-arm. Error: {}", e);
            self.shared
                .notifier
                .toast(Surface::ToneArm, e.user_message());
        }
        self.shared.refresh_position_quietly().await;
        result
    }

    /// Fetch and publish the tone-arm position.
    pub async fn refresh_position(&self) -> RemoteResult<ToneArmPosition> {
        self.shared.refresh_position().await
    }

    /// Last fetched tone-arm position.
    pub fn position(&self) -> Option<ToneArmPosition> {
        *self.shared.position.borrow()
    }
}

impl Drop for JogController {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

impl JogShared {
    fn lock_session(&self) -> MutexGuard<'_, JogSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) -> bool {
        let mut session = self.lock_session();
        let was_holding = session.direction.take();
        session.started_at = None;
        if let Some(token) = session.token.take() {
            token.cancel();
        }
        drop(session);

        if let Some(direction) = was_holding {
            info!("Released jog {}.", direction);
        }
        was_holding.is_some()
    }

    fn is_current(&self, generation: u64) -> bool {
        let session = self.lock_session();
        session.direction.is_some() && session.generation == generation
    }

    async fn refresh_position(&self) -> RemoteResult<ToneArmPosition> {
        let position = self.tone_arm.tone_arm_position().await?;
        self.position.send_replace(Some(position));
        Ok(position)
    }

    /// Position refresh after a move. A failure keeps the last known
    /// position.
    async fn refresh_position_quietly(&self) {
        if let Err(e) = self.refresh_position().await {
            warn!("Failed to refresh tone-arm position. Error: {}", e);
        }
    }
}

/// Task: Issue the steps of one hold until it is released.
/// Each iteration moves by the ramped step size, refreshes the position and
/// sleeps the ramped delay. The session generation is checked before every
/// move and every reschedule so a released hold issues nothing further.
/// Can be cancelled.
#[tracing::instrument(skip_all, fields(direction = %hold.direction, generation = hold.generation))]
async fn task_jog_hold(token: CancellationToken, shared: Arc<JogShared>, hold: Hold) {
    debug!("Started.");
    let ramp = shared.config.ramp;

    loop {
        if !shared.is_current(hold.generation) {
            debug!("Hold ended.");
            break;
        }

        let t = ramp.fraction(hold.started_at.elapsed());
        let steps = hold.direction.signed(ramp.step_magnitude(t));
        trace!("Jogging {} steps (ramp {:.2}).", steps, t);

        let request = ToneArmMoveRequest::relative(steps, shared.config.from_settings);
        match shared.tone_arm.move_tone_arm(request).await {
            Ok(()) => shared.notifier.resolve(Surface::ToneArm),
            Err(e) => {
                error!("Failed to jog tone-arm, continuing hold. Error: {}", e);
                shared
                    .notifier
                    .report(Surface::ToneArm, &e.user_message());
            }
        }
        shared.refresh_position_quietly().await;

        if !shared.is_current(hold.generation) {
            debug!("Hold ended while moving.");
            break;
        }

        tokio::select! {
            _ = token.cancelled() => {
                debug!("Cancelled.");
                break;
            },
            _ = time::sleep(ramp.step_delay(t)) => {}
        }
    }
}
