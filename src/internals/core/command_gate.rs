use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::models::{
    command::{CommandKind, CommandOutcome, GateState},
    notification::Surface,
    snapshot::SnapshotState,
};

use super::{
    notifier::Notifier,
    ports::{PlaybackPort, RemoteResult, SnapshotRefresher},
};

/// Single-flight gate for human start/stop commands.
///
/// A command submitted while another one is outstanding is dropped, not
/// queued. The gate is back to `Idle` once the action finishes, whatever
/// its result. Failures become a one-shot notification; successes trigger
/// an immediate snapshot refresh so the new state shows without waiting
/// for the next poll.
pub struct CommandGate {
    state: Mutex<GateState>,
    notifier: Arc<Notifier>,
    refresher: Arc<dyn SnapshotRefresher>,
}

/// Held while a command runs. Dropping it reopens the gate, also when the
/// command future is dropped half way.
struct GatePass<'a> {
    state: &'a Mutex<GateState>,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = GateState::Idle;
    }
}

impl CommandGate {
    pub fn new(notifier: Arc<Notifier>, refresher: Arc<dyn SnapshotRefresher>) -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            notifier,
            refresher,
        }
    }

    pub fn state(&self) -> GateState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while a command is outstanding; the play button is disabled.
    pub fn is_busy(&self) -> bool {
        self.state() != GateState::Idle
    }

    fn acquire(&self, kind: CommandKind) -> Option<GatePass<'_>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != GateState::Idle {
            return None;
        }
        *state = kind.into();
        Some(GatePass { state: &self.state })
    }

    /// Run `action` unless another command is outstanding.
    pub async fn execute<F, Fut>(&self, kind: CommandKind, action: F) -> CommandOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RemoteResult<()>>,
    {
        let Some(pass) = self.acquire(kind) else {
            debug!("Ignoring {} command, gate is {}.", kind, self.state());
            return CommandOutcome::Rejected;
        };

        info!("Executing {} command.", kind);
        let result = action().await;
        drop(pass);

        match result {
            Ok(()) => {
                debug!("{} command completed.", kind);
                if let Err(e) = self.refresher.refresh_now().await {
                    debug!("Refresh after {} command failed. Error: {}", kind, e);
                }
                CommandOutcome::Completed
            }
            Err(e) => {
                let message = e.user_message();
                error!("Failed to {} playback. Error: {}", kind, message);
                self.notifier.toast(Surface::Dashboard, message.clone());
                CommandOutcome::Failed(message)
            }
        }
    }
}

/// Playback commands of the dashboard, all routed through one gate.
pub struct PlaybackCommands {
    gate: CommandGate,
    playback: Arc<dyn PlaybackPort>,
    snapshots: watch::Receiver<SnapshotState>,
}

impl PlaybackCommands {
    pub fn new(
        gate: CommandGate,
        playback: Arc<dyn PlaybackPort>,
        snapshots: watch::Receiver<SnapshotState>,
    ) -> Self {
        Self {
            gate,
            playback,
            snapshots,
        }
    }

    pub fn gate(&self) -> &CommandGate {
        &self.gate
    }

    pub async fn start(&self, context_uri: Option<String>) -> CommandOutcome {
        self.gate
            .execute(CommandKind::Start, || self.playback.start_playback(context_uri))
            .await
    }

    pub async fn stop(&self) -> CommandOutcome {
        self.gate
            .execute(CommandKind::Stop, || self.playback.stop_playback())
            .await
    }

    /// Stop when the medium on the reader is what's playing, otherwise
    /// start the medium's context (or resume when it has none).
    pub async fn toggle(&self) -> CommandOutcome {
        let (this_medium_playing, medium_uri) = {
            let state = self.snapshots.borrow();
            (
                state.is_this_medium_playing(),
                state.medium_player_uri().map(str::to_string),
            )
        };

        if this_medium_playing {
            self.stop().await
        } else {
            self.start(medium_uri).await
        }
    }

    /// Start the context mapped to the medium on the reader, whatever is
    /// currently playing. Does nothing for an unmapped medium.
    pub async fn play_this_medium(&self) -> CommandOutcome {
        let medium_uri = self
            .snapshots
            .borrow()
            .medium_player_uri()
            .map(str::to_string);
        let Some(medium_uri) = medium_uri else {
            info!("No player URI mapped to the current medium, not starting.");
            return CommandOutcome::Rejected;
        };
        self.start(Some(medium_uri)).await
    }
}
