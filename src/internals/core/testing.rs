//! Hand-rolled fakes for the ports, shared by the unit tests.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use common::api::{
    MediumPresence, PlaybackState, ToneArmMoveRequest, ToneArmPosition, ToneArmSyncReport,
    TurntableStartRequest, TurntableState,
};

use crate::{error::RemoteError, models::notification::Notification};

use super::ports::{
    NotificationPort, PlaybackPort, PresencePort, RemoteResult, ToneArmPort, TurntablePort,
};

#[derive(Default)]
pub(crate) struct RecordingNotifications {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifications {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}

impl NotificationPort for RecordingNotifications {
    fn emit(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CurrentMedium,
    PlaybackState,
    Start(Option<String>),
    Stop,
    Sync,
    Position,
    Move(ToneArmMoveRequest),
    TurntableState,
    TurntableStart(TurntableStartRequest),
    TurntableStop,
}

pub(crate) fn server_error(message: &str) -> RemoteError {
    RemoteError::Status {
        status: 502,
        message: message.to_string(),
    }
}

/// Scriptable stand-in for the whole server.
pub(crate) struct FakeRemote {
    presence: Mutex<RemoteResult<MediumPresence>>,
    playback: Mutex<RemoteResult<PlaybackState>>,
    sync: Mutex<RemoteResult<ToneArmSyncReport>>,
    position: Mutex<RemoteResult<ToneArmPosition>>,
    moves: Mutex<RemoteResult<()>>,
    commands: Mutex<RemoteResult<()>>,
    latency: Mutex<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            presence: Mutex::new(Ok(MediumPresence::default())),
            playback: Mutex::new(Ok(PlaybackState::default())),
            sync: Mutex::new(Ok(ToneArmSyncReport::default())),
            position: Mutex::new(Ok(ToneArmPosition::default())),
            moves: Mutex::new(Ok(())),
            commands: Mutex::new(Ok(())),
            latency: Mutex::new(Duration::ZERO),
            calls: Mutex::new(vec![]),
        }
    }
}

impl FakeRemote {
    pub(crate) fn set_presence(&self, result: RemoteResult<MediumPresence>) {
        *self.presence.lock().unwrap() = result;
    }

    pub(crate) fn set_playback(&self, result: RemoteResult<PlaybackState>) {
        *self.playback.lock().unwrap() = result;
    }

    pub(crate) fn set_sync(&self, result: RemoteResult<ToneArmSyncReport>) {
        *self.sync.lock().unwrap() = result;
    }

    pub(crate) fn set_position(&self, result: RemoteResult<ToneArmPosition>) {
        *self.position.lock().unwrap() = result;
    }

    pub(crate) fn set_moves(&self, result: RemoteResult<()>) {
        *self.moves.lock().unwrap() = result;
    }

    pub(crate) fn set_commands(&self, result: RemoteResult<()>) {
        *self.commands.lock().unwrap() = result;
    }

    /// Simulated round trip of every command call (start/stop/move).
    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    /// Signed steps of every relative move, in call order.
    pub(crate) fn jog_steps(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Move(request) => request.steps,
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn round_trip(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PresencePort for FakeRemote {
    async fn current_medium(&self) -> RemoteResult<MediumPresence> {
        self.record(Call::CurrentMedium);
        self.presence.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaybackPort for FakeRemote {
    async fn playback_state(&self) -> RemoteResult<PlaybackState> {
        self.record(Call::PlaybackState);
        self.playback.lock().unwrap().clone()
    }

    async fn start_playback(&self, context_uri: Option<String>) -> RemoteResult<()> {
        self.record(Call::Start(context_uri));
        self.round_trip().await;
        self.commands.lock().unwrap().clone()
    }

    async fn stop_playback(&self) -> RemoteResult<()> {
        self.record(Call::Stop);
        self.round_trip().await;
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToneArmPort for FakeRemote {
    async fn sync_tone_arm(&self) -> RemoteResult<ToneArmSyncReport> {
        self.record(Call::Sync);
        self.sync.lock().unwrap().clone()
    }

    async fn tone_arm_position(&self) -> RemoteResult<ToneArmPosition> {
        self.record(Call::Position);
        self.position.lock().unwrap().clone()
    }

    async fn move_tone_arm(&self, request: ToneArmMoveRequest) -> RemoteResult<()> {
        self.record(Call::Move(request));
        self.round_trip().await;
        self.moves.lock().unwrap().clone()
    }
}

#[async_trait]
impl TurntablePort for FakeRemote {
    async fn turntable_state(&self) -> RemoteResult<TurntableState> {
        self.record(Call::TurntableState);
        Ok(TurntableState::default())
    }

    async fn start_turntable(&self, request: TurntableStartRequest) -> RemoteResult<()> {
        self.record(Call::TurntableStart(request));
        self.commands.lock().unwrap().clone()
    }

    async fn stop_turntable(&self) -> RemoteResult<()> {
        self.record(Call::TurntableStop);
        self.commands.lock().unwrap().clone()
    }
}
