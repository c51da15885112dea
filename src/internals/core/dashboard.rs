use std::sync::Arc;

use common::api::{ToneArmPosition, TurntableStartRequest, TurntableState};
use tokio::sync::watch;
use tracing::{error, info};

use crate::models::{
    command::CommandOutcome,
    jog::JogDirection,
    notification::Surface,
    snapshot::SnapshotState,
};

use super::{
    command_gate::{CommandGate, PlaybackCommands},
    coordinator::{CoordinatorSpecs, PollCoordinator},
    jog::{JogConfig, JogController, JogStart},
    notifier::Notifier,
    ports::{NotificationPort, RemotePorts, RemoteResult, TurntablePort},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub specs: CoordinatorSpecs,
    pub jog: JogConfig,
}

/// One mounted control surface: polling, playback commands, the tone-arm
/// jog and the turntable, all against the same server.
///
/// Mounting registers the pollers. Unmounting (or dropping) cancels them
/// and releases any held jog.
pub struct Dashboard {
    coordinator: Arc<PollCoordinator>,
    playback: PlaybackCommands,
    jog: JogController,
    turntable: Arc<dyn TurntablePort>,
    notifier: Arc<Notifier>,
}

impl Dashboard {
    /// Must be called from within a tokio runtime.
    pub fn mount(
        ports: &RemotePorts,
        notifications: Arc<dyn NotificationPort>,
        config: DashboardConfig,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(notifications));
        let coordinator = Arc::new(PollCoordinator::start(
            ports,
            notifier.clone(),
            config.specs,
        ));
        let playback = PlaybackCommands::new(
            CommandGate::new(notifier.clone(), coordinator.clone()),
            ports.playback.clone(),
            coordinator.subscribe(),
        );
        let jog = JogController::new(ports.tone_arm.clone(), notifier.clone(), config.jog);

        info!("Dashboard mounted.");
        Self {
            coordinator,
            playback,
            jog,
            turntable: ports.turntable.clone(),
            notifier,
        }
    }

    pub fn snapshots(&self) -> watch::Receiver<SnapshotState> {
        self.coordinator.subscribe()
    }

    pub fn state(&self) -> SnapshotState {
        self.coordinator.state()
    }

    /// The play button is disabled while this is true.
    pub fn is_command_in_flight(&self) -> bool {
        self.playback.gate().is_busy()
    }

    pub async fn refresh(&self) -> RemoteResult<()> {
        self.coordinator.refresh_now().await
    }

    pub async fn toggle_playback(&self) -> CommandOutcome {
        self.playback.toggle().await
    }

    pub async fn play_this_medium(&self) -> CommandOutcome {
        self.playback.play_this_medium().await
    }

    pub async fn stop_playback(&self) -> CommandOutcome {
        self.playback.stop().await
    }

    pub fn hold_jog(&self, direction: JogDirection) -> JogStart {
        self.jog.start(direction)
    }

    pub fn release_jog(&self) -> bool {
        self.jog.stop()
    }

    pub fn jog_direction(&self) -> Option<JogDirection> {
        self.jog.direction()
    }

    pub async fn jog_once(&self, direction: JogDirection) -> RemoteResult<()> {
        self.jog.jog_once(direction).await
    }

    pub async fn move_tone_arm_to(&self, angle_deg: f64) -> RemoteResult<()> {
        self.jog.move_to_angle(angle_deg).await
    }

    pub async fn home_tone_arm(&self) -> RemoteResult<()> {
        self.jog.home().await
    }

    pub async fn tone_arm_position(&self) -> RemoteResult<ToneArmPosition> {
        self.jog.refresh_position().await
    }

    pub async fn turntable_state(&self) -> RemoteResult<TurntableState> {
        self.turntable_command("read", self.turntable.turntable_state())
            .await
    }

    pub async fn start_turntable(&self, request: TurntableStartRequest) -> RemoteResult<()> {
        self.turntable_command("start", self.turntable.start_turntable(request))
            .await?;
        info!("Turntable started. Direction: {}", request.direction);
        Ok(())
    }

    pub async fn stop_turntable(&self) -> RemoteResult<()> {
        self.turntable_command("stop", self.turntable.stop_turntable())
            .await?;
        info!("Turntable stopped.");
        Ok(())
    }

    async fn turntable_command<T>(
        &self,
        action: &str,
        call: impl std::future::Future<Output = RemoteResult<T>>,
    ) -> RemoteResult<T> {
        call.await.map_err(|e| {
            error!("Failed to {} turntable. Error: {}", action, e);
            self.notifier.toast(Surface::Turntable, e.user_message());
            e
        })
    }

    /// Cancel the pollers and any held jog. Requests already in flight
    /// still complete.
    pub fn unmount(&self) {
        self.coordinator.shutdown();
        self.jog.stop();
        info!("Dashboard unmounted.");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.coordinator.shutdown();
        self.jog.stop();
    }
}
