use std::sync::Arc;

use async_trait::async_trait;
use common::api::{
    MediumPresence, PlaybackState, ToneArmMoveRequest, ToneArmPosition, ToneArmSyncReport,
    TurntableStartRequest, TurntableState,
};

use crate::{error::RemoteError, models::notification::Notification};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Which medium, if any, sits on the reader.
#[async_trait]
pub trait PresencePort: Send + Sync {
    async fn current_medium(&self) -> RemoteResult<MediumPresence>;
}

/// The remote streaming player.
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    async fn playback_state(&self) -> RemoteResult<PlaybackState>;

    /// Start playing `context_uri`, or resume when `None`.
    async fn start_playback(&self, context_uri: Option<String>) -> RemoteResult<()>;

    async fn stop_playback(&self) -> RemoteResult<()>;
}

/// The tone-arm actuator.
#[async_trait]
pub trait ToneArmPort: Send + Sync {
    /// Ask the server to move the tone-arm and platter to match playback.
    async fn sync_tone_arm(&self) -> RemoteResult<ToneArmSyncReport>;

    async fn tone_arm_position(&self) -> RemoteResult<ToneArmPosition>;

    async fn move_tone_arm(&self, request: ToneArmMoveRequest) -> RemoteResult<()>;
}

/// The turntable platter motor.
#[async_trait]
pub trait TurntablePort: Send + Sync {
    async fn turntable_state(&self) -> RemoteResult<TurntableState>;

    async fn start_turntable(&self, request: TurntableStartRequest) -> RemoteResult<()>;

    async fn stop_turntable(&self) -> RemoteResult<()>;
}

/// Where user-visible notifications end up.
pub trait NotificationPort: Send + Sync {
    fn emit(&self, notification: Notification);
}

/// Triggers an out-of-band refresh of the remote snapshot.
#[async_trait]
pub trait SnapshotRefresher: Send + Sync {
    async fn refresh_now(&self) -> RemoteResult<()>;
}

/// All remote ports of one server.
#[derive(Clone)]
pub struct RemotePorts {
    pub presence: Arc<dyn PresencePort>,
    pub playback: Arc<dyn PlaybackPort>,
    pub tone_arm: Arc<dyn ToneArmPort>,
    pub turntable: Arc<dyn TurntablePort>,
}

impl RemotePorts {
    /// Use one adapter for every port.
    pub fn from_remote<R>(remote: Arc<R>) -> Self
    where
        R: PresencePort + PlaybackPort + ToneArmPort + TurntablePort + 'static,
    {
        Self {
            presence: remote.clone(),
            playback: remote.clone(),
            tone_arm: remote.clone(),
            turntable: remote,
        }
    }
}
