use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::try_join;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    error::RemoteError,
    models::{
        notification::Surface,
        poll_spec::PollSpec,
        snapshot::{RemoteSnapshot, SnapshotState},
    },
};

use super::{
    notifier::Notifier,
    poller::{poll_task, AdaptivePoller, PollTask},
    ports::{PlaybackPort, PresencePort, RemotePorts, RemoteResult, SnapshotRefresher, ToneArmPort},
};

/// Timer settings of the coordinator's two pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSpecs {
    /// Snapshot refresh. Active while anything is playing.
    pub refresh: PollSpec,

    /// Tone-arm resync. Active while a medium is on the reader.
    pub sync: PollSpec,
}

/// Runs the refresh and resync pollers of one surface and publishes the
/// remote snapshot.
///
/// Each poller's activity is derived from the snapshot the refresh poller
/// writes, so polling speeds up while something is playing and slows down
/// once it stops.
pub struct PollCoordinator {
    source: Arc<SnapshotSource>,
    refresh_poller: Arc<AdaptivePoller>,
    sync_poller: Arc<AdaptivePoller>,
    token: CancellationToken,
}

impl PollCoordinator {
    /// Register both pollers and start tracking activity. Must be called
    /// from within a tokio runtime.
    pub fn start(ports: &RemotePorts, notifier: Arc<Notifier>, specs: CoordinatorSpecs) -> Self {
        let (snapshots, rx_snapshots) = watch::channel(SnapshotState::default());
        let source = Arc::new(SnapshotSource {
            presence: ports.presence.clone(),
            playback: ports.playback.clone(),
            tone_arm: ports.tone_arm.clone(),
            notifier,
            snapshots,
        });

        let refresh_poller = Arc::new(AdaptivePoller::schedule(
            "refresh",
            refresh_task(source.clone()),
            specs.refresh,
            false,
        ));
        let sync_poller = Arc::new(AdaptivePoller::schedule(
            "sync",
            sync_task(source.clone()),
            specs.sync,
            false,
        ));

        let token = CancellationToken::new();
        tokio::spawn(task_track_activity(
            token.clone(),
            rx_snapshots,
            refresh_poller.clone(),
            sync_poller.clone(),
        ));

        Self {
            source,
            refresh_poller,
            sync_poller,
            token,
        }
    }

    /// Receiver that sees every published snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotState> {
        self.source.snapshots.subscribe()
    }

    /// Current snapshot and refresh error.
    pub fn state(&self) -> SnapshotState {
        self.source.snapshots.borrow().clone()
    }

    /// Refresh once, outside the poll timer.
    pub async fn refresh_now(&self) -> RemoteResult<()> {
        self.source.refresh().await
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_poller.period()
    }

    pub fn sync_period(&self) -> Duration {
        self.sync_poller.period()
    }

    /// Stop both pollers. Requests already in flight still complete.
    pub fn shutdown(&self) {
        self.token.cancel();
        self.refresh_poller.cancel();
        self.sync_poller.cancel();
    }
}

impl Drop for PollCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl SnapshotRefresher for PollCoordinator {
    async fn refresh_now(&self) -> RemoteResult<()> {
        PollCoordinator::refresh_now(self).await
    }
}

/// What the poll tasks work on: the remote calls and the published state.
/// The watch channel is the only copy of the remote state.
struct SnapshotSource {
    presence: Arc<dyn PresencePort>,
    playback: Arc<dyn PlaybackPort>,
    tone_arm: Arc<dyn ToneArmPort>,
    notifier: Arc<Notifier>,
    snapshots: watch::Sender<SnapshotState>,
}

impl SnapshotSource {
    /// Fetch presence and playback together. Both land in the snapshot or
    /// neither does; a failure keeps the previous snapshot and records the
    /// error instead.
    async fn refresh(&self) -> RemoteResult<()> {
        trace!("Refreshing snapshot.");
        let fetched = try_join(
            self.presence.current_medium(),
            self.playback.playback_state(),
        )
        .await;

        match fetched {
            Ok((presence, playback)) => {
                let snapshot = RemoteSnapshot { presence, playback };
                let changed = self.snapshots.send_if_modified(|state| {
                    let modified =
                        state.snapshot.as_ref() != Some(&snapshot) || state.error.is_some();
                    state.snapshot = Some(snapshot);
                    state.error = None;
                    modified
                });
                if changed {
                    if let Some(snapshot) = &self.snapshots.borrow().snapshot {
                        debug!("Snapshot changed: {}", snapshot);
                    }
                }
                self.notifier.resolve(Surface::Dashboard);
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                self.snapshots.send_if_modified(|state| {
                    if state.error.as_deref() == Some(message.as_str()) {
                        return false;
                    }
                    state.error = Some(message.clone());
                    true
                });
                self.notifier.report(Surface::Dashboard, &message);
                Err(e)
            }
        }
    }

    /// Ask the server to line the tone-arm up with playback. Best-effort:
    /// failures are only logged and the next tick tries again.
    async fn sync_tone_arm(&self) {
        let has_medium = self.snapshots.borrow().has_medium();
        if !has_medium {
            trace!("No medium on the reader, not syncing tone-arm.");
            return;
        }

        match self.tone_arm.sync_tone_arm().await {
            Ok(report) if report.ok => {
                debug!(
                    "Tone-arm synced. Fraction: {:?}, track: {:?}/{:?}",
                    report.fraction, report.track_index, report.total_tracks
                );
            }
            Ok(report) => {
                debug!("Tone-arm sync declined. Reason: {:?}", report.reason);
            }
            Err(e) => {
                debug!("Tone-arm sync failed, retrying next tick. Error: {}", e);
            }
        }
    }
}

fn refresh_task(source: Arc<SnapshotSource>) -> PollTask {
    poll_task(move || {
        let source = source.clone();
        async move {
            source
                .refresh()
                .await
                .map_err(|e: RemoteError| anyhow::Error::from(e).context("Snapshot refresh failed"))
        }
    })
}

fn sync_task(source: Arc<SnapshotSource>) -> PollTask {
    poll_task(move || {
        let source = source.clone();
        async move {
            source.sync_tone_arm().await;
            Ok(())
        }
    })
}

/// Task: Activate whenever the snapshot changes.
/// Re-derive each poller's activity from the latest snapshot: refresh is
/// active while anything plays, sync while a medium is present.
/// Can be cancelled.
#[tracing::instrument(skip_all)]
async fn task_track_activity(
    token: CancellationToken,
    mut rx_snapshots: watch::Receiver<SnapshotState>,
    refresh_poller: Arc<AdaptivePoller>,
    sync_poller: Arc<AdaptivePoller>,
) {
    info!("Started.");

    loop {
        let (is_playing, has_medium) = {
            let state = rx_snapshots.borrow_and_update();
            (state.is_playing(), state.has_medium())
        };
        if refresh_poller.set_active(is_playing) {
            debug!("Refresh poller active: {}.", is_playing);
        }
        if sync_poller.set_active(has_medium) {
            debug!("Sync poller active: {}.", has_medium);
        }

        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            Ok(()) = rx_snapshots.changed() => {
                trace!("Snapshot changed.");
            }
        }
    }
}
