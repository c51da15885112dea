use tokio::sync::{
    broadcast::{error::RecvError, Receiver},
    watch,
};
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::models::{notification::Notification, snapshot::SnapshotState};

#[tracing::instrument(skip_all)]
pub async fn task_notification_logging(
    token: CancellationToken,
    mut rx_notification: Receiver<Notification>,
) {
    info!("Started.");
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            res = rx_notification.recv() => {
                match res {
                    Ok(notification) => error!("Notification: {}", notification),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} notifications.", skipped);
                    }
                    Err(RecvError::Closed) => {
                        warn!("Notification channel closed.");
                        break;
                    }
                }
            }
        };
    }
}

#[tracing::instrument(skip_all)]
pub async fn task_snapshot_logging(
    token: CancellationToken,
    rx_snapshot: watch::Receiver<SnapshotState>,
) {
    info!("Started.");
    let mut snapshots = WatchStream::new(rx_snapshot);
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            Some(state) = snapshots.next() => {
                match (&state.snapshot, &state.error) {
                    (_, Some(e)) => warn!("Remote unavailable: {}", e),
                    (Some(snapshot), None) => info!("Remote state: {}", snapshot),
                    (None, None) => {}
                }
            }
        };
    }
}
