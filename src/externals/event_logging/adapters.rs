use tokio::sync::broadcast::Sender;
use tracing::trace;

use crate::{internals::core::ports::NotificationPort, models::notification::Notification};

/// Publishes notifications on a broadcast channel for whoever displays
/// them.
pub struct BroadcastNotificationAdapter {
    tx_notification: Sender<Notification>,
}

impl BroadcastNotificationAdapter {
    pub fn new(tx_notification: Sender<Notification>) -> Self {
        Self { tx_notification }
    }
}

impl NotificationPort for BroadcastNotificationAdapter {
    fn emit(&self, notification: Notification) {
        if let Err(e) = self.tx_notification.send(notification) {
            trace!("No notification listeners, dropped: {}", e.0);
        }
    }
}
