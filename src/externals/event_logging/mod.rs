use std::sync::Arc;

use tokio::sync::broadcast::Sender;

use self::adapters::BroadcastNotificationAdapter;
use crate::models::notification::Notification;

pub mod adapters;
pub mod task;

pub struct EventLoggingModule {
    pub notification_adapter: Arc<BroadcastNotificationAdapter>,
}

impl EventLoggingModule {
    pub fn initialize(tx_notification: Sender<Notification>) -> Self {
        Self {
            notification_adapter: Arc::new(BroadcastNotificationAdapter::new(tx_notification)),
        }
    }
}
