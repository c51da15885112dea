use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{debug, trace};

use crate::models::notification::{Notification, Surface};

use super::ports::NotificationPort;

/// Front for the notification port.
///
/// One-shot toasts always go through. Reports of a recurring condition
/// (a failing refresh) are shown once per surface until the surface is
/// resolved again, so a dead server doesn't produce a toast on every tick.
pub struct Notifier {
    port: Arc<dyn NotificationPort>,
    reported: Mutex<HashMap<Surface, String>>,
}

impl Notifier {
    pub fn new(port: Arc<dyn NotificationPort>) -> Self {
        Self {
            port,
            reported: Mutex::new(HashMap::new()),
        }
    }

    /// Show an error once, right now.
    pub fn toast(&self, surface: Surface, message: impl Into<String>) {
        self.port.emit(Notification::error(surface, message));
    }

    /// Report a recurring error for `surface`. Only emitted when the surface
    /// has no outstanding report or the message changed.
    pub fn report(&self, surface: Surface, message: &str) {
        let mut reported = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if reported.get(&surface).is_some_and(|m| m == message) {
            trace!("Suppressed repeated report for {}.", surface);
            return;
        }
        reported.insert(surface, message.to_string());
        drop(reported);

        self.port.emit(Notification::error(surface, message));
    }

    /// Clear the outstanding report for `surface` so the next failure is
    /// shown again.
    pub fn resolve(&self, surface: Surface) {
        let removed = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&surface);
        if removed.is_some() {
            debug!("Surface {} recovered.", surface);
        }
    }
}
