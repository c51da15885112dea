use derive_more::Display;

/// The part of the UI a notification belongs to. Repeated reports for the
/// same surface are shown once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Surface {
    #[display(fmt = "dashboard")]
    Dashboard,
    #[display(fmt = "tone-arm")]
    ToneArm,
    #[display(fmt = "turntable")]
    Turntable,
}

/// A transient user-visible error message (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub surface: Surface,
    pub message: String,
}

impl Notification {
    pub fn error(surface: Surface, message: impl Into<String>) -> Self {
        Self {
            surface,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} | {}>", self.surface, self.message)
    }
}
