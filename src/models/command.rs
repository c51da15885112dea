use derive_more::Display;

/// Human playback command routed through the single-flight gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CommandKind {
    #[display(fmt = "start")]
    Start,
    #[display(fmt = "stop")]
    Stop,
}

/// State of the single-flight gate. Only one of `Starting`/`Stopping` can
/// be held at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum GateState {
    #[default]
    Idle,
    Starting,
    Stopping,
}

impl From<CommandKind> for GateState {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Start => GateState::Starting,
            CommandKind::Stop => GateState::Stopping,
        }
    }
}

/// Result of submitting a command to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Another command was in flight, or there was nothing to do.
    Rejected,
    Completed,

    /// The action failed. Carries the message shown to the user.
    Failed(String),
}
