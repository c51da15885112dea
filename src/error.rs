use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Errors reported by calls across the remote boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The configured server URL can't be used.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response (connect, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status. `message` is already
    /// resolved from the response body.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response body didn't match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// A 2xx `{ok: false}` answer.
    #[error("{}", .0.as_deref().unwrap_or("Request was rejected"))]
    Rejected(Option<String>),
}

impl RemoteError {
    /// Message suitable for a user notification.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}
