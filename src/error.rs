use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error surfaced by the command bridge and everything built on it.
///
/// `Remote` carries the structured payload reported by the backend.
/// Client-side failures (connect, I/O, encode/decode) collapse to
/// `Transport` with their text: nothing upstream can act on the concrete
/// source, and the payload has to cross thread boundaries cheaply.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandError {
    /// Client-side transport failure.
    #[error("bridge transport failed: {0}")]
    Transport(String),

    /// Error payload reported by the backend.
    #[error("{code}: {message}")]
    Remote { code: String, message: String },
}

impl CommandError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        CommandError::Transport(err.to_string())
    }

    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        CommandError::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether this failure means the session token is invalid or expired.
    ///
    /// Checks the structured remote code first; anything else falls back to
    /// the textual heuristic, since the transport can surface errors in
    /// arbitrary shapes.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            CommandError::Remote { code, .. } if code == "unauthorized" => true,
            other => text_indicates_auth_failure(&other.to_string()),
        }
    }
}

/// Textual auth-failure heuristic: case-insensitive containment of
/// "unauthorized" or "401". Empty text is never an auth failure.
pub fn text_indicates_auth_failure(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("unauthorized") || lowered.contains("401")
}

pub type Result<T> = std::result::Result<T, CommandError>;
