//! Command bridge: wire types and the Unix-socket transport.
//!
//! Protocol: newline-delimited JSON over a Unix domain socket.
//!
//! Request format: `{"command": "...", "args": {...}}\n`
//! Response format: `{"ok": ...}\n` or `{"err": {"code": "...", "message": "..."}}\n`

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CommandError, Result};

// =============================================================================
// CommandRequest
// =============================================================================

/// One remote command: a name plus optional named arguments.
///
/// Immutable once built. The invoker re-sends the same request by reference
/// when it replays after a session refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: None,
        }
    }

    /// Build a request from any serializable object-shaped argument value.
    pub fn with_args(command: impl Into<String>, args: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(args).map_err(CommandError::transport)?;
        let args = match value {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(CommandError::Transport(format!(
                    "command arguments must be a JSON object, got {other}"
                )));
            }
        };
        Ok(Self {
            command: command.into(),
            args,
        })
    }
}

// =============================================================================
// Response
// =============================================================================

/// Wire response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ok { ok: Value },
    Err { err: ErrorPayload },
}

/// Error payload reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<ErrorPayload> for CommandError {
    fn from(err: ErrorPayload) -> Self {
        CommandError::Remote {
            code: err.code,
            message: err.message,
        }
    }
}

// =============================================================================
// CommandBridge
// =============================================================================

/// Transport seam for issuing commands.
///
/// Production uses [`SocketBridge`]; tests substitute scripted
/// implementations.
pub trait CommandBridge: Send + Sync {
    fn send(&self, request: &CommandRequest) -> Result<Value>;
}

// =============================================================================
// Socket path
// =============================================================================

/// Directory that contains the backend socket.
pub fn socket_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(dir).join("boreal")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".boreal")
    } else {
        per_user_tmp_dir()
    }
}

/// Ensure the socket directory exists and is user-private.
pub fn ensure_socket_dir() -> Result<PathBuf> {
    let dir = socket_dir();
    fs::create_dir_all(&dir).map_err(CommandError::transport)?;

    let mode = fs::metadata(&dir)
        .map_err(CommandError::transport)?
        .permissions()
        .mode()
        & 0o777;
    if mode != 0o700 {
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))
            .map_err(CommandError::transport)?;
    }

    Ok(dir)
}

/// Default backend socket path.
pub fn socket_path() -> PathBuf {
    socket_dir().join("backend.sock")
}

fn per_user_tmp_dir() -> PathBuf {
    let uid = nix::unistd::Uid::effective();
    PathBuf::from("/tmp").join(format!("boreal-{uid}"))
}

// =============================================================================
// SocketBridge
// =============================================================================

/// Command bridge over a Unix domain socket, one connection per request.
///
/// The backend process is owned by the desktop shell; a connect failure is
/// surfaced as a transport error rather than triggering any autostart.
#[derive(Debug, Clone)]
pub struct SocketBridge {
    socket: PathBuf,
}

impl SocketBridge {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Bridge at the default per-user socket path.
    pub fn at_default_path() -> Self {
        Self::new(socket_path())
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }
}

impl CommandBridge for SocketBridge {
    fn send(&self, request: &CommandRequest) -> Result<Value> {
        let mut stream = UnixStream::connect(&self.socket).map_err(CommandError::transport)?;

        let mut line = serde_json::to_string(request).map_err(CommandError::transport)?;
        line.push('\n');
        stream
            .write_all(line.as_bytes())
            .map_err(CommandError::transport)?;

        let mut reader = BufReader::new(stream);
        let mut reply = String::new();
        reader
            .read_line(&mut reply)
            .map_err(CommandError::transport)?;
        if reply.is_empty() {
            return Err(CommandError::Transport(
                "backend closed the connection".to_string(),
            ));
        }

        match serde_json::from_str::<Response>(&reply).map_err(CommandError::transport)? {
            Response::Ok { ok } => Ok(ok),
            Response::Err { err } => Err(err.into()),
        }
    }
}
