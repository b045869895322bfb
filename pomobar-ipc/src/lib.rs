//! Control-signal bridge between a short-lived pomobar invocation and a
//! running instance.
//!
//! We use a unix datagram socket for local delivery - a single unacknowledged
//! datagram per signal, so the sender never blocks on a receiver that may not
//! exist.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::UnixDatagram;

/// Event name carried by the reload trigger.
pub const EVENT_RELOAD_SPACES: &str = "reload-spaces";

/// Well-known parameter keys attached to a reload signal.
pub const PARAM_FOCUSED_SPACE: &str = "focusedSpaceId";
pub const PARAM_FOCUSED_WINDOW: &str = "focusedWindowId";

/// A named, fire-and-forget event sent between processes.
///
/// `params` stays `None` when no metadata accompanies the event; receivers
/// can distinguish "no metadata" from "empty metadata".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSignal {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, String>>,
}

impl ControlSignal {
    pub fn new(event: impl Into<String>, params: HashMap<String, String>) -> Self {
        Self {
            event: event.into(),
            params: if params.is_empty() { None } else { Some(params) },
        }
    }

    /// Looks up a parameter, treating a missing payload as an empty one.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .as_ref()
            .and_then(|p| p.get(key))
            .map(String::as_str)
    }
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Path of the signal socket for the current user session.
pub fn socket_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("pomobar.sock")
}

/// Broadcasts a control signal to whatever instance is listening.
///
/// Fire-and-forget: when nothing is bound to the socket the send still
/// succeeds from the caller's perspective. Only unexpected I/O faults
/// surface as errors.
pub async fn send(event: &str, params: HashMap<String, String>) -> Result<(), IpcError> {
    send_to_path(&socket_path(), &ControlSignal::new(event, params)).await
}

/// Same as [`send`], with an explicit socket path.
pub async fn send_to_path(path: &Path, signal: &ControlSignal) -> Result<(), IpcError> {
    let payload = serde_json::to_vec(signal)?;
    let socket = UnixDatagram::unbound()?;
    match socket.send_to(&payload, path).await {
        Ok(_) => Ok(()),
        // No receiver bound: still a successful dispatch.
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::NotFound | ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable
            ) =>
        {
            Ok(())
        }
        Err(e) => Err(IpcError::Io(e)),
    }
}
