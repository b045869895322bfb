//! Unix datagram receiver for control signals.

use anyhow::Result;
use pomobar_ipc::{socket_path, ControlSignal};
use std::path::Path;
use tokio::net::UnixDatagram;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Maximum accepted datagram; signals are tiny, anything larger is noise.
const MAX_DATAGRAM: usize = 8192;

/// Binds the session socket and forwards decoded signals to subscribers.
///
/// Delivery is best-effort end to end: malformed datagrams are logged and
/// dropped, and a send onto the broadcast channel with no subscribers is
/// fine.
pub async fn run(events: broadcast::Sender<ControlSignal>) -> Result<()> {
    run_on_path(&socket_path(), events).await
}

pub async fn run_on_path(path: &Path, events: broadcast::Sender<ControlSignal>) -> Result<()> {
    // Remove old socket if it exists
    let _ = std::fs::remove_file(path);

    let socket = UnixDatagram::bind(path)?;
    info!("signal receiver listening on {}", path.display());

    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let n = socket.recv(&mut buf).await?;
        match serde_json::from_slice::<ControlSignal>(&buf[..n]) {
            Ok(signal) => {
                info!(event = %signal.event, "control signal received");
                let _ = events.send(signal);
            }
            Err(e) => {
                warn!("dropping malformed control signal: {}", e);
            }
        }
    }
}
