//! Command-line handling for the control-signal surface.
//!
//! A second invocation of the binary acts as a disposable sender: it maps
//! flags to signal parameters, broadcasts once, and exits. The parser is a
//! plain token walk because unknown flags must be skipped silently, and a
//! flag expecting a value that is the last token is dropped rather than
//! treated as an error.

use std::collections::HashMap;

use anyhow::Result;
use pomobar_ipc::{EVENT_RELOAD_SPACES, PARAM_FOCUSED_SPACE, PARAM_FOCUSED_WINDOW};
use tracing::debug;

/// What a given argument list asks the process to do.
#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    /// No trigger flag: proceed with normal startup.
    Run,
    /// Broadcast a reload signal with the parameters gathered so far,
    /// then exit successfully.
    SendReloadSpaces {
        focused_space: Option<String>,
        focused_window: Option<String>,
    },
}

/// Walks the argument tokens (without the program name).
///
/// `--reload-spaces` fires with whatever values precede it; anything after
/// the trigger is never read. Unrecognized flags are ignored.
pub fn parse<I, S>(args: I) -> CliAction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut focused_space: Option<String> = None;
    let mut focused_window: Option<String> = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_ref() {
            "--reload-spaces" => {
                return CliAction::SendReloadSpaces {
                    focused_space,
                    focused_window,
                };
            }
            "--focused-space" => {
                if let Some(value) = args.next() {
                    focused_space = Some(value.as_ref().to_string());
                }
            }
            "--focused-window" => {
                if let Some(value) = args.next() {
                    focused_window = Some(value.as_ref().to_string());
                }
            }
            _ => {}
        }
    }

    CliAction::Run
}

/// Dispatches a control signal when the arguments ask for one.
///
/// Returns `true` when the process acted as a sender and should exit.
pub async fn handle_if_needed() -> Result<bool> {
    match parse(std::env::args().skip(1)) {
        CliAction::Run => Ok(false),
        CliAction::SendReloadSpaces {
            focused_space,
            focused_window,
        } => {
            let mut params = HashMap::new();
            if let Some(id) = focused_space {
                params.insert(PARAM_FOCUSED_SPACE.to_string(), id);
            }
            if let Some(id) = focused_window {
                params.insert(PARAM_FOCUSED_WINDOW.to_string(), id);
            }
            debug!(?params, "sending {} signal", EVENT_RELOAD_SPACES);
            pomobar_ipc::send(EVENT_RELOAD_SPACES, params).await?;
            Ok(true)
        }
    }
}
