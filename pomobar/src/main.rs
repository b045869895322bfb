use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use pomobar_ipc::{ControlSignal, EVENT_RELOAD_SPACES, PARAM_FOCUSED_SPACE, PARAM_FOCUSED_WINDOW};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod ipc;
mod status;
mod timer;

use timer::{Phase, PomodoroEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("POMOBAR_LOG"))
        .with_writer(io::stderr)
        .init();

    // A sender invocation delivers its signal and gets out of the way
    // before any of the long-running machinery comes up.
    if cli::handle_if_needed().await? {
        return Ok(());
    }

    let settings = config::load_settings()?;
    let engine = Arc::new(PomodoroEngine::new(config::timer_config(&settings)));

    // 1-second tick schedule for the lifetime of the process; the engine
    // ignores ticks while idle or paused.
    let ticker = engine.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            ticker.tick();
        }
    });

    let (events, signals) = broadcast::channel(16);
    tokio::spawn(async move {
        if let Err(e) = ipc::receiver::run(events).await {
            error!("signal receiver stopped: {}", e);
        }
    });
    tokio::spawn(handle_signals(signals, engine.clone()));

    // Status loop on the main thread; worker threads keep the tick and
    // receiver tasks running while we block on key polling.
    enable_raw_mode()?;
    let res = run_status_loop(&engine);
    disable_raw_mode()?;
    println!();

    res
}

/// Reacts to control signals from other invocations. Reloading is
/// idempotent, so duplicate delivery of the same signal is harmless.
async fn handle_signals(
    mut signals: broadcast::Receiver<ControlSignal>,
    engine: Arc<PomodoroEngine>,
) {
    loop {
        match signals.recv().await {
            Ok(signal) if signal.event == EVENT_RELOAD_SPACES => {
                if let Some(space) = signal.param(PARAM_FOCUSED_SPACE) {
                    debug!(space, "focused space hint");
                }
                if let Some(window) = signal.param(PARAM_FOCUSED_WINDOW) {
                    debug!(window, "focused window hint");
                }
                match config::load_settings() {
                    Ok(settings) => {
                        engine.configure(config::timer_config(&settings));
                        info!("settings reloaded");
                    }
                    Err(e) => warn!("settings reload failed: {}", e),
                }
            }
            Ok(signal) => debug!(event = %signal.event, "ignoring control signal"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "control signals dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn run_status_loop(engine: &PomodoroEngine) -> Result<()> {
    let mut stdout = io::stdout();
    let mut last_phase = Phase::Idle;

    loop {
        let snap = engine.snapshot();

        if snap.phase != last_phase {
            notify_phase_change(snap.phase);
            last_phase = snap.phase;
        }

        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(status::terminal_color(snap.phase.color())),
            Print(status::status_line(&snap)),
            ResetColor,
        )?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char(' ') => {
                            let snap = engine.snapshot();
                            if !snap.is_active {
                                engine.start();
                            } else if snap.paused {
                                engine.resume();
                            } else {
                                engine.pause();
                            }
                        }
                        KeyCode::Char('r') => engine.reset(),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn notify_phase_change(phase: Phase) {
    let body = match phase {
        Phase::Working => "Focus time.",
        Phase::OnBreak => "Take a short break.",
        Phase::OnLongBreak => "Long break earned.",
        Phase::Idle => return,
    };
    if let Err(e) = notify_rust::Notification::new()
        .summary("Pomobar")
        .body(body)
        .appname("pomobar")
        .show()
    {
        warn!("failed to send notification: {}", e);
    }
}
