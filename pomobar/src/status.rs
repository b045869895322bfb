//! Projection of a timer snapshot onto a one-line terminal status bar.

use crossterm::style::Color;

use crate::timer::{PhaseColor, TimerSnapshot};

const BAR_WIDTH: usize = 10;
const BAR_FILLED: &str = "█";
const BAR_EMPTY: &str = "░";

/// Terminal color for each phase accent.
pub fn terminal_color(color: PhaseColor) -> Color {
    match color {
        PhaseColor::Neutral => Color::Reset,
        PhaseColor::Red => Color::Red,
        PhaseColor::Green => Color::Green,
        PhaseColor::Blue => Color::Blue,
    }
}

/// Renders the snapshot as plain text; the caller applies the phase color.
pub fn status_line(snap: &TimerSnapshot) -> String {
    if !snap.is_active {
        return "● idle - press space to start".to_string();
    }

    let body = if snap.show_timer_text {
        snap.formatted_time()
    } else {
        progress_bar(snap.progress())
    };

    let paused = if snap.paused { " (paused)" } else { "" };
    format!(
        "● {} {} [{} done]{}",
        snap.phase.label(),
        body,
        snap.completed_work_sessions,
        paused
    )
}

fn progress_bar(progress: f64) -> String {
    let filled = (progress * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{}",
        BAR_FILLED.repeat(filled),
        BAR_EMPTY.repeat(BAR_WIDTH - filled)
    )
}
