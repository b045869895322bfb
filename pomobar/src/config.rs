use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use toml::Table;

use crate::timer::{
    TimerConfig, DEFAULT_BREAK_MINUTES, DEFAULT_LONG_BREAK_MINUTES,
    DEFAULT_SESSIONS_BEFORE_LONG_BREAK, DEFAULT_WORK_MINUTES,
};

/// Settings keys recognized by the timer.
const KEY_WORK_DURATION: &str = "work-duration";
const KEY_BREAK_DURATION: &str = "break-duration";
const KEY_LONG_BREAK_DURATION: &str = "long-break-duration";
const KEY_SESSIONS_BEFORE_LONG_BREAK: &str = "sessions-before-long-break";
const KEY_ICON_STYLE: &str = "icon-style";

/// Reads the settings file as a flat key table. A missing file is not an
/// error; every consumer substitutes defaults per key.
pub fn load_settings() -> Result<Table> {
    match ProjectDirs::from("com", "pomobar", "Pomobar") {
        Some(proj_dirs) => {
            let path = proj_dirs.config_dir().join("pomobar.toml");
            if path.exists() {
                let config_str = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file at {:?}", path))?;
                config_str
                    .parse::<Table>()
                    .with_context(|| format!("Failed to parse config file at {:?}", path))
            } else {
                Ok(Table::new())
            }
        }
        None => Ok(Table::new()),
    }
}

/// Derives the timer configuration from the settings table.
///
/// Each key degrades independently: absent, wrong-typed, or out-of-range
/// values fall back to that key's default rather than failing the load.
pub fn timer_config(settings: &Table) -> TimerConfig {
    TimerConfig {
        work_minutes: positive_minutes(settings, KEY_WORK_DURATION, DEFAULT_WORK_MINUTES),
        break_minutes: positive_minutes(settings, KEY_BREAK_DURATION, DEFAULT_BREAK_MINUTES),
        long_break_minutes: positive_minutes(
            settings,
            KEY_LONG_BREAK_DURATION,
            DEFAULT_LONG_BREAK_MINUTES,
        ),
        sessions_before_long_break: session_count(settings),
        show_timer_text: settings
            .get(KEY_ICON_STYLE)
            .and_then(|v| v.as_str())
            .map(|s| s == "timer")
            .unwrap_or(false),
    }
}

/// Longest accepted phase duration; anything above is treated as malformed.
const MAX_DURATION_MINUTES: u64 = 24 * 60;

fn positive_minutes(settings: &Table, key: &str, default: u64) -> u64 {
    settings
        .get(key)
        .and_then(|v| v.as_integer())
        .and_then(|minutes| u64::try_from(minutes).ok())
        .filter(|&minutes| (1..=MAX_DURATION_MINUTES).contains(&minutes))
        .unwrap_or(default)
}

fn session_count(settings: &Table) -> u32 {
    settings
        .get(KEY_SESSIONS_BEFORE_LONG_BREAK)
        .and_then(|v| v.as_integer())
        .and_then(|sessions| u32::try_from(sessions).ok())
        .filter(|&sessions| sessions >= 1)
        .unwrap_or(DEFAULT_SESSIONS_BEFORE_LONG_BREAK)
}
