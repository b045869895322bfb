use std::sync::Mutex;

/// One discrete mode of the timer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Working,
    OnBreak,
    OnLongBreak,
}

/// Accent color a display should use for each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseColor {
    Neutral,
    Red,
    Green,
    Blue,
}

impl Phase {
    pub fn color(self) -> PhaseColor {
        match self {
            Phase::Idle => PhaseColor::Neutral,
            Phase::Working => PhaseColor::Red,
            Phase::OnBreak => PhaseColor::Green,
            Phase::OnLongBreak => PhaseColor::Blue,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Working => "work",
            Phase::OnBreak => "break",
            Phase::OnLongBreak => "long break",
        }
    }
}

/// Durations and display mode for the session cycle.
///
/// Values come from the settings table; anything missing or malformed has
/// already been replaced with its default by the time a config reaches the
/// engine, so all durations are positive here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub work_minutes: u64,
    pub break_minutes: u64,
    pub long_break_minutes: u64,
    pub sessions_before_long_break: u32,
    pub show_timer_text: bool,
}

pub const DEFAULT_WORK_MINUTES: u64 = 25;
pub const DEFAULT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;
pub const DEFAULT_SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            sessions_before_long_break: DEFAULT_SESSIONS_BEFORE_LONG_BREAK,
            show_timer_text: false,
        }
    }
}

impl TimerConfig {
    fn phase_seconds(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Idle => 0,
            Phase::Working => self.work_minutes * 60,
            Phase::OnBreak => self.break_minutes * 60,
            Phase::OnLongBreak => self.long_break_minutes * 60,
        }
    }
}

#[derive(Debug, Clone)]
struct TimerState {
    phase: Phase,
    completed_work_sessions: u32,
    time_remaining: u64,
    total_phase_duration: u64,
    paused: bool,
}

impl TimerState {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            completed_work_sessions: 0,
            time_remaining: 0,
            total_phase_duration: 0,
            paused: false,
        }
    }
}

/// Consistent copy of the timer for display code. Reads never touch the
/// engine's lock more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub is_active: bool,
    pub paused: bool,
    pub completed_work_sessions: u32,
    pub time_remaining: u64,
    pub total_phase_duration: u64,
    pub show_timer_text: bool,
}

impl TimerSnapshot {
    /// Fraction of the current phase already elapsed, in `[0, 1]`.
    /// Zero while idle.
    pub fn progress(&self) -> f64 {
        if self.total_phase_duration == 0 {
            return 0.0;
        }
        let remaining = self.time_remaining as f64 / self.total_phase_duration as f64;
        (1.0 - remaining).clamp(0.0, 1.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.time_remaining / 60,
            self.time_remaining % 60
        )
    }
}

/// The session timer: a countdown that cycles work, break, and long-break
/// phases, one instance per process.
///
/// A single mutex guards state and config together so a tick never
/// interleaves with a configure or reset.
pub struct PomodoroEngine {
    inner: Mutex<EngineInner>,
}

struct EngineInner {
    state: TimerState,
    config: TimerConfig,
}

impl PomodoroEngine {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            inner: Mutex::new(EngineInner {
                state: TimerState::idle(),
                config,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineInner> {
        // Engine operations never panic while holding the lock, so a
        // poisoned mutex can only mean a bug elsewhere; recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the stored durations and display mode. An in-progress
    /// countdown keeps its remaining time; new durations apply from the
    /// next phase transition.
    pub fn configure(&self, config: TimerConfig) {
        self.lock().config = config;
    }

    /// Begins a work session from idle. No-op while a session is active.
    pub fn start(&self) {
        let mut inner = self.lock();
        if inner.state.phase != Phase::Idle {
            return;
        }
        let total = inner.config.phase_seconds(Phase::Working);
        inner.state.phase = Phase::Working;
        inner.state.total_phase_duration = total;
        inner.state.time_remaining = total;
        inner.state.paused = false;
    }

    /// Suspends the countdown without touching remaining time or phase.
    /// No-op while idle.
    pub fn pause(&self) {
        let mut inner = self.lock();
        if inner.state.phase != Phase::Idle {
            inner.state.paused = true;
        }
    }

    pub fn resume(&self) {
        let mut inner = self.lock();
        if inner.state.phase != Phase::Idle {
            inner.state.paused = false;
        }
    }

    /// Returns the timer to its idle baseline and clears the session count.
    pub fn reset(&self) {
        self.lock().state = TimerState::idle();
    }

    /// Advances the countdown by one second. Called once per second by the
    /// tick task; a no-op while idle or paused.
    pub fn tick(&self) {
        let mut inner = self.lock();
        if inner.state.phase == Phase::Idle || inner.state.paused {
            return;
        }
        inner.state.time_remaining = inner.state.time_remaining.saturating_sub(1);
        if inner.state.time_remaining == 0 {
            inner.advance_phase();
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let inner = self.lock();
        TimerSnapshot {
            phase: inner.state.phase,
            is_active: inner.state.phase != Phase::Idle,
            paused: inner.state.paused,
            completed_work_sessions: inner.state.completed_work_sessions,
            time_remaining: inner.state.time_remaining,
            total_phase_duration: inner.state.total_phase_duration,
            show_timer_text: inner.config.show_timer_text,
        }
    }
}

impl EngineInner {
    /// Countdown expired: move to the next phase and reload the countdown
    /// from the current configuration.
    fn advance_phase(&mut self) {
        let next = match self.state.phase {
            Phase::Working => {
                self.state.completed_work_sessions += 1;
                if self.state.completed_work_sessions >= self.config.sessions_before_long_break {
                    // Reset on entry so the next cycle counts from a clean
                    // slate even under reconfiguration mid-cycle.
                    self.state.completed_work_sessions = 0;
                    Phase::OnLongBreak
                } else {
                    Phase::OnBreak
                }
            }
            Phase::OnBreak => Phase::Working,
            Phase::OnLongBreak => Phase::Idle,
            Phase::Idle => return,
        };

        self.state.phase = next;
        let total = self.config.phase_seconds(next);
        self.state.total_phase_duration = total;
        self.state.time_remaining = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute_config(sessions: u32) -> TimerConfig {
        TimerConfig {
            work_minutes: 1,
            break_minutes: 1,
            long_break_minutes: 1,
            sessions_before_long_break: sessions,
            show_timer_text: false,
        }
    }

    fn tick_n(engine: &PomodoroEngine, n: u64) {
        for _ in 0..n {
            engine.tick();
        }
    }

    #[test]
    fn starts_idle() {
        let engine = PomodoroEngine::new(TimerConfig::default());
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert!(!snap.is_active);
        assert_eq!(snap.time_remaining, 0);
        assert_eq!(snap.total_phase_duration, 0);
        assert_eq!(snap.progress(), 0.0);
    }

    #[test]
    fn start_enters_work_with_configured_duration() {
        let engine = PomodoroEngine::new(TimerConfig::default());
        engine.start();
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Working);
        assert!(snap.is_active);
        assert_eq!(snap.time_remaining, DEFAULT_WORK_MINUTES * 60);
        assert_eq!(snap.total_phase_duration, DEFAULT_WORK_MINUTES * 60);
        assert_eq!(snap.progress(), 0.0);
    }

    #[test]
    fn start_while_active_is_noop() {
        let engine = PomodoroEngine::new(minute_config(4));
        engine.start();
        tick_n(&engine, 10);
        engine.start();
        assert_eq!(engine.snapshot().time_remaining, 50);
    }

    #[test]
    fn remaining_time_is_monotonic_and_progress_bounded() {
        let engine = PomodoroEngine::new(minute_config(4));
        engine.start();
        let mut previous = engine.snapshot().time_remaining;
        for _ in 0..59 {
            engine.tick();
            let snap = engine.snapshot();
            assert!(snap.time_remaining < previous);
            assert!((0.0..=1.0).contains(&snap.progress()));
            assert!(snap.time_remaining <= snap.total_phase_duration);
            previous = snap.time_remaining;
        }
    }

    #[test]
    fn full_cycle_with_two_sessions() {
        let engine = PomodoroEngine::new(minute_config(2));
        engine.start();

        // First work session expires into a short break.
        tick_n(&engine, 60);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::OnBreak);
        assert_eq!(snap.completed_work_sessions, 1);

        // Break expires back into work.
        tick_n(&engine, 60);
        assert_eq!(engine.snapshot().phase, Phase::Working);

        // Second work session hits the threshold: long break, counter reset.
        tick_n(&engine, 60);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::OnLongBreak);
        assert_eq!(snap.completed_work_sessions, 0);

        // Long break winds down to idle.
        tick_n(&engine, 60);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert!(!snap.is_active);
        assert_eq!(snap.time_remaining, 0);
        assert_eq!(snap.total_phase_duration, 0);
    }

    #[test]
    fn long_break_is_never_skipped_with_single_session_threshold() {
        let engine = PomodoroEngine::new(minute_config(1));
        engine.start();
        tick_n(&engine, 60);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::OnLongBreak);
        assert_eq!(snap.completed_work_sessions, 0);
    }

    #[test]
    fn pause_freezes_countdown_and_resume_continues() {
        let engine = PomodoroEngine::new(minute_config(4));
        engine.start();
        tick_n(&engine, 5);
        engine.pause();
        tick_n(&engine, 30);
        let snap = engine.snapshot();
        assert!(snap.paused);
        assert_eq!(snap.time_remaining, 55);
        assert_eq!(snap.phase, Phase::Working);

        engine.resume();
        engine.tick();
        assert_eq!(engine.snapshot().time_remaining, 54);
    }

    #[test]
    fn pause_while_idle_is_noop() {
        let engine = PomodoroEngine::new(minute_config(4));
        engine.pause();
        assert!(!engine.snapshot().paused);
    }

    #[test]
    fn reset_restores_idle_baseline_from_any_phase() {
        let engine = PomodoroEngine::new(minute_config(2));
        engine.start();
        tick_n(&engine, 90); // mid-break, one session banked
        engine.reset();
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.time_remaining, 0);
        assert_eq!(snap.total_phase_duration, 0);
        assert_eq!(snap.completed_work_sessions, 0);
        assert!(!snap.paused);
    }

    #[test]
    fn tick_while_idle_is_noop() {
        let engine = PomodoroEngine::new(minute_config(4));
        tick_n(&engine, 10);
        assert_eq!(engine.snapshot(), PomodoroEngine::new(minute_config(4)).snapshot());
    }

    #[test]
    fn configure_mid_countdown_keeps_remaining_time() {
        let engine = PomodoroEngine::new(minute_config(4));
        engine.start();
        tick_n(&engine, 10);
        engine.configure(TimerConfig {
            work_minutes: 30,
            ..minute_config(4)
        });
        let snap = engine.snapshot();
        assert_eq!(snap.time_remaining, 50);
        assert_eq!(snap.total_phase_duration, 60);

        // New duration applies from the next work phase.
        tick_n(&engine, 50); // finish work
        tick_n(&engine, 60); // finish break
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Working);
        assert_eq!(snap.total_phase_duration, 30 * 60);
    }

    #[test]
    fn progress_approaches_one_near_expiry() {
        let engine = PomodoroEngine::new(minute_config(4));
        engine.start();
        tick_n(&engine, 59);
        let snap = engine.snapshot();
        assert!(snap.progress() > 0.98);
        assert_eq!(snap.formatted_time(), "00:01");
    }

    #[test]
    fn formatted_time_renders_minutes_and_seconds() {
        let mut snap = PomodoroEngine::new(TimerConfig::default()).snapshot();
        snap.time_remaining = 125;
        assert_eq!(snap.formatted_time(), "02:05");
        snap.time_remaining = 0;
        assert_eq!(snap.formatted_time(), "00:00");
        snap.time_remaining = 25 * 60;
        assert_eq!(snap.formatted_time(), "25:00");
    }

    #[test]
    fn phase_colors_are_exhaustive() {
        assert_eq!(Phase::Idle.color(), PhaseColor::Neutral);
        assert_eq!(Phase::Working.color(), PhaseColor::Red);
        assert_eq!(Phase::OnBreak.color(), PhaseColor::Green);
        assert_eq!(Phase::OnLongBreak.color(), PhaseColor::Blue);
    }
}
