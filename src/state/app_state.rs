use std::time::Instant;

use super::fragment::Fragment;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching { spinner_tick: u8 },
    /// Last fetch failed; the previous fragment (if any) is still shown.
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Most recently fetched fragment. Only ever replaced by a successful fetch.
    pub fragment: Option<Fragment>,
    pub status: FetchStatus,
    pub scroll_offset: u16,
    /// When the scheduler is expected to fetch next, for the countdown.
    pub next_refresh: Option<Instant>,
    /// Countdown value last drawn, so idle ticks only redraw when it changes.
    pub shown_countdown: Option<u64>,
    pub consecutive_failures: u32,
    pub should_quit: bool,
    /// Set to `true` whenever visible state changes. The render loop skips
    /// `terminal.draw()` when `false`, avoiding redundant work on idle ticks.
    pub dirty: bool,
}

impl AppState {
    pub fn seconds_until_refresh(&self, now: Instant) -> Option<u64> {
        self.next_refresh
            .map(|at| at.saturating_duration_since(now).as_secs_f64().ceil() as u64)
    }
}
