use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::event::Event;
use crate::state::app_state::{AppState, FetchStatus};
use crate::state::fragment::Fragment;

const PAGE: u16 = 10;

pub struct App {
    pub state: AppState,
    refresh_tx: UnboundedSender<()>,
}

impl App {
    pub fn new(refresh_tx: UnboundedSender<()>) -> Self {
        Self {
            state: AppState {
                dirty: true,
                ..Default::default()
            },
            refresh_tx,
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.state.dirty = true;
                self.handle_key(key);
            }
            Event::Key(_) => {}
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Tick => self.handle_tick(Instant::now()),
            // Terminal resize always requires a full redraw.
            Event::Resize(_, _) => self.state.dirty = true,
            Event::Scheduled(first_tick) => {
                self.state.next_refresh = Some(first_tick);
                self.state.dirty = true;
            }
            Event::Fetching { next_tick } => {
                self.state.status = FetchStatus::Fetching { spinner_tick: 0 };
                self.state.next_refresh = Some(next_tick);
                self.state.dirty = true;
            }
            Event::Fetched(result) => self.handle_fetched(result),
        }
    }

    /// Apply the outcome of a fetch. Failures are transient: the last good
    /// fragment stays on screen and the scheduler retries on the next tick.
    pub fn handle_fetched(&mut self, result: Result<Fragment, FetchError>) {
        self.state.dirty = true;
        match result {
            Ok(fragment) => {
                info!(len = fragment.text.len(), "fragment updated");
                self.state.fragment = Some(fragment);
                self.state.scroll_offset = 0;
                self.state.status = FetchStatus::Idle;
                self.state.consecutive_failures = 0;
            }
            Err(err) => {
                self.state.consecutive_failures += 1;
                warn!(
                    error = %err,
                    failures = self.state.consecutive_failures,
                    "fetch failed, keeping previous fragment"
                );
                self.state.status = FetchStatus::Error(err.to_string());
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.should_quit = true
            }
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_down(PAGE),
            KeyCode::PageUp => self.scroll_up(PAGE),
            KeyCode::Char('g') | KeyCode::Home => self.state.scroll_offset = 0,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_down(3),
            MouseEventKind::ScrollUp => self.scroll_up(3),
            _ => return,
        }
        self.state.dirty = true;
    }

    fn handle_tick(&mut self, now: Instant) {
        if let FetchStatus::Fetching { spinner_tick } = &mut self.state.status {
            *spinner_tick = spinner_tick.wrapping_add(1);
            self.state.dirty = true;
        }
        let countdown = self.state.seconds_until_refresh(now);
        if countdown != self.state.shown_countdown {
            self.state.shown_countdown = countdown;
            self.state.dirty = true;
        }
    }

    fn scroll_down(&mut self, lines: u16) {
        self.state.scroll_offset = self.state.scroll_offset.saturating_add(lines);
    }

    fn scroll_up(&mut self, lines: u16) {
        self.state.scroll_offset = self.state.scroll_offset.saturating_sub(lines);
    }

    fn request_refresh(&mut self) {
        if matches!(self.state.status, FetchStatus::Fetching { .. }) {
            return;
        }
        if self.refresh_tx.send(()).is_err() {
            warn!("refresh requested but the scheduler is not running");
        }
    }
}
