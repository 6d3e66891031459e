use std::time::Instant;

use crossterm::event::{KeyEvent, MouseEvent};

use crate::error::FetchError;
use crate::state::fragment::Fragment;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
    Resize(u16, u16),
    /// The scheduler is running; its first tick is due at this instant.
    Scheduled(Instant),
    /// The scheduler has started a fetch. The tick after it is due at `next_tick`.
    Fetching { next_tick: Instant },
    Fetched(Result<Fragment, FetchError>),
}
