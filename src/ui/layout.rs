use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::Color,
};

use crate::state::app_state::AppState;
use super::{fragment_view, status_bar};

// TokyoNight palette
pub const ACCENT_BLUE: Color = Color::Rgb(122, 162, 247);  // #7aa2f7
pub const BORDER_INACTIVE: Color = Color::Rgb(65, 72, 104); // #414868
pub const ERROR_RED: Color = Color::Rgb(247, 118, 142);     // #f7768e

pub const SPINNER_FRAMES: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Split off status bar at bottom
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    fragment_view::render(frame, vertical[0], state);
    status_bar::render(frame, vertical[1], state);
}
