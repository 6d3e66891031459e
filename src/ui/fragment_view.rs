use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Padding, Paragraph, Wrap},
};

use crate::state::app_state::{AppState, FetchStatus};
use crate::state::fragment::Fragment;
use super::layout::BORDER_INACTIVE;

pub const TIMESTAMP_COLOR: Color = Color::Red;
pub const BODY_COLOR: Color = Color::White;

/// Timestamp line, two blank lines, then the body.
pub fn fragment_text(fragment: &Fragment) -> Text<'static> {
    let body_style = Style::default().fg(BODY_COLOR);
    let mut lines = vec![
        Line::styled(fragment.timestamp(), Style::default().fg(TIMESTAMP_COLOR)),
        Line::default(),
        Line::default(),
    ];
    lines.extend(
        fragment
            .text
            .lines()
            .map(|line| Line::styled(line.to_string(), body_style)),
    );
    Text::from(lines)
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match &state.fragment {
        Some(fragment) => fragment_text(fragment),
        None => {
            let hint = match state.status {
                FetchStatus::Error(_) => "No fact yet. Retrying on the next tick, or press r",
                _ => "Waiting for the first fact…",
            };
            Text::from(Line::styled(hint, Style::default().fg(BORDER_INACTIVE)))
        }
    };

    let para = Paragraph::new(text)
        .block(Block::default().padding(Padding::horizontal(2)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(para, area);
}
