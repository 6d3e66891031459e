use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::app_state::{AppState, FetchStatus};
use super::layout::{ACCENT_BLUE, BORDER_INACTIVE, ERROR_RED, SPINNER_FRAMES};

const HINTS: &str = "r:refresh · j/k:scroll · q:quit ";

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(HINTS.chars().count() as u16)])
        .split(area);

    let status = match &state.status {
        FetchStatus::Idle => {
            let mut spans = vec![Span::styled(
                " LIVE ",
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT_BLUE)
                    .add_modifier(Modifier::BOLD),
            )];
            if let Some(secs) = state.shown_countdown {
                spans.push(Span::styled(
                    format!("  next in {}s", secs),
                    Style::default().fg(BORDER_INACTIVE),
                ));
            }
            Line::from(spans)
        }
        FetchStatus::Fetching { spinner_tick } => {
            let idx = (*spinner_tick as usize) % SPINNER_FRAMES.len();
            Line::from(vec![
                Span::styled(
                    format!(" {} ", SPINNER_FRAMES[idx]),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled("fetching…", Style::default().fg(BORDER_INACTIVE)),
            ])
        }
        FetchStatus::Error(msg) => {
            // Countdown goes before the message so only the message is clipped.
            let mut spans = vec![Span::styled(
                " ERROR ",
                Style::default()
                    .fg(Color::Black)
                    .bg(ERROR_RED)
                    .add_modifier(Modifier::BOLD),
            )];
            if let Some(secs) = state.shown_countdown {
                spans.push(Span::styled(
                    format!("  retry in {}s ·", secs),
                    Style::default().fg(BORDER_INACTIVE),
                ));
            }
            spans.push(Span::styled(format!(" {}", msg), Style::default().fg(ERROR_RED)));
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(status), halves[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(HINTS, Style::default().fg(BORDER_INACTIVE)))),
        halves[1],
    );
}
