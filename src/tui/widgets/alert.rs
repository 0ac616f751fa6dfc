// Inline alert banner: the TUI analog of the frontend's alert element.
//
// Renders the current alert (level + message) in the fixed banner row, or
// nothing when no alert is active. Every validation error, server rejection,
// and transport failure surfaces here.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::protocol::AlertLevel;

/// Border/text color for each alert level.
fn level_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::Info => Color::Cyan,
        AlertLevel::Success => Color::Green,
        AlertLevel::Warning => Color::Yellow,
        AlertLevel::Danger => Color::Red,
    }
}

fn level_title(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Info => " Info ",
        AlertLevel::Success => " OK ",
        AlertLevel::Warning => " Warning ",
        AlertLevel::Danger => " Error ",
    }
}

/// Render the alert banner into its fixed row. `None` leaves the row blank.
pub fn render(frame: &mut Frame, area: Rect, alert: Option<&(AlertLevel, String)>) {
    let Some((level, message)) = alert else {
        return;
    };
    let color = level_color(*level);
    let paragraph = Paragraph::new(message.as_str())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(level_title(*level)),
        );
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
