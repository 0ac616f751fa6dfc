// Top status bar: app name, current screen, and the logged-in user.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::Screen;
use crate::tui::ViewState;

fn screen_title(screen: Screen) -> &'static str {
    match screen {
        Screen::Login => "Log in",
        Screen::Register => "Register",
        Screen::Bets => "Top-3 bets",
        Screen::Payment => "Payment",
        Screen::Profile => "Profile",
    }
}

/// Render the status bar into its fixed row.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let user = state
        .user_name
        .as_deref()
        .unwrap_or("not logged in");
    let text = format!(" paddock | {} | {}", screen_title(state.screen), user);

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
