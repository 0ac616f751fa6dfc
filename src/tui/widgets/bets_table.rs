// Bet history table: the user's submitted bets with podium picks and
// payment status.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use crate::protocol::BetStatus;
use crate::tui::ViewState;

/// Render the bet history into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("1st"),
        Cell::from("2nd"),
        Cell::from("3rd"),
        Cell::from("Status"),
        Cell::from("Placed"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = state
        .bets
        .iter()
        .enumerate()
        .map(|(i, bet)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(state.driver_name(bet.top1)),
                Cell::from(state.driver_name(bet.top2)),
                Cell::from(state.driver_name(bet.top3)),
                Cell::from(bet.status.label()).style(status_style(bet.status)),
                Cell::from(bet.created_at.clone().unwrap_or_else(|| "--".to_string())),
            ])
        })
        .collect();

    let title = format!(" My bets ({}) ", state.bets.len());
    let widths = [
        Constraint::Length(4),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Length(12),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(table, area);
}

fn status_style(status: BetStatus) -> Style {
    match status {
        BetStatus::Pending => Style::default().fg(Color::Yellow),
        BetStatus::Active => Style::default().fg(Color::Green),
        BetStatus::Rejected => Style::default().fg(Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BetSummary, Driver};

    #[test]
    fn status_colors_follow_lifecycle() {
        assert_eq!(status_style(BetStatus::Pending).fg, Some(Color::Yellow));
        assert_eq!(status_style(BetStatus::Active).fg, Some(Color::Green));
        assert_eq!(status_style(BetStatus::Rejected).fg, Some(Color::Red));
    }

    #[test]
    fn render_does_not_panic_with_bets() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.drivers = vec![
            Driver { id: 1, name: "Lewis".into() },
            Driver { id: 2, name: "Max".into() },
        ];
        state.bets = vec![
            BetSummary {
                id: Some(1),
                top1: 1,
                top2: 2,
                top3: 5,
                status: BetStatus::Active,
                created_at: Some("2026-08-01T10:00:00".into()),
            },
            BetSummary {
                id: None,
                top1: 2,
                top2: 1,
                top3: 5,
                status: BetStatus::Pending,
                created_at: None,
            },
        ];
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_when_empty() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
