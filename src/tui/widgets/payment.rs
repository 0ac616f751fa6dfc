// Payment screen panel: pending bet summary and the confirm/reject controls.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::protocol::BetStatus;
use crate::tui::ViewState;

/// Render the payment panel. Without a loaded bet only the frame is drawn;
/// the alert banner already explains why.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Payment confirmation ");

    let Some(bet) = &state.payment_bet else {
        frame.render_widget(block, area);
        return;
    };

    let status_style = match bet.status {
        BetStatus::Pending => Style::default().fg(Color::Yellow),
        BetStatus::Active => Style::default().fg(Color::Green),
        BetStatus::Rejected => Style::default().fg(Color::Red),
    };

    let mut lines = vec![
        Line::from(format!("Bet #{}", bet.id)),
        Line::from(""),
        Line::from(format!("  1st place: {}", state.driver_name(bet.top1))),
        Line::from(format!("  2nd place: {}", state.driver_name(bet.top2))),
        Line::from(format!("  3rd place: {}", state.driver_name(bet.top3))),
        Line::from(""),
        Line::from(vec![
            Span::raw("  Status: "),
            Span::styled(bet.status.label(), status_style.add_modifier(Modifier::BOLD)),
        ]),
    ];

    // The confirm/reject controls only exist while the bet is pending, and
    // are rendered disabled while a request is in flight.
    if bet.status == BetStatus::Pending {
        lines.push(Line::from(""));
        let controls = if state.busy {
            Span::styled(
                "  Processing...",
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Span::raw("  Y: pay and activate    N: reject payment")
        };
        lines.push(Line::from(controls));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
