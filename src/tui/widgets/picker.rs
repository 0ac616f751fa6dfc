// Podium picker panel: three dropdown slots sharing the driver roster.
//
// Pure projection of the `PickerGroup` state. Anchors render first, then the
// open option lists overlay whatever sits below them. The screen regions of
// both are fed back into the controller for pointer hit-testing; the list
// always drops below its own anchor (no flip-up), clipped to the screen.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

/// Podium position captions, one per slot.
pub const SLOT_TITLES: [&str; 3] = [" 1st place ", " 2nd place ", " 3rd place "];

/// Render the picker column: slot anchors, the submission hint, and any
/// open option lists on top.
pub fn render(frame: &mut Frame, area: Rect, state: &mut ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    for slot in 0..state.picker.slot_count().min(3) {
        render_anchor(frame, rows[slot], state, slot);
    }

    if rows[3].height > 0 {
        let hint = Paragraph::new("Enter: open  ↑/↓: move  S: place bet  C: clear")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(hint, rows[3]);
    }

    // Open lists render last so they overlay the anchors below them.
    for slot in 0..state.picker.slot_count().min(3) {
        if state.picker.is_open(slot) {
            render_open_list(frame, state, slot);
        }
    }
}

fn render_anchor(frame: &mut Frame, area: Rect, state: &mut ViewState, slot: usize) {
    state.picker.set_anchor(slot, area);

    let focused = state.focused_slot == slot;
    let border_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let has_selection = state.picker.selection_of(slot).is_some();
    let caption_style = if has_selection {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    let caption = format!("{} ▾", state.picker.display_label(slot));

    let paragraph = Paragraph::new(Span::styled(caption, caption_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(SLOT_TITLES[slot]),
    );
    frame.render_widget(paragraph, area);
}

/// Compute where a slot's option list drops: directly below the anchor's
/// bottom edge, full anchor width, one row per option, clipped to the
/// screen (clipping is not flip-up; the list never renders above).
fn drop_area(anchor: Rect, option_count: usize, screen: Rect) -> Rect {
    let desired = Rect::new(
        anchor.x,
        anchor.y.saturating_add(anchor.height),
        anchor.width,
        option_count as u16,
    );
    desired.intersection(screen)
}

fn render_open_list(frame: &mut Frame, state: &mut ViewState, slot: usize) {
    let Some(anchor) = state.picker.anchor(slot) else {
        return;
    };
    let options = state.picker.options().to_vec();
    let list = drop_area(anchor, options.len(), frame.area());
    state.picker.set_list_area(slot, list);
    if list.height == 0 || list.width < 4 {
        return;
    }

    frame.render_widget(Clear, list);

    let highlight = state.picker.highlight(slot);
    let own_selection = state.picker.selection_of(slot);

    for (i, option) in options.iter().take(list.height as usize).enumerate() {
        let row = Rect {
            y: list.y + i as u16,
            height: 1,
            ..list
        };

        let disabled = state.picker.is_disabled(slot, option.id);
        let is_highlight = i == highlight;
        let is_own = own_selection == Some(option.id);

        let mut style = Style::default().bg(Color::Black);
        if disabled {
            style = style.fg(Color::DarkGray).add_modifier(Modifier::DIM);
        } else if is_own {
            style = style.fg(Color::Green);
        }
        if is_highlight {
            style = style.add_modifier(Modifier::BOLD);
            if !disabled {
                style = style.fg(Color::Cyan);
            }
        }

        let prefix = if is_highlight { "▸ " } else { "  " };
        let max_text = row.width.saturating_sub(2) as usize;
        let label: String = option.label.chars().take(max_text).collect();

        frame.render_widget(
            Paragraph::new(Span::styled(format!("{prefix}{label}"), style)),
            row,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
