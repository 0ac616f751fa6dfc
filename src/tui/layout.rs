// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones shared by every screen:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Alert Banner (3 rows)                             |
// +--------------------------------------------------+
// | Body (fill; per-screen content)                   |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The betting screen splits the body into a picker column and the bet
// history table.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for the fixed zones.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: app name, current screen, logged-in user.
    pub status_bar: Rect,
    /// Inline alert banner under the status bar.
    pub alert: Rect,
    /// Per-screen content area.
    pub body: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the shared frame layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // alert banner
            Constraint::Min(8),    // body
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        alert: vertical[1],
        body: vertical[2],
        help_bar: vertical[3],
    }
}

/// Split the body of the betting screen: picker column (40%) and the bet
/// history table (60%).
pub fn bets_layout(body: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(body);
    (horizontal[0], horizontal[1])
}

/// Center a form of `width` x `height` cells inside `body`, clamped to the
/// available space.
pub fn centered_form(body: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(body.width);
    let height = height.min(body.height);
    let x = body.x + (body.width - width) / 2;
    let y = body.y + (body.height - height) / 2;
    Rect::new(x, y, width, height)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for (name, rect) in [
            ("status_bar", layout.status_bar),
            ("alert", layout.alert),
            ("body", layout.body),
            ("help_bar", layout.help_bar),
        ] {
            assert!(rect.width > 0 && rect.height > 0, "{name} collapsed");
        }
    }

    #[test]
    fn layout_rows_are_stacked() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.y, 0);
        assert_eq!(layout.alert.y, 1);
        assert_eq!(layout.body.y, 4);
        assert_eq!(layout.help_bar.y, 39);
    }

    #[test]
    fn bets_layout_splits_horizontally() {
        let layout = build_layout(test_area());
        let (picker, table) = bets_layout(layout.body);
        assert_eq!(picker.y, table.y);
        assert!(picker.width < table.width);
        assert_eq!(picker.width + table.width, layout.body.width);
    }

    #[test]
    fn centered_form_is_clamped_to_body() {
        let body = Rect::new(0, 4, 50, 10);
        let form = centered_form(body, 80, 30);
        assert!(form.width <= body.width);
        assert!(form.height <= body.height);

        let form = centered_form(body, 40, 8);
        assert_eq!(form.x, 5);
        assert_eq!(form.y, 5);
    }
}
