// Single-line text input rendered as a bordered box with a label title.
//
// Holds its own value; the render layer only projects it. Password fields
// mask their content but keep the real value for submission.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

#[derive(Debug, Clone, Default)]
pub struct TextField {
    label: &'static str,
    value: String,
    masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    /// A field whose rendered content is masked (passwords).
    pub fn masked(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: true,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// The string shown on screen: the value itself, or one bullet per
    /// character for masked fields.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Render the field. The focused field gets a highlighted border and a
    /// trailing cursor block.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut content = self.display();
        if focused {
            content.push('█');
        }

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(self.label),
        );
        frame.render_widget(paragraph, area);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_roundtrip() {
        let mut field = TextField::new("Email");
        field.push('a');
        field.push('@');
        field.push('b');
        assert_eq!(field.value(), "a@b");
        field.backspace();
        assert_eq!(field.value(), "a@");
        field.clear();
        assert!(field.is_empty());
    }

    #[test]
    fn backspace_on_empty_is_a_noop() {
        let mut field = TextField::new("Email");
        field.backspace();
        assert_eq!(field.value(), "");
    }

    #[test]
    fn masked_field_hides_value_but_keeps_it() {
        let mut field = TextField::masked("Password");
        for c in "Abc123".chars() {
            field.push(c);
        }
        assert_eq!(field.display(), "••••••");
        assert_eq!(field.value(), "Abc123");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let field = TextField::new("Email");
        terminal
            .draw(|frame| field.render(frame, Rect::new(0, 0, 30, 3), true))
            .unwrap();
    }
}
