//! Footer: a status line above the key hints for the current screen.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::app::Theme;

/// Rows used by the footer.
pub const FOOTER_HEIGHT: u16 = 2;

/// A key and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    #[must_use]
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

#[derive(Debug)]
pub struct FooterWidget<'a> {
    hints: &'a [KeyHint],
    status: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> FooterWidget<'a> {
    #[must_use]
    pub fn new(hints: &'a [KeyHint], theme: &'a Theme) -> Self {
        Self {
            hints,
            status: None,
            theme,
        }
    }

    /// Message shown above the hints, e.g. a failed action.
    #[must_use]
    pub fn status(mut self, status: Option<&'a str>) -> Self {
        self.status = status;
        self
    }

    fn hints_line(&self) -> Line<'a> {
        let mut spans = Vec::with_capacity(self.hints.len() * 3);
        for hint in self.hints {
            spans.push(Span::styled(format!(" {}", hint.key), self.theme.key_hint));
            spans.push(Span::raw(":"));
            spans.push(Span::styled(format!("{} ", hint.action), self.theme.text_secondary));
        }
        Line::from(spans)
    }
}

impl Widget for FooterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        if let Some(status) = self.status {
            Paragraph::new(format!(" {status}"))
                .style(self.theme.failure)
                .render(rows[0], buf);
        }
        Paragraph::new(self.hints_line()).render(rows[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::buffer_lines;

    const HINTS: &[KeyHint] = &[KeyHint::new("q", "quit"), KeyHint::new("n", "new")];

    #[test]
    fn footer_renders_hints_and_status() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, FOOTER_HEIGHT);
        let mut buf = Buffer::empty(area);
        FooterWidget::new(HINTS, &theme)
            .status(Some("Failed to cancel subscription"))
            .render(area, &mut buf);

        let lines = buffer_lines(&buf);
        assert!(lines[0].contains("Failed to cancel subscription"));
        assert!(lines[1].contains("q:quit"));
        assert!(lines[1].contains("n:new"));
    }

    #[test]
    fn footer_without_status_leaves_first_row_blank() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, FOOTER_HEIGHT);
        let mut buf = Buffer::empty(area);
        FooterWidget::new(HINTS, &theme).render(area, &mut buf);

        assert!(buffer_lines(&buf)[0].trim().is_empty());
    }
}
