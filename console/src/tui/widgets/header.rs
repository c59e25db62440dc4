//! Header bar: product name, screen tabs and the signed-in user.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Hookboard   Dashboard  Tester                    ● a@b.com   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tui::app::{Screen, Symbols, Theme};

/// Rows used by the header, borders included.
pub const HEADER_HEIGHT: u16 = 3;

const TABS: [(Screen, &str); 2] = [(Screen::Dashboard, "Dashboard"), (Screen::Tester, "Tester")];

#[derive(Debug)]
pub struct HeaderWidget<'a> {
    screen: Screen,
    email: Option<&'a str>,
    theme: &'a Theme,
    symbols: &'a Symbols,
}

impl<'a> HeaderWidget<'a> {
    #[must_use]
    pub fn new(screen: Screen, email: Option<&'a str>, theme: &'a Theme, symbols: &'a Symbols) -> Self {
        Self {
            screen,
            email,
            theme,
            symbols,
        }
    }

    fn tabs_line(&self) -> Line<'a> {
        let mut spans = vec![Span::styled(" Hookboard ", self.theme.title), Span::raw("  ")];
        for (screen, label) in TABS {
            let style = if screen == self.screen {
                self.theme.tab_active
            } else {
                self.theme.text_secondary
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw("  "));
        }
        Line::from(spans)
    }

    fn user_line(&self) -> Line<'a> {
        match self.email {
            Some(email) => Line::from(vec![
                Span::styled(self.symbols.active, self.theme.status_active),
                Span::raw(" "),
                Span::styled(email, self.theme.text_primary),
                Span::raw(" "),
            ]),
            None => Line::from(Span::styled("signed out ", self.theme.text_muted)),
        }
    }
}

impl Widget for HeaderWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        Paragraph::new(self.tabs_line()).render(inner, buf);
        Paragraph::new(self.user_line())
            .alignment(Alignment::Right)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::{ASCII_SYMBOLS, UNICODE_SYMBOLS};
    use crate::tui::widgets::buffer_text;

    fn render(widget: HeaderWidget<'_>, width: u16) -> Buffer {
        let area = Rect::new(0, 0, width, HEADER_HEIGHT);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    #[test]
    fn header_shows_tabs_and_user() {
        let theme = Theme::default();
        let buf = render(
            HeaderWidget::new(Screen::Dashboard, Some("a@b.com"), &theme, &UNICODE_SYMBOLS),
            80,
        );
        let text = buffer_text(&buf);

        assert!(text.contains("Hookboard"));
        assert!(text.contains("Dashboard"));
        assert!(text.contains("Tester"));
        assert!(text.contains("a@b.com"));
        assert!(text.contains("●"));
    }

    #[test]
    fn header_highlights_active_tab() {
        let theme = Theme::default();
        let buf = render(
            HeaderWidget::new(Screen::Tester, None, &theme, &ASCII_SYMBOLS),
            80,
        );

        let line: String = (0..80u16).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        let byte_index = line.find("Tester").unwrap();
        let tester_x = line[..byte_index].chars().count() as u16;
        assert_eq!(buf[(tester_x, 1)].style().fg, theme.tab_active.fg);
        assert!(buffer_text(&buf).contains("signed out"));
    }

    #[test]
    fn header_handles_tiny_area() {
        let theme = Theme::monochrome();
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        HeaderWidget::new(Screen::Dashboard, None, &theme, &ASCII_SYMBOLS).render(area, &mut buf);
    }
}
