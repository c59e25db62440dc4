//! "New subscription" form, drawn as a popup over the dashboard.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Modifier,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use super::centered_rect;
use crate::tui::app::{Symbols, Theme};
use crate::views::{CreateField, CreateForm};

const FORM_WIDTH: u16 = 70;
const FORM_HEIGHT: u16 = 17;

const FIELDS: [(CreateField, &str); 3] = [
    (CreateField::SourceUrl, "Source URL"),
    (CreateField::CallbackUrl, "Callback URL"),
    (CreateField::Secret, "Secret (optional, generated if blank)"),
];

#[derive(Debug)]
pub struct CreateFormWidget<'a> {
    form: &'a CreateForm,
    theme: &'a Theme,
    symbols: &'a Symbols,
}

impl<'a> CreateFormWidget<'a> {
    #[must_use]
    pub fn new(form: &'a CreateForm, theme: &'a Theme, symbols: &'a Symbols) -> Self {
        Self {
            form,
            theme,
            symbols,
        }
    }

    fn value(&self, field: CreateField) -> &'a str {
        match field {
            CreateField::SourceUrl => &self.form.source_url,
            CreateField::CallbackUrl => &self.form.callback_url,
            CreateField::Secret => &self.form.secret,
        }
    }

    fn render_field(&self, field: CreateField, label: &str, area: Rect, buf: &mut Buffer) {
        let focused = self.form.focused == field;
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(3)]).split(area);

        let label_style = if focused {
            self.theme.label.add_modifier(Modifier::BOLD)
        } else {
            self.theme.label
        };
        Paragraph::new(label).style(label_style).render(chunks[0], buf);

        let value = self.value(field);
        let (text, style, border) = if focused && !self.form.submitting {
            (format!("{value}_"), self.theme.input_focused, self.theme.border_focused)
        } else {
            (value.to_string(), self.theme.input_unfocused, self.theme.border)
        };
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(border))
            .render(chunks[1], buf);
    }
}

impl Widget for CreateFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let form_area = centered_rect(area, FORM_WIDTH, FORM_HEIGHT);
        Clear.render(form_area, buf);

        let block = Block::default()
            .title(" New subscription ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(self.theme.border_focused);
        let inner = block.inner(form_area);
        block.render(form_area, buf);

        let rows = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(1), // error
            Constraint::Length(1), // hint
            Constraint::Min(0),
        ])
        .split(inner);

        for (i, (field, label)) in FIELDS.into_iter().enumerate() {
            self.render_field(field, label, rows[i], buf);
        }

        if let Some(error) = &self.form.error {
            Paragraph::new(error.as_str())
                .style(self.theme.input_error)
                .render(rows[3], buf);
        }

        let hint = if self.form.submitting {
            Line::styled(
                format!("{} Creating subscription...", self.symbols.pending),
                self.theme.pending,
            )
        } else {
            Line::styled(
                "Tab: next field  Enter: create  Esc: cancel",
                self.theme.text_muted,
            )
        };
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(rows[4], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::ASCII_SYMBOLS;
    use crate::tui::widgets::buffer_text;

    fn render(form: &CreateForm) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        CreateFormWidget::new(form, &theme, &ASCII_SYMBOLS).render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn create_form_shows_fields_and_cursor() {
        let form = CreateForm {
            source_url: "https://src".to_string(),
            focused: CreateField::SourceUrl,
            ..CreateForm::default()
        };
        let text = render(&form);

        assert!(text.contains("New subscription"));
        assert!(text.contains("Source URL"));
        assert!(text.contains("Callback URL"));
        assert!(text.contains("generated if blank"));
        assert!(text.contains("https://src_"));
        assert!(text.contains("Enter: create"));
    }

    #[test]
    fn create_form_shows_error_and_progress() {
        let form = CreateForm {
            submitting: true,
            error: Some("source URL: is required".to_string()),
            ..CreateForm::default()
        };
        let text = render(&form);

        assert!(text.contains("source URL: is required"));
        assert!(text.contains("[.] Creating subscription..."));
    }
}
