//! Sign in / sign up form.
//!
//! ```text
//! ┌──────────── Hookboard ─────────────┐
//! │      Sign in to your account       │
//! │                                    │
//! │ Email                              │
//! │ ┌────────────────────────────────┐ │
//! │ │ a@b.com_                       │ │
//! │ └────────────────────────────────┘ │
//! │ Password                           │
//! │ ┌────────────────────────────────┐ │
//! │ │ ********                       │ │
//! │ └────────────────────────────────┘ │
//! │ (error)                            │
//! │            → Sign in               │
//! │ Ctrl+R: create an account          │
//! └────────────────────────────────────┘
//! ```

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Modifier,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::centered_rect;
use crate::tui::app::{LoginField, LoginForm, LoginMode, Symbols, Theme};

const FORM_WIDTH: u16 = 50;
const FORM_HEIGHT: u16 = 17;

#[derive(Debug)]
pub struct LoginFormWidget<'a> {
    form: &'a LoginForm,
    theme: &'a Theme,
    symbols: &'a Symbols,
}

impl<'a> LoginFormWidget<'a> {
    #[must_use]
    pub fn new(form: &'a LoginForm, theme: &'a Theme, symbols: &'a Symbols) -> Self {
        Self {
            form,
            theme,
            symbols,
        }
    }

    fn render_field(&self, label: &str, value: String, field: LoginField, area: Rect, buf: &mut Buffer) {
        let focused = self.form.focused == field;
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(3)]).split(area);

        let label_style = if focused {
            self.theme.label.add_modifier(Modifier::BOLD)
        } else {
            self.theme.label
        };
        Paragraph::new(label).style(label_style).render(chunks[0], buf);

        let (text, style, border) = if focused {
            (format!("{value}_"), self.theme.input_focused, self.theme.border_focused)
        } else {
            (value, self.theme.input_unfocused, self.theme.border)
        };
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(border))
            .render(chunks[1], buf);
    }

    fn submit_line(&self) -> Line<'a> {
        if self.form.submitting {
            let label = match self.form.mode {
                LoginMode::SignIn => "Signing in...",
                LoginMode::Register => "Creating account...",
            };
            Line::styled(format!("{} {label}", self.symbols.pending), self.theme.pending)
        } else {
            Line::styled(
                format!("{} {}", self.symbols.arrow, self.form.mode.submit_label()),
                self.theme.key_hint,
            )
        }
    }

    fn toggle_hint(&self) -> &'static str {
        match self.form.mode {
            LoginMode::SignIn => "Ctrl+R: create an account",
            LoginMode::Register => "Ctrl+R: sign in to an existing account",
        }
    }
}

impl Widget for LoginFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let form_area = centered_rect(area, FORM_WIDTH, FORM_HEIGHT);
        let block = Block::default()
            .title(" Hookboard ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(form_area);
        block.render(form_area, buf);

        if inner.width < 20 || inner.height < FORM_HEIGHT - 2 {
            Paragraph::new("Window too small")
                .style(self.theme.text_muted)
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(4), // email
            Constraint::Length(4), // password
            Constraint::Length(1), // error
            Constraint::Length(1), // submit
            Constraint::Length(1), // mode toggle
            Constraint::Min(0),
        ])
        .split(inner);

        Paragraph::new(self.form.mode.title())
            .style(self.theme.title)
            .alignment(Alignment::Center)
            .render(rows[0], buf);

        self.render_field("Email", self.form.email.clone(), LoginField::Email, rows[2], buf);
        let masked = "*".repeat(self.form.password.len());
        self.render_field("Password", masked, LoginField::Password, rows[3], buf);

        if let Some(error) = &self.form.error {
            Paragraph::new(error.as_str())
                .style(self.theme.input_error)
                .render(rows[4], buf);
        }

        Paragraph::new(self.submit_line())
            .alignment(Alignment::Center)
            .render(rows[5], buf);
        Paragraph::new(self.toggle_hint())
            .style(self.theme.text_muted)
            .alignment(Alignment::Center)
            .render(rows[6], buf);
    }
}
