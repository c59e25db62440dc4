//! Tester screen: composer, tunnel status and the result log.
//!
//! ```text
//! ┌ Subscription ───────────────┐┌ Payload (sample) ───────────────┐
//! │ ● https://src -> https://cb ││ {                               │
//! └─────────────────────────────┘│   "user": { ... }               │
//! ┌ Event type ─────────────────┐│                                 │
//! │ < User Created >            │└─────────────────────────────────┘
//! └─────────────────────────────┘┌ Results ────────────────────────┐
//! ┌ Webhook URL ────────────────┐│ ✓ 10:00:00 Event ID: evt_1      │
//! │ http://.../webhook-events/1 ││ ✗ 10:00:05 Failed to send...    │
//! │ Tunnel: stopped             ││                                 │
//! └─────────────────────────────┘└─────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::truncate;
use crate::payloads::{event_type_label, sample_payload_pretty};
use crate::results::TestResult;
use crate::tui::app::{Symbols, Theme};
use crate::views::{Loadable, TesterView};

#[derive(Debug)]
pub struct TesterPanelWidget<'a> {
    view: &'a TesterView,
    webhook_url: Option<&'a str>,
    editing: bool,
    now: DateTime<Utc>,
    theme: &'a Theme,
    symbols: &'a Symbols,
}

impl<'a> TesterPanelWidget<'a> {
    #[must_use]
    pub fn new(view: &'a TesterView, theme: &'a Theme, symbols: &'a Symbols) -> Self {
        Self {
            view,
            webhook_url: None,
            editing: false,
            now: Utc::now(),
            theme,
            symbols,
        }
    }

    /// URL test fires for the selection are posted to.
    #[must_use]
    pub fn webhook_url(mut self, url: Option<&'a str>) -> Self {
        self.webhook_url = url;
        self
    }

    /// Whether keys currently go to the payload editor.
    #[must_use]
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Instant used for the sample payload preview.
    #[must_use]
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn boxed(&self, title: String, focused: bool) -> Block<'a> {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if focused {
                self.theme.border_focused
            } else {
                self.theme.border
            })
    }

    fn render_subscriptions(&self, area: Rect, buf: &mut Buffer) {
        let block = self.boxed(" Subscription ".to_string(), !self.editing);
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line<'_>> = match self.view.subscriptions() {
            Loadable::Idle | Loadable::Loading => {
                vec![Line::styled("Loading subscriptions...", self.theme.pending)]
            }
            Loadable::Failed(error) => vec![Line::styled(
                format!("Failed to load subscriptions: {error}"),
                self.theme.failure,
            )],
            Loadable::Loaded(_) if self.view.active_subscriptions().is_empty() => vec![Line::styled(
                "No active subscriptions. Create one on the dashboard.",
                self.theme.text_muted,
            )],
            Loadable::Loaded(_) => {
                let url_width = usize::from(inner.width).saturating_sub(8) / 2;
                let selected = self.view.selected_id();
                let mut lines: Vec<Line<'_>> = self
                    .view
                    .active_subscriptions()
                    .iter()
                    .map(|s| {
                        let is_selected = selected == Some(s.id.as_str());
                        let (symbol, style) = if is_selected {
                            (self.symbols.active, self.theme.selected)
                        } else {
                            (self.symbols.inactive, self.theme.text_primary)
                        };
                        Line::styled(
                            format!(
                                "{symbol} {} {} {}",
                                truncate(&s.source_url, url_width),
                                self.symbols.arrow,
                                truncate(&s.callback_url, url_width)
                            ),
                            style,
                        )
                    })
                    .collect();
                if selected.is_none() {
                    lines.insert(
                        0,
                        Line::styled("Select a subscription (Up/Down)", self.theme.text_muted),
                    );
                }
                lines
            }
        };
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_event_type(&self, area: Rect, buf: &mut Buffer) {
        let block = self.boxed(" Event type ".to_string(), false);
        let inner = block.inner(area);
        block.render(area, buf);

        let tag = self.view.event_type();
        Paragraph::new(Line::from(vec![
            Span::styled("< ", self.theme.key_hint),
            Span::styled(event_type_label(tag), self.theme.text_primary),
            Span::styled(" >", self.theme.key_hint),
            Span::styled(format!("  {tag}"), self.theme.text_muted),
        ]))
        .render(inner, buf);
    }

    fn render_endpoint(&self, area: Rect, buf: &mut Buffer) {
        let block = self.boxed(" Webhook URL ".to_string(), false);
        let inner = block.inner(area);
        block.render(area, buf);

        let url_line = match self.webhook_url {
            Some(url) => Line::styled(url.to_string(), self.theme.text_primary),
            None => Line::styled("(select a subscription)", self.theme.text_muted),
        };

        let status = self.view.tunnel_status();
        let tunnel_line = match (&status.error, status.running, &status.url) {
            (Some(error), _, _) => Line::styled(format!("Tunnel: {error}"), self.theme.failure),
            (None, true, Some(url)) => Line::from(vec![
                Span::styled(format!("{} Tunnel: ", self.symbols.active), self.theme.status_active),
                Span::styled(url.clone(), self.theme.text_primary),
            ]),
            (None, true, None) => Line::styled(
                format!("{} Tunnel: running", self.symbols.active),
                self.theme.status_active,
            ),
            (None, false, _) => Line::styled(
                format!("{} Tunnel: stopped", self.symbols.inactive),
                self.theme.text_muted,
            ),
        };

        Paragraph::new(vec![url_line, tunnel_line])
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_payload(&self, area: Rect, buf: &mut Buffer) {
        let custom = self.view.custom_payload();
        let (title, text, style) = if self.editing {
            (
                " Payload (editing, Esc to stop, Ctrl+S to send) ",
                format!("{custom}_"),
                self.theme.input_focused,
            )
        } else if custom.trim().is_empty() {
            let sample = sample_payload_pretty(self.view.event_type(), self.now);
            (" Payload (sample, e to edit) ", sample, self.theme.text_secondary)
        } else {
            (" Payload (custom, e to edit, x to clear) ", custom.to_string(), self.theme.text_primary)
        };

        Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(self.boxed(title.to_string(), self.editing))
            .render(area, buf);
    }

    fn result_line(&self, result: &TestResult) -> Line<'a> {
        let time = result.timestamp.format("%H:%M:%S").to_string();
        if result.success {
            Line::from(vec![
                Span::styled(format!("{} ", self.symbols.success), self.theme.success),
                Span::styled(format!("{time}  "), self.theme.text_secondary),
                Span::styled(format!("Event ID: {}", result.event_id), self.theme.text_primary),
            ])
        } else {
            let error = result.error.as_deref().unwrap_or("Failed");
            Line::from(vec![
                Span::styled(format!("{} ", self.symbols.failure), self.theme.failure),
                Span::styled(format!("{time}  "), self.theme.text_secondary),
                Span::styled(error.to_string(), self.theme.failure),
            ])
        }
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let results = self.view.results();
        let title = format!(" Results ({}/{}) ", results.len(), results.capacity());
        let block = self.boxed(title, false);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line<'_>> = Vec::new();
        if self.view.is_sending() {
            lines.push(Line::styled(
                format!("{} Sending...", self.symbols.pending),
                self.theme.pending,
            ));
        }
        if results.is_empty() && !self.view.is_sending() {
            lines.push(Line::styled(
                "No test webhooks sent yet. Press s to send.",
                self.theme.text_muted,
            ));
        }
        lines.extend(results.iter().map(|result| self.result_line(result)));

        Paragraph::new(lines)
            .style(Style::default())
            .render(inner, buf);
    }
}

impl Widget for TesterPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);

        let left = Layout::vertical([
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(5),
        ])
        .split(columns[0]);
        self.render_subscriptions(left[0], buf);
        self.render_event_type(left[1], buf);
        self.render_endpoint(left[2], buf);

        let right =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).split(columns[1]);
        self.render_payload(right[0], buf);
        self.render_results(right[1], buf);
    }
}
