//! Details for one subscription and its recorded events.

use hookboard_client::WebhookEvent;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::truncate;
use crate::tui::app::{Symbols, Theme};
use crate::views::{DetailsPanel, Loadable};

/// Rows used by the subscription summary above the event list.
const SUMMARY_HEIGHT: u16 = 6;

#[derive(Debug)]
pub struct DetailsPanelWidget<'a> {
    panel: &'a DetailsPanel,
    theme: &'a Theme,
    symbols: &'a Symbols,
}

impl<'a> DetailsPanelWidget<'a> {
    #[must_use]
    pub fn new(panel: &'a DetailsPanel, theme: &'a Theme, symbols: &'a Symbols) -> Self {
        Self {
            panel,
            theme,
            symbols,
        }
    }

    fn field(&self, label: &'static str, value: String) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{label:<10}"), self.theme.text_secondary),
            Span::styled(value, self.theme.text_primary),
        ])
    }

    fn summary(&self) -> Vec<Line<'a>> {
        let subscription = &self.panel.subscription;
        let status = if subscription.is_active {
            Span::styled(
                format!("{} Active", self.symbols.active),
                self.theme.status_active,
            )
        } else {
            Span::styled(
                format!("{} Inactive", self.symbols.inactive),
                self.theme.status_inactive,
            )
        };

        vec![
            self.field("ID", subscription.id.clone()),
            self.field("Source", subscription.source_url.clone()),
            self.field("Callback", subscription.callback_url.clone()),
            self.field(
                "Secret",
                subscription
                    .secret
                    .clone()
                    .unwrap_or_else(|| "(hidden)".to_string()),
            ),
            Line::from(vec![
                Span::styled(format!("{:<10}", "Status"), self.theme.text_secondary),
                status,
            ]),
            self.field(
                "Created",
                subscription
                    .created_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string(),
            ),
        ]
    }

    fn event_line(&self, event: &WebhookEvent, width: usize) -> Line<'a> {
        let (symbol, style) = if event.processing_error.is_some() {
            (self.symbols.failure, self.theme.failure)
        } else if event.processed {
            (self.symbols.success, self.theme.success)
        } else {
            (self.symbols.pending, self.theme.pending)
        };

        let mut spans = vec![
            Span::styled(format!("{symbol} "), style),
            Span::styled(
                event.created_at.format("%m-%d %H:%M:%S ").to_string(),
                self.theme.text_secondary,
            ),
            Span::styled(format!("{:<20}", event.event_type), self.theme.text_primary),
        ];
        if event.retry_count > 0 {
            spans.push(Span::styled(
                format!(" retries: {}", event.retry_count),
                self.theme.pending,
            ));
        }
        if let Some(error) = &event.processing_error {
            spans.push(Span::styled(
                format!(" {}", truncate(error, width.saturating_sub(50).max(10))),
                self.theme.failure,
            ));
        }
        Line::from(spans)
    }
}

impl Widget for DetailsPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Subscription details (Esc to close) ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let chunks =
            Layout::vertical([Constraint::Length(SUMMARY_HEIGHT), Constraint::Min(0)]).split(inner);
        Paragraph::new(self.summary())
            .wrap(Wrap { trim: false })
            .render(chunks[0], buf);

        let events_block = Block::default()
            .title(" Events ")
            .borders(Borders::TOP)
            .border_style(self.theme.border);
        let events_area = events_block.inner(chunks[1]);
        events_block.render(chunks[1], buf);

        let lines: Vec<Line<'_>> = match &self.panel.events {
            Loadable::Idle | Loadable::Loading => {
                vec![Line::styled("Loading events...", self.theme.pending)]
            }
            Loadable::Failed(error) => vec![Line::styled(
                format!("Failed to load events: {error}"),
                self.theme.failure,
            )],
            Loadable::Loaded(events) if events.is_empty() => {
                vec![Line::styled("No events received yet.", self.theme.text_muted)]
            }
            Loadable::Loaded(events) => {
                let width = usize::from(events_area.width);
                events
                    .iter()
                    .take(usize::from(events_area.height))
                    .map(|event| self.event_line(event, width))
                    .collect()
            }
        };
        Paragraph::new(lines).render(events_area, buf);
    }
}
