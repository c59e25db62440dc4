//! The dashboard's subscription table.
//!
//! One row per subscription with its status, endpoints, event count and
//! creation date. The selected row is highlighted and kept in view; a row
//! with a cancel or delete in flight shows the pending verb instead of its
//! status.

use hookboard_client::WebhookSubscription;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::truncate;
use crate::tui::app::{Symbols, Theme};
use crate::views::{DashboardView, Loadable, PendingAction};

/// Columns used by everything except the two URLs.
const FIXED_COLUMNS: usize = 44;

#[derive(Debug)]
pub struct SubscriptionListWidget<'a> {
    view: &'a DashboardView,
    theme: &'a Theme,
    symbols: &'a Symbols,
}

impl<'a> SubscriptionListWidget<'a> {
    #[must_use]
    pub fn new(view: &'a DashboardView, theme: &'a Theme, symbols: &'a Symbols) -> Self {
        Self {
            view,
            theme,
            symbols,
        }
    }

    fn title(&self) -> String {
        let count = self.view.subscription_list().len();
        if self.view.is_refreshing() {
            format!(" Subscriptions ({count}) {} refreshing ", self.symbols.pending)
        } else {
            format!(" Subscriptions ({count}) ")
        }
    }

    fn row(&self, subscription: &'a WebhookSubscription, selected: bool, width: usize) -> Line<'a> {
        let pending = self
            .view
            .pending_action()
            .filter(|action| action.id() == subscription.id);

        let (symbol, status, status_style) = match pending {
            Some(PendingAction::Cancel(_)) => (self.symbols.pending, "Cancelling", self.theme.pending),
            Some(PendingAction::Delete(_)) => (self.symbols.pending, "Deleting", self.theme.pending),
            None if subscription.is_active => {
                (self.symbols.active, "Active", self.theme.status_active)
            }
            None => (self.symbols.inactive, "Inactive", self.theme.status_inactive),
        };

        let url_width = width.saturating_sub(FIXED_COLUMNS) / 2;
        let endpoints = format!(
            "{} {} {}",
            truncate(&subscription.source_url, url_width.max(8)),
            self.symbols.arrow,
            truncate(&subscription.callback_url, url_width.max(8)),
        );
        let details = format!(
            "{:>6} events  {}",
            subscription.event_count(),
            subscription.created_at.format("%Y-%m-%d")
        );

        let line = Line::from(vec![
            Span::styled(format!(" {symbol} "), status_style),
            Span::styled(format!("{status:<11}"), status_style),
            Span::styled(endpoints, self.theme.text_primary),
            Span::raw("  "),
            Span::styled(details, self.theme.text_secondary),
        ]);

        if selected {
            line.style(self.theme.selected)
        } else {
            line
        }
    }

    fn message(&self, text: String, style: ratatui::style::Style, area: Rect, buf: &mut Buffer) {
        Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

impl Widget for SubscriptionListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(self.theme.border_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let subscriptions = match self.view.subscriptions() {
            Loadable::Idle | Loadable::Loading => {
                self.message("Loading subscriptions...".to_string(), self.theme.pending, inner, buf);
                return;
            }
            Loadable::Failed(error) => {
                self.message(
                    format!("Failed to load subscriptions: {error}"),
                    self.theme.failure,
                    inner,
                    buf,
                );
                return;
            }
            Loadable::Loaded(subscriptions) => subscriptions,
        };

        if subscriptions.is_empty() {
            self.message(
                "No subscriptions yet. Press n to create one.".to_string(),
                self.theme.text_muted,
                inner,
                buf,
            );
            return;
        }

        let visible = usize::from(inner.height);
        let selected = self.view.selected_index();
        let offset = (selected + 1).saturating_sub(visible);
        let width = usize::from(inner.width);

        let lines: Vec<Line<'_>> = subscriptions
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, subscription)| self.row(subscription, i == selected, width))
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
