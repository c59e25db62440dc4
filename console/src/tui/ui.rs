//! Screen composition for the Hookboard console.
//!
//! ```text
//! render() --> match state.screen {
//!     Loading   --> render_loading_screen()
//!     Login     --> render_login_screen()
//!     Dashboard --> render_dashboard_screen()  (+ create form / confirm popups)
//!     Tester    --> render_tester_screen()
//! }
//! ```

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::{AppState, Screen};
use crate::tui::widgets::{
    centered_rect, CreateFormWidget, DetailsPanelWidget, FooterWidget, HeaderWidget, KeyHint,
    LoginFormWidget, SubscriptionListWidget, TesterPanelWidget, FOOTER_HEIGHT, HEADER_HEIGHT,
};

const DASHBOARD_HINTS: &[KeyHint] = &[
    KeyHint::new("j/k", "move"),
    KeyHint::new("Enter", "details"),
    KeyHint::new("n", "new"),
    KeyHint::new("c", "cancel"),
    KeyHint::new("d", "delete"),
    KeyHint::new("r", "refresh"),
    KeyHint::new("Tab", "tester"),
    KeyHint::new("L", "logout"),
    KeyHint::new("q", "quit"),
];

const CONFIRM_HINTS: &[KeyHint] = &[KeyHint::new("y", "delete"), KeyHint::new("n/Esc", "keep")];

const CREATE_HINTS: &[KeyHint] = &[
    KeyHint::new("Tab", "next field"),
    KeyHint::new("Enter", "create"),
    KeyHint::new("Esc", "close"),
];

const TESTER_HINTS: &[KeyHint] = &[
    KeyHint::new("Up/Down", "subscription"),
    KeyHint::new("Left/Right", "event type"),
    KeyHint::new("e", "edit payload"),
    KeyHint::new("s", "send"),
    KeyHint::new("t", "tunnel"),
    KeyHint::new("r", "refresh"),
    KeyHint::new("Tab", "dashboard"),
    KeyHint::new("q", "quit"),
];

const EDITOR_HINTS: &[KeyHint] = &[
    KeyHint::new("Ctrl+S", "send"),
    KeyHint::new("Esc", "stop editing"),
];

/// Draws the current screen.
pub fn render(frame: &mut Frame, state: &AppState) {
    match state.screen {
        Screen::Loading => render_loading_screen(frame, state),
        Screen::Login => render_login_screen(frame, state),
        Screen::Dashboard => render_dashboard_screen(frame, state),
        Screen::Tester => render_tester_screen(frame, state),
    }
}

fn render_loading_screen(frame: &mut Frame, state: &AppState) {
    let area = centered_rect(frame.area(), 40, 3);
    let message = Paragraph::new(format!("{} Restoring session...", state.symbols.pending))
        .style(state.theme.pending)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(state.theme.border));
    frame.render_widget(message, area);
}

fn render_login_screen(frame: &mut Frame, state: &AppState) {
    let widget = LoginFormWidget::new(&state.login, &state.theme, &state.symbols);
    frame.render_widget(widget, frame.area());
}

/// Splits the frame into header, body and footer.
fn chrome(frame: &mut Frame, state: &AppState, hints: &[KeyHint], status: Option<&str>) -> Rect {
    let rows = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .split(frame.area());

    frame.render_widget(
        HeaderWidget::new(state.screen, state.user_email(), &state.theme, &state.symbols),
        rows[0],
    );
    frame.render_widget(
        FooterWidget::new(hints, &state.theme).status(status),
        rows[2],
    );
    rows[1]
}

fn render_dashboard_screen(frame: &mut Frame, state: &AppState) {
    let dashboard = &state.dashboard;
    let hints = if dashboard.pending_confirmation().is_some() {
        CONFIRM_HINTS
    } else if dashboard.create_form().is_some() {
        CREATE_HINTS
    } else {
        DASHBOARD_HINTS
    };
    let status = state.status.as_deref().or(dashboard.notice());
    let body = chrome(frame, state, hints, status);

    let list = SubscriptionListWidget::new(dashboard, &state.theme, &state.symbols);
    match dashboard.details() {
        Some(panel) => {
            let columns =
                Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .split(body);
            frame.render_widget(list, columns[0]);
            frame.render_widget(
                DetailsPanelWidget::new(panel, &state.theme, &state.symbols),
                columns[1],
            );
        }
        None => frame.render_widget(list, body),
    }

    if let Some(form) = dashboard.create_form() {
        frame.render_widget(
            CreateFormWidget::new(form, &state.theme, &state.symbols),
            body,
        );
    }

    if let Some(id) = dashboard.pending_confirmation() {
        render_confirm_dialog(frame, state, id, body);
    }
}

fn render_confirm_dialog(frame: &mut Frame, state: &AppState, id: &str, area: Rect) {
    let dialog_area = centered_rect(area, 60, 7);
    frame.render_widget(Clear, dialog_area);

    let source = state
        .dashboard
        .subscription(id)
        .map_or(id, |s| s.source_url.as_str());
    let text = vec![
        Line::raw(""),
        Line::styled(
            "Are you sure you want to delete this subscription?",
            state.theme.text_primary,
        ),
        Line::styled(source.to_string(), state.theme.text_secondary),
        Line::styled("y: delete   n: keep", state.theme.key_hint),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Delete subscription ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(state.theme.failure),
        );
    frame.render_widget(dialog, dialog_area);
}

fn render_tester_screen(frame: &mut Frame, state: &AppState) {
    let hints = if state.editing_payload {
        EDITOR_HINTS
    } else {
        TESTER_HINTS
    };
    let body = chrome(frame, state, hints, state.status.as_deref());

    let webhook_url = state.tester.webhook_url(state.auth.api());
    let panel = TesterPanelWidget::new(&state.tester, &state.theme, &state.symbols)
        .webhook_url(webhook_url.as_deref())
        .editing(state.editing_payload);
    frame.render_widget(panel, body);
}
