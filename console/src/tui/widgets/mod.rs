//! Widgets for the Hookboard console.
//!
//! Each widget borrows the state it draws plus the shared [`Theme`] and
//! [`Symbols`]; none of them own state. Screens compose them in
//! [`crate::tui::ui`].
//!
//! - [`header`]: title, screen tabs and the signed-in user
//! - [`login_form`]: sign in / sign up form
//! - [`subscription_list`]: the dashboard's subscription table
//! - [`details_panel`]: one subscription and its recorded events
//! - [`create_form`]: "new subscription" form
//! - [`tester_panel`]: test fire composer, tunnel status and results
//! - [`footer`]: key hints and the status line
//!
//! [`Theme`]: crate::tui::app::Theme
//! [`Symbols`]: crate::tui::app::Symbols

pub mod create_form;
pub mod details_panel;
pub mod footer;
pub mod header;
pub mod login_form;
pub mod subscription_list;
pub mod tester_panel;

pub use create_form::CreateFormWidget;
pub use details_panel::DetailsPanelWidget;
pub use footer::{FooterWidget, KeyHint, FOOTER_HEIGHT};
pub use header::{HeaderWidget, HEADER_HEIGHT};
pub use login_form::LoginFormWidget;
pub use subscription_list::SubscriptionListWidget;
pub use tester_panel::TesterPanelWidget;

use ratatui::layout::Rect;

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
#[must_use]
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Shortens `text` to `max` characters, ending in an ellipsis when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('…');
    cut
}

/// Buffer contents as one string per row.
#[cfg(test)]
pub(crate) fn buffer_lines(buf: &ratatui::buffer::Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

/// Buffer contents joined with newlines, for `contains` assertions.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    buffer_lines(buf).join("\n")
}
