//! Terminal setup and RAII restoration for the Hookboard console.
//!
//! [`Tui`] enters raw mode and the alternate screen on creation and restores
//! the terminal when dropped. [`install_panic_hook`] covers panics that happen
//! before the drop handler can run.
//!
//! # Example
//!
//! ```ignore
//! use hookboard_console::tui::{install_panic_hook, Tui};
//!
//! install_panic_hook();
//!
//! let mut tui = Tui::new()?;
//! tui.draw(|frame| {
//!     // render widgets to frame
//! })?;
//! // Terminal restored when `tui` goes out of scope
//! ```

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::error::TuiError;

/// Installs a panic hook that restores the terminal before the panic message
/// is printed.
///
/// Call once at startup, before creating a [`Tui`]. Calling it again chains
/// the hooks.
pub fn install_panic_hook() {
    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        // Best effort: the terminal may already be in a bad state.
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();

        previous_hook(panic_info);
    }));
}

/// A ratatui terminal that restores the user's terminal on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl Tui {
    /// Enables raw mode, enters the alternate screen and hides the cursor.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::TerminalInit` if any step fails; steps already taken
    /// are undone.
    pub fn new() -> Result<Self, TuiError> {
        enable_raw_mode().map_err(TuiError::TerminalInit)?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(TuiError::TerminalInit(e));
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(e) => {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(TuiError::TerminalInit(e));
            }
        };

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Render` if the frame cannot be flushed.
    pub fn draw<F>(&mut self, f: F) -> Result<(), TuiError>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f).map_err(TuiError::Render)?;
        Ok(())
    }

    /// Restores the terminal. Later calls, and the drop handler, are no-ops.
    ///
    /// # Errors
    ///
    /// Unlike [`Drop`], restoration errors are returned.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        execute!(io::stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if self.restored {
            return;
        }

        // Errors are ignored: we may be unwinding.
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
