//! Terminal session for the dashboard: raw mode, alternate screen and a
//! panic hook that puts the shell back before anything is printed.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

const WINDOW_TITLE: &str = "mirrorwatch";

/// An entered terminal. Dropping it restores the shell.
pub struct DashboardTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl DashboardTerminal {
    /// Switch to raw mode on the alternate screen and clear it.
    pub fn start() -> Result<Self> {
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        out.execute(EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        // Not every emulator honours titles; failure is harmless.
        let _ = out.execute(SetTitle(WINDOW_TITLE));
        terminal.clear()?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for DashboardTerminal {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Best-effort restoration; partial failures are ignored.
fn restore_terminal() {
    let mut out = stdout();
    let _ = out.execute(cursor::Show);
    let _ = out.execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install color-eyre reporting plus a panic hook that restores the
/// terminal first. Call before [`DashboardTerminal::start`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        panic_hook(info);
    }));

    Ok(())
}
