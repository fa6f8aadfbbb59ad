//! Live terminal dashboard for Claude Pro and Cursor plan usage.

pub mod config;
pub mod input;
pub mod monitor;
pub mod ui;

use std::io::IsTerminal;

use anyhow::{Context, Result};

use usagedash_core::state::DashboardState;

use config::Settings;
use input::{CursorGuard, InputModeGuard, Multiplexer};
use monitor::Refresher;
use ui::{App, Screen, WidthProbe};

/// Set up the terminal and run the dashboard until interrupted.
///
/// Terminal state is restored by guards on every exit path.
pub fn run(settings: Settings) -> Result<()> {
    input::signals::install().context("Failed to install signal handlers")?;

    let interactive = input::is_interactive();
    let _input_mode = if interactive {
        Some(InputModeGuard::acquire()?)
    } else {
        tracing::info!("Not attached to a terminal, keyboard input disabled");
        None
    };
    let _cursor = if std::io::stdout().is_terminal() {
        Some(CursorGuard::acquire()?)
    } else {
        None
    };

    let input = Multiplexer::for_terminal(interactive).context("Failed to open terminal input")?;
    let screen = Screen::new(std::io::stdout(), WidthProbe::Terminal);
    let refresher = Refresher::from_settings(&settings);

    let mut app = App::new(
        DashboardState::new(settings.initial_view),
        screen,
        refresher,
        input,
        settings.poll_interval(),
    );
    app.run()
}
