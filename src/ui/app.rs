use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use usagedash_core::state::DashboardState;

use crate::input::{Multiplexer, Signal};
use crate::monitor::Refresher;

use super::Screen;

/// What the loop does after handling a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Wait,
    Refresh,
    Exit,
}

/// Main application: one thread driving input, refresh and repaint
pub struct App<W: Write> {
    state: DashboardState,
    screen: Screen<W>,
    refresher: Refresher,
    input: Multiplexer,
    interval: Duration,
}

impl<W: Write> App<W> {
    pub fn new(
        state: DashboardState,
        screen: Screen<W>,
        refresher: Refresher,
        input: Multiplexer,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            screen,
            refresher,
            input,
            interval,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn screen(&self) -> &Screen<W> {
        &self.screen
    }

    /// Run until interrupted.
    ///
    /// Both views are fetched right away, then every `interval`. Keys and
    /// resizes repaint from cache and leave the tick deadline untouched.
    pub fn run(&mut self) -> Result<()> {
        info!(view = self.state.active.key(), "Dashboard started");
        self.repaint()?;
        self.refresh()?;
        let mut next_tick = Instant::now() + self.interval;

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            let signal = self
                .input
                .next_signal(timeout)
                .context("Failed to wait for input")?;

            match self.handle(signal)? {
                Step::Wait => {}
                Step::Refresh => {
                    self.refresh()?;
                    next_tick = Instant::now() + self.interval;
                }
                Step::Exit => break,
            }
        }

        info!("Dashboard stopped");
        Ok(())
    }

    fn handle(&mut self, signal: Signal) -> Result<Step> {
        debug!(?signal, "Input signal");
        match signal {
            Signal::Timeout => return Ok(Step::Refresh),
            Signal::Interrupt => return Ok(Step::Exit),
            Signal::NoSignal => return Ok(Step::Wait),
            Signal::NavigateLeft => self.state.navigate_left(),
            Signal::NavigateRight => self.state.navigate_right(),
            Signal::Resize => {}
        }
        self.repaint()?;
        Ok(Step::Wait)
    }

    /// Redraw the active view from cache
    fn repaint(&mut self) -> Result<()> {
        self.screen
            .paint(&self.state, Utc::now())
            .context("Failed to draw dashboard")
    }

    /// One refresh tick; the active view is repainted as its data arrives
    fn refresh(&mut self) -> Result<()> {
        let screen = &mut self.screen;
        let mut paint_error = None;
        self.refresher.tick(&mut self.state, &mut |state| {
            if let Err(e) = screen.paint(state, Utc::now()) {
                paint_error.get_or_insert(e);
            }
        });
        match paint_error {
            Some(e) => Err(e).context("Failed to draw dashboard"),
            None => Ok(()),
        }
    }
}
