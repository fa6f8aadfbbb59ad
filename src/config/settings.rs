use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use usagedash_core::state::ViewId;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Live Claude Pro and Cursor usage in your terminal")]
pub struct Config {
    /// Enable debug logging (written to a log file, never the screen)
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Polling interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// View shown at startup (claude or cursor)
    #[arg(long)]
    pub view: Option<ViewId>,

    /// Do not restart Claude Code when its session has expired
    #[arg(long)]
    pub no_renew: bool,

    /// Seconds the renewal helper may run before it is stopped
    #[arg(long)]
    pub renew_wait: Option<u64>,

    /// Timeout in seconds for each usage request
    #[arg(long)]
    pub fetch_timeout: Option<u64>,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Runtime settings (defaults, overridden by the command line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Seconds between refresh ticks
    pub poll_interval_secs: u64,
    /// View shown at startup
    pub initial_view: ViewId,
    /// Whether auth errors on the Claude view trigger credential renewal
    pub renew_enabled: bool,
    /// Seconds the renewal helper may run
    pub renew_wait_secs: u64,
    /// Per-request HTTP timeout in seconds
    pub fetch_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_renew_wait() -> u64 {
    8
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            initial_view: ViewId::default(),
            renew_enabled: true,
            renew_wait_secs: default_renew_wait(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Settings {
    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(interval) = cli.interval {
            self.poll_interval_secs = interval;
        }
        if let Some(view) = cli.view {
            self.initial_view = view;
        }
        if cli.no_renew {
            self.renew_enabled = false;
        }
        if let Some(wait) = cli.renew_wait {
            self.renew_wait_secs = wait;
        }
        if let Some(timeout) = cli.fetch_timeout {
            self.fetch_timeout_secs = timeout;
        }
    }

    /// Validate and normalize settings values
    ///
    /// A zero interval would turn the poll loop into a busy loop.
    pub fn validate(&mut self) {
        const MIN_SECS: u64 = 1;

        self.poll_interval_secs = self.poll_interval_secs.max(MIN_SECS);
        self.renew_wait_secs = self.renew_wait_secs.max(MIN_SECS);
        self.fetch_timeout_secs = self.fetch_timeout_secs.max(MIN_SECS);
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn renew_wait(&self) -> Duration {
        Duration::from_secs(self.renew_wait_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
