use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use usagedash::config::{Config, Settings};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug, cli.log_file.clone())?;

    // Load settings
    let mut settings = Settings::default();
    settings.merge_cli(&cli);
    settings.validate();

    // Run the dashboard
    usagedash::run(settings)
}

/// Log to a file only; stdout and stderr belong to the dashboard frame
fn setup_logging(debug: bool, log_file: Option<PathBuf>) -> Result<()> {
    let path = match (log_file, debug) {
        (Some(path), _) => path,
        (None, true) => std::env::temp_dir().join("usagedash.log"),
        (None, false) => return Ok(()),
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("usagedash=debug,usagedash_core=debug")
        } else {
            EnvFilter::new("usagedash=info,usagedash_core=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
