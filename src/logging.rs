//! Logging setup for the terminal binary.
//!
//! The terminal is in raw mode while the app runs, so everything goes to a
//! log file instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Filter for `-v` counts, falling back to the configured level.
pub fn filter_directive(base_level: &str, verbose: u8) -> String {
    match verbose {
        0 => format!("diffdrill={base_level},warn"),
        1 => "diffdrill=debug,warn".to_string(),
        2 => "diffdrill=trace,info".to_string(),
        _ => "trace".to_string(),
    }
}

/// `RUST_LOG` wins over the config file and `-v`.
pub fn init_logging(path: &Path, base_level: &str, verbose: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(base_level, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    debug!(verbose, "diffdrill started");
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
    Ok(())
}
