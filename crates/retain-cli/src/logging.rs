//! Log file setup
//!
//! Every run appends to one log file so the history of retention decisions
//! survives across invocations. The level comes from `RUST_LOG` and defaults
//! to `debug`.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "debug";

/// Open `path` for appending, creating it if needed.
pub fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global subscriber writing to `path`.
pub fn init(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")
}
