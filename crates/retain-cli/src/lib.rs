//! retain - prune date-stamped backups
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Keeps the newest N copies of a backup and removes the rest.
//!
//! # Overview
//!
//! Backups are found by running an arbitrary listing command (`ls`, `rclone
//! lsf`, `aws s3 ls`, ...) that prints one name per line. Each name must carry
//! an `MM_DD_YYYY` date. The newest `--keep` copies are retained and the rest
//! are removed from a local directory, through a delete command, or both.
//!
//! # Exit codes
//!
//! - `0` - completed, or skipped (no backups, listing failed, too few backups)
//! - `1` - fatal run error (bad date, missing delete executable, log file)
//! - `2` - `--keep` below the retention floor

pub mod cmd;
pub mod logging;
pub mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use retain_core::{DEFAULT_COPIES_TO_KEEP, RetentionConfig, RetentionError};

/// Exit code for configuration errors.
pub const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "retain")]
#[command(author, version = env!("RETAIN_VERSION"), about = "retain - keep the newest backups, remove the rest")]
pub struct Cli {
    /// Shell command that prints one backup name per line
    pub list_command: String,

    /// Name of the backup target, used in logs
    pub backup_name: String,

    /// Number of most recent backups to keep (at least 3)
    #[arg(short, long, env = "RETAIN_KEEP", default_value_t = DEFAULT_COPIES_TO_KEEP)]
    pub keep: usize,

    /// Directory holding the backups; old ones are removed from here
    #[arg(short, long, env = "RETAIN_LOCAL_DIR")]
    pub local_dir: Option<PathBuf>,

    /// Command prefix used to delete a backup, e.g. "rclone deletefile remote:"
    #[arg(short = 'c', long, env = "RETAIN_DELETE_COMMAND")]
    pub delete_command: Option<String>,

    /// Don't remove backups, only print backups to be removed
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Kill the listing or delete command after this many seconds
    #[arg(long, env = "RETAIN_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Append-only log file
    #[arg(long, env = "RETAIN_LOG_FILE", default_value = "retain.log")]
    pub log_file: PathBuf,

    /// Print the run outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress console output (the log file is still written)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Build the engine configuration from the parsed arguments.
    pub fn config(&self) -> Result<RetentionConfig, RetentionError> {
        let mut config = RetentionConfig::new(self.keep)?
            .with_dry_run(self.dry_run)
            .with_command_timeout(self.timeout.map(Duration::from_secs));
        if let Some(dir) = &self.local_dir {
            config = config.with_local_dir(dir.clone());
        }
        if let Some(prefix) = &self.delete_command {
            config = config.with_delete_command(prefix.clone());
        }
        Ok(config)
    }

    /// Whether console lines should be suppressed.
    pub fn console_quiet(&self) -> bool {
        self.quiet || self.json
    }
}
