//! retain - prune date-stamped backups

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use retain_cli::ui::Output;
use retain_cli::{Cli, EXIT_CONFIG, cmd, logging};
use retain_core::{Reporter, RetentionError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(cli.backup_name.as_str(), cli.console_quiet());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("{err:#}"));
            exit_code(&err)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // A bad floor is a usage error, whatever state the log file is in.
    let config = cli.config()?;
    logging::init(&cli.log_file)?;
    cmd::prune::prune(cli, &config)?;
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<RetentionError>() {
        Some(RetentionError::RetentionFloor { .. }) => ExitCode::from(EXIT_CONFIG),
        _ => ExitCode::FAILURE,
    }
}
