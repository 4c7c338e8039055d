//! Run the retention policy against one backup target.

use anyhow::{Context, Result};
use retain_core::{RetentionConfig, RetentionRunner, RunOutcome, SystemRunner};

use crate::Cli;
use crate::ui::{Output, summary};

/// List, evaluate and prune the backups described by `cli`.
pub fn prune(cli: &Cli, config: &RetentionConfig) -> Result<RunOutcome> {
    let span = tracing::info_span!("retention", backup = %cli.backup_name);
    let _guard = span.enter();

    tracing::info!(
        list_command = %cli.list_command,
        keep = config.copies_to_keep(),
        dry_run = config.dry_run(),
        local_dir = ?config.local_dir(),
        delete_command = ?config.delete_command(),
        "starting retention run"
    );

    let output = Output::new(cli.backup_name.as_str(), cli.console_quiet());
    let commands = SystemRunner::new(config.command_timeout());
    let runner = RetentionRunner::new(config, &commands, &output);

    let outcome = runner
        .run(&cli.list_command)
        .with_context(|| format!("retention run for {} failed", cli.backup_name))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !cli.quiet {
        summary::print_outcome(&outcome);
    }

    if let Some(report) = outcome.report() {
        tracing::info!(
            kept = report.keep_set().len(),
            deleted = report.deleted_count(),
            failed = report.failures().count(),
            "deletion logic is complete"
        );
    }
    Ok(outcome)
}
