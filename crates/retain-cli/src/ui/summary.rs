//! End-of-run summary
//!
//! Column-aligned listing of every backup with its date and fate.

use crossterm::style::Stylize;
use retain_core::{Decision, DeleteStatus, RunOutcome, RunReport};

use super::theme::Theme;

/// Print the summary for `outcome` to stdout. Outcomes that stopped before
/// planning have already been reported and print nothing.
pub fn print_outcome(outcome: &RunOutcome) {
    let Some(report) = outcome.report() else {
        return;
    };
    let theme = Theme::default();
    let width = name_width(report, &theme);

    println!();
    let header = format!(
        "  {:<nw$} {:<dw$} {}",
        "backup",
        "date",
        "action",
        nw = width,
        dw = theme.layout.date_width,
    );
    println!("{}", header.with(theme.colors.header));

    for record in &report.artifacts {
        let action = action_label(report, record.artifact.name(), record.decision);
        let color = match record.decision {
            Decision::Keep => theme.colors.success,
            Decision::Delete => theme.colors.delete,
        };
        let name = format!("{:<width$}", record.artifact.name());
        let date = format!("{:<dw$}", record.date, dw = theme.layout.date_width);
        println!(
            "  {} {} {}",
            name.with(theme.colors.artifact),
            date.with(theme.colors.secondary),
            action.with(color)
        );
    }

    println!();
    println!("{}", footer(report).with(theme.colors.secondary));
}

fn name_width(report: &RunReport, theme: &Theme) -> usize {
    report
        .artifacts
        .iter()
        .map(|r| r.artifact.name().chars().count())
        .max()
        .unwrap_or(0)
        .max(theme.layout.name_width)
}

/// What happened to one backup, as shown in the action column.
fn action_label(report: &RunReport, name: &str, decision: Decision) -> &'static str {
    if decision == Decision::Keep {
        return "keep";
    }
    let status = report
        .outcomes
        .iter()
        .find(|o| o.artifact.name() == name)
        .map(|o| &o.status);
    match status {
        Some(DeleteStatus::Deleted) => "deleted",
        Some(DeleteStatus::Failed { .. }) => "failed",
        Some(DeleteStatus::Reported) if report.dry_run => "would delete",
        _ => "delete (skipped)",
    }
}

fn footer(report: &RunReport) -> String {
    let kept = report.keep_set().len();
    let failed = report.failures().count();
    if report.dry_run {
        format!(
            "  {kept} kept, {} would be removed (dry run)",
            report.delete_set().len()
        )
    } else if failed > 0 {
        format!(
            "  {kept} kept, {} removed, {failed} failed",
            report.deleted_count()
        )
    } else {
        format!("  {kept} kept, {} removed", report.deleted_count())
    }
}
