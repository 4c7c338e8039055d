//! Test doubles for the injected capabilities.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;

use crate::command::{CommandOutput, CommandRunner};
use crate::error::{CommandError, DeleteFailure};
use crate::reporter::Reporter;
use crate::types::Artifact;

/// How the fake listing command behaves.
#[derive(Debug, Clone)]
pub(crate) enum Listing {
    Prints(String),
    Exits(i32),
    Hangs,
}

/// A [`CommandRunner`] that never spawns anything.
///
/// Delete invocations are recorded as `program + args` and succeed unless a
/// target matches one registered with [`ScriptedRunner::failing`].
#[derive(Debug)]
pub(crate) struct ScriptedRunner {
    listing: Listing,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    missing: HashSet<String>,
    vanishing: HashSet<String>,
    shell_calls: Mutex<Vec<String>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self {
            listing: Listing::Prints(String::new()),
            failing: HashSet::new(),
            hanging: HashSet::new(),
            missing: HashSet::new(),
            vanishing: HashSet::new(),
            shell_calls: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedRunner {
    pub(crate) fn listing(names: &[&str]) -> Self {
        let mut stdout = names.join("\n");
        stdout.push('\n');
        Self {
            listing: Listing::Prints(stdout),
            ..Self::default()
        }
    }

    pub(crate) fn with_listing(mut self, listing: Listing) -> Self {
        self.listing = listing;
        self
    }

    /// Delete invocations whose last argument contains `target` exit 1.
    pub(crate) fn failing(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }

    /// Delete invocations whose last argument contains `target` time out.
    pub(crate) fn hanging(mut self, target: &str) -> Self {
        self.hanging.insert(target.to_string());
        self
    }

    /// `program` cannot be resolved or run.
    pub(crate) fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// `program` resolves but is gone by the time it is run.
    pub(crate) fn vanishing(mut self, program: &str) -> Self {
        self.vanishing.insert(program.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn shell_calls(&self) -> Vec<String> {
        self.shell_calls.lock().unwrap().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run_shell(&self, command: &str) -> Result<CommandOutput, CommandError> {
        self.shell_calls.lock().unwrap().push(command.to_string());
        match &self.listing {
            Listing::Prints(stdout) => Ok(CommandOutput {
                code: Some(0),
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            Listing::Exits(code) => Ok(CommandOutput {
                code: Some(*code),
                stdout: String::new(),
                stderr: "ls: cannot access: No such file or directory".to_string(),
            }),
            Listing::Hangs => Err(CommandError::TimedOut {
                command: command.to_string(),
                timeout: Duration::from_secs(1),
            }),
        }
    }

    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        if self.missing.contains(program) || self.vanishing.contains(program) {
            return Err(CommandError::NotFound {
                program: program.to_string(),
            });
        }

        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().unwrap().push(call);

        let target = args.last().map(String::as_str).unwrap_or_default();
        if self.hanging.iter().any(|h| target.contains(h.as_str())) {
            return Err(CommandError::TimedOut {
                command: format!("{program} {}", args.join(" ")),
                timeout: Duration::from_millis(250),
            });
        }
        let fails = self.failing.iter().any(|f| target.contains(f.as_str()));
        Ok(CommandOutput {
            code: Some(i32::from(fails)),
            stdout: String::new(),
            stderr: if fails {
                "permission denied".to_string()
            } else {
                String::new()
            },
        })
    }

    fn resolve(&self, program: &str) -> Result<PathBuf, CommandError> {
        if self.missing.contains(program) {
            Err(CommandError::NotFound {
                program: program.to_string(),
            })
        } else {
            Ok(PathBuf::from("/usr/bin").join(program))
        }
    }
}

/// A [`Reporter`] that keeps every event as a line of text.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.contains(needle))
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn listing(&self, command: &str) {
        self.push(format!("listing {command}"));
    }
    fn found(&self, count: usize) {
        self.push(format!("found {count}"));
    }
    fn listing_failed(&self, reason: &str) {
        self.push(format!("warning: listing failed: {reason}"));
    }
    fn no_artifacts(&self) {
        self.push("warning: no backups found".to_string());
    }
    fn date_extracted(&self, artifact: &Artifact, date: NaiveDate) {
        self.push(format!("date {artifact} {date}"));
    }
    fn insufficient(&self, found: usize, required: usize) {
        self.push(format!("warning: insufficient {found}/{required}"));
    }
    fn kept(&self, keep: &[Artifact]) {
        let names: Vec<&str> = keep.iter().map(Artifact::name).collect();
        self.push(format!("kept {}", names.join(",")));
    }
    fn would_delete(&self, artifact: &Artifact) {
        self.push(format!("would delete {artifact}"));
    }
    fn deleted(&self, artifact: &Artifact) {
        self.push(format!("deleted {artifact}"));
    }
    fn delete_failed(&self, artifact: &Artifact, failure: &DeleteFailure) {
        self.push(format!("error: failed {artifact}: {failure}"));
    }
    fn info(&self, msg: &str) {
        self.push(format!("info: {msg}"));
    }
    fn warning(&self, msg: &str) {
        self.push(format!("warning: {msg}"));
    }
    fn error(&self, msg: &str) {
        self.push(format!("error: {msg}"));
    }
}
