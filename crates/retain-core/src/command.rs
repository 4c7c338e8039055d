//! External process execution.
//!
//! The listing command and the per-artifact delete command are the only
//! processes a run spawns. Both go through [`CommandRunner`] so the engine can
//! be driven by a scripted fake in tests. [`SystemRunner`] is the real
//! implementation: it captures output on reader threads and enforces an
//! optional timeout with `wait-timeout`, killing the child when it expires.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::CommandError;

/// Shell used for the listing command.
pub const SHELL: &str = "/bin/sh";

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to run external commands.
pub trait CommandRunner: Send + Sync {
    /// Run a full shell command line through `/bin/sh -c`.
    ///
    /// Only used for the listing command, which is operator-supplied.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the shell cannot be spawned or the
    /// command exceeds the timeout.
    fn run_shell(&self, command: &str) -> Result<CommandOutput, CommandError>;

    /// Run `program` with `args` directly, without a shell.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotFound`] if `program` does not exist, and
    /// other variants for spawn failures and timeouts.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;

    /// Locate `program` on `PATH` (or at its path, if it contains a slash).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotFound`] if it cannot be found.
    fn resolve(&self, program: &str) -> Result<PathBuf, CommandError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner; `timeout` bounds each command, `None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn execute(
        &self,
        mut cmd: Command,
        program: &str,
        rendered: &str,
    ) -> Result<CommandOutput, CommandError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CommandError::NotFound {
                    program: program.to_string(),
                }
            } else {
                CommandError::Io {
                    command: rendered.to_string(),
                    source,
                }
            }
        })?;

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait for it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let wait_error = |source| CommandError::Io {
            command: rendered.to_string(),
            source,
        };

        let status = match self.timeout {
            Some(limit) => match child.wait_timeout(limit).map_err(wait_error)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!(command = rendered, ?limit, "command timed out, killed");
                    // Grandchildren may still hold the pipes open; the reader
                    // threads are detached rather than joined.
                    return Err(CommandError::TimedOut {
                        command: rendered.to_string(),
                        timeout: limit,
                    });
                }
            },
            None => child.wait().map_err(wait_error)?,
        };

        let output = CommandOutput {
            code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };
        tracing::debug!(command = rendered, code = ?output.code, "command finished");
        Ok(output)
    }
}

impl CommandRunner for SystemRunner {
    fn run_shell(&self, command: &str) -> Result<CommandOutput, CommandError> {
        let mut cmd = Command::new(SHELL);
        cmd.arg("-c").arg(command);
        self.execute(cmd, SHELL, command)
    }

    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let rendered = render(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args);
        self.execute(cmd, program, &rendered)
    }

    fn resolve(&self, program: &str) -> Result<PathBuf, CommandError> {
        which::which(program).map_err(|err| {
            tracing::debug!(program, %err, "executable lookup failed");
            CommandError::NotFound {
                program: program.to_string(),
            }
        })
    }
}

/// Render an argument vector as a copy-pastable shell line for logs.
pub fn render(program: &str, args: &[String]) -> String {
    let words = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(words).unwrap_or_else(|_| format!("{program} {}", args.join(" ")))
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_shell_captures_stdout_and_status() {
        let runner = SystemRunner::default();
        let out = runner.run_shell("printf 'a\\nb\\n'").unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "a\nb\n");

        let failed = runner.run_shell("echo oops >&2; exit 3").unwrap();
        assert_eq!(failed.code, Some(3));
        assert_eq!(failed.stderr.trim(), "oops");
    }

    #[test]
    fn test_run_passes_arguments_verbatim() {
        let runner = SystemRunner::default();
        let out = runner
            .run("printf", &["%s|".to_string(), "a b; rm -rf /".to_string()])
            .unwrap();
        assert_eq!(out.stdout, "a b; rm -rf /|");
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let runner = SystemRunner::default();
        let err = runner
            .run("retain-test-no-such-program", &[])
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
        assert!(runner.resolve("retain-test-no-such-program").is_err());
        assert!(runner.resolve("sh").is_ok());
    }

    #[test]
    fn test_timeout_kills_command() {
        let runner = SystemRunner::new(Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();
        let err = runner.run("sleep", &["5".to_string()]).unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_render_quotes_arguments() {
        let line = render("rm", &["/tmp/my backups/a.tar".to_string()]);
        assert_eq!(
            shlex::split(&line).unwrap(),
            vec!["rm".to_string(), "/tmp/my backups/a.tar".to_string()]
        );
    }
}
