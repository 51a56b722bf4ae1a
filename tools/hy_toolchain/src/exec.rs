//! Command Executor
//!
//! Runs one external process to completion and reports what it did. A
//! non-zero exit status is data, not an error: only failing to spawn the
//! child or to wait on it is reported through [`ExecError`].
//!
//! Without a timeout the executor blocks until the child exits. With one,
//! the child is polled and killed once the deadline passes, and the output
//! is flagged as `timed_out`. The deadline also bounds collecting output: a
//! grandchild that inherited the pipes cannot hold the stage open, and
//! whatever it has not flushed by then is dropped.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while a deadline is in force.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How long past the deadline readers may take to drain pipes that are
/// already closed.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

// --- Error Types ---

/// Failure to run a process at all.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The process could not be started (missing program, permissions, ...).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The process started but waiting on it failed.
    #[error("failed to wait on '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

// --- Invocation ---

/// A single process invocation: program, arguments and working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run. Absolute paths are used as-is, bare names go through `PATH`.
    pub program: OsString,
    /// Arguments, in order.
    pub args: Vec<OsString>,
    /// Working directory override. `None` inherits the harness's directory.
    pub cwd: Option<PathBuf>,
    /// Send stdout/stderr to the null device instead of capturing them.
    pub discard_output: bool,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            ..Default::default()
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run the process inside `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Do not capture output; only the exit status will be observed.
    #[must_use]
    pub fn discard_output(mut self) -> Self {
        self.discard_output = true;
        self
    }

    /// Program name for diagnostics.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        if self.discard_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(s: &OsStr) -> String {
    let s = s.to_string_lossy();
    if s.contains(' ') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.into_owned()
    }
}

// --- Output ---

/// What a finished process did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code. On Unix a signal-terminated process reports the negated
    /// signal number. `None` only when the platform gives no code at all.
    pub exit_code: Option<i32>,
    /// Captured stdout (empty when output was discarded).
    pub stdout: String,
    /// Captured stderr (empty when output was discarded).
    pub stderr: String,
    /// The process was killed because it outlived the executor's timeout.
    pub timed_out: bool,
}

impl CommandOutput {
    /// Exited on its own with status 0.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

// --- Executor ---

/// Spawns processes and waits for them, optionally under a deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor {
    timeout: Option<Duration>,
}

impl CommandExecutor {
    /// Executor that waits indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that kills children running longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run `invocation` to completion.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned or waited on.
    /// A non-zero exit status is reported in [`CommandOutput::exit_code`].
    pub fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ExecError> {
        tracing::debug!(command = %invocation, cwd = ?invocation.cwd, "spawning");

        // A limit too large to represent as an instant is no limit.
        let deadline = self
            .timeout
            .and_then(|limit| Instant::now().checked_add(limit));

        let mut child = invocation
            .to_command()
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        // Drain both pipes on their own threads so a chatty child never
        // blocks on a full pipe while we wait on it.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let waited = wait(&mut child, deadline);
        if waited.is_err() {
            kill_quietly(&mut child);
        }

        let stdout = collect_reader(stdout, deadline);
        let stderr = collect_reader(stderr, deadline);

        let (status, timed_out) = waited.map_err(|source| ExecError::Wait {
            program: invocation.program_name(),
            source,
        })?;

        let output = CommandOutput {
            exit_code: exit_code(status),
            stdout,
            stderr,
            timed_out,
        };

        tracing::debug!(
            command = %invocation,
            exit_code = ?output.exit_code,
            timed_out = output.timed_out,
            "process finished"
        );

        Ok(output)
    }
}

fn wait(child: &mut Child, deadline: Option<Instant>) -> io::Result<(ExitStatus, bool)> {
    let Some(deadline) = deadline else {
        return child.wait().map(|status| (status, false));
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            kill_quietly(child);
            let status = child.wait()?;
            return Ok((status, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill a child, ignoring the race where it already exited.
fn kill_quietly(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "kill failed; child likely already exited");
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::debug!(error = %e, "pipe read ended early");
        }
        // The receiver is gone once the deadline has passed.
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Output of one reader, waiting no later than `deadline`.
fn collect_reader(reader: Option<Receiver<String>>, deadline: Option<Instant>) -> String {
    let Some(rx) = reader else {
        return String::new();
    };
    let collected = match deadline {
        None => rx.recv().ok(),
        Some(deadline) => {
            let until = deadline.checked_add(DRAIN_GRACE).unwrap_or(deadline);
            rx.recv_timeout(until.saturating_duration_since(Instant::now()))
                .ok()
        }
    };
    collected.unwrap_or_else(|| {
        tracing::debug!("output pipe still open at deadline; dropping it");
        String::new()
    })
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| -sig))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}
