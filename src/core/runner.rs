//! Guarded external-process execution.
//!
//! Every external call in the pipeline goes through [`run`] or
//! [`run_checked`]: one child process paired with one watchdog timer that
//! force-kills the child when the wall-clock budget is exceeded. Invocations
//! are strictly sequential; no two children are ever alive at once.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::utils::shell;

/// Default budget for short git and packaging commands.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
/// Budget for a native compile of one component.
pub const BUILD_TIMEOUT_SECS: u64 = 3600;
/// Budget for the external test suite.
pub const SUITE_TIMEOUT_SECS: u64 = 14_400;

const POLL_TICK: Duration = Duration::from_millis(50);

/// One external command: argument vector, working directory, timeout policy,
/// environment overlay. Constructed per call and discarded.
#[derive(Debug, Clone)]
pub struct Invocation {
    command: Vec<String>,
    cwd: PathBuf,
    timeout: Duration,
    timeout_is_fatal: bool,
    shell: bool,
    env: Vec<(String, String)>,
    output_file: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(command: I, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            command: command.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            timeout_is_fatal: true,
            shell: false,
            env: Vec::new(),
            output_file: None,
        }
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    /// Tolerate a timeout instead of treating it as pipeline-fatal.
    pub fn tolerate_timeout(mut self) -> Self {
        self.timeout_is_fatal = false;
        self
    }

    /// Join the vector into a single string and run it through `sh -c`.
    /// A few commands only terminate reliably under a shell.
    pub fn via_shell(mut self) -> Self {
        self.shell = true;
        self
    }

    /// Merge an extra variable over the inherited environment.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Redirect interleaved stdout/stderr into a file instead of the
    /// controlling terminal.
    pub fn output_file(mut self, path: &Path) -> Self {
        self.output_file = Some(path.to_path_buf());
        self
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Exit status of a guarded invocation.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub exit_code: i32,
    pub timed_out: bool,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Run one external command to completion or forced termination.
///
/// A timeout is fatal (an error) unless the invocation opted out with
/// [`Invocation::tolerate_timeout`]. The exit code is returned to the caller
/// either way; use [`run_checked`] when a non-zero exit should abort the run.
pub fn run(inv: &Invocation) -> Result<Outcome> {
    if inv.command.is_empty() {
        return Err(Error::Config("Empty command vector".to_string()));
    }
    if !inv.cwd.is_dir() {
        return Err(Error::MissingDirectory(inv.cwd.clone()));
    }

    crate::log_status!(
        "    Executing: '{}' in '{}'",
        inv.command_line(),
        inv.cwd.display()
    );

    let mut cmd = if inv.shell {
        let mut c = Command::new("sh");
        c.arg("-c").arg(shell::join_for_shell(&inv.command));
        c
    } else {
        let mut c = Command::new(&inv.command[0]);
        c.args(&inv.command[1..]);
        c
    };
    cmd.current_dir(&inv.cwd);
    for (key, value) in &inv.env {
        cmd.env(key, value);
    }

    if let Some(path) = &inv.output_file {
        let mut file = File::create(path)?;
        writeln!(file, "cwd: {}", inv.cwd.display())?;
        writeln!(file, "{}", inv.command_line())?;
        let stderr_handle = file.try_clone()?;
        cmd.stdout(Stdio::from(file));
        cmd.stderr(Stdio::from(stderr_handle));
    }

    let mut child = cmd.spawn()?;

    // Watchdog timer on its own thread; cancelled the instant the child
    // exits, otherwise it flags expiry and the child is killed.
    let cancel = Arc::new(AtomicBool::new(false));
    let expired = Arc::new(AtomicBool::new(false));
    let deadline = Instant::now() + inv.timeout;
    let watchdog = {
        let cancel = Arc::clone(&cancel);
        let expired = Arc::clone(&expired);
        thread::spawn(move || loop {
            if cancel.load(Ordering::SeqCst) {
                return;
            }
            if Instant::now() >= deadline {
                expired.store(true, Ordering::SeqCst);
                return;
            }
            thread::sleep(POLL_TICK);
        })
    };

    let outcome = loop {
        if let Some(status) = child.try_wait()? {
            cancel.store(true, Ordering::SeqCst);
            break Outcome {
                exit_code: status.code().unwrap_or(-1),
                timed_out: false,
            };
        }
        if expired.load(Ordering::SeqCst) {
            child.kill()?;
            let status = child.wait()?;
            if let Some(path) = &inv.output_file {
                let mut file = File::options().append(true).open(path)?;
                writeln!(file, "Terminated after timeout")?;
            }
            break Outcome {
                exit_code: status.code().unwrap_or(-1),
                timed_out: true,
            };
        }
        thread::sleep(POLL_TICK);
    };
    let _ = watchdog.join();

    if outcome.timed_out && inv.timeout_is_fatal {
        return Err(Error::CommandTimeout {
            command: inv.command_line(),
            seconds: inv.timeout.as_secs(),
        });
    }

    crate::log_status!("Exit code: {}", outcome.exit_code);
    Ok(outcome)
}

/// Run a command and require a zero exit code.
pub fn run_checked(inv: &Invocation) -> Result<()> {
    let outcome = run(inv)?;
    if !outcome.success() {
        return Err(Error::CommandFailed {
            command: inv.command_line(),
            code: outcome.exit_code,
        });
    }
    Ok(())
}
