//! Subprocess invocation of the verification tool.

use c2pa_verifier_core::{Error, Result};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Spawn attempts made while the binary is still open for writing elsewhere.
const BUSY_SPAWN_ATTEMPTS: u32 = 6;
/// Delay before the first repeated spawn; doubled for each further attempt.
const BUSY_SPAWN_BACKOFF: Duration = Duration::from_millis(10);

/// How the tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
}

impl ExitInfo {
    /// A successful exit with code 0.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            success: true,
        }
    }

    /// A failed exit with the given code.
    #[must_use]
    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            success: false,
        }
    }
}

impl From<std::process::ExitStatus> for ExitInfo {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Captured output of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitInfo,
}

/// Invokes the verification tool with a time limit.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    timeout: Duration,
}

impl ToolRunner {
    /// Create a runner that kills invocations running longer than `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run the tool against `target`, capturing both output streams.
    ///
    /// A non-zero exit is not an error here; it is returned for the caller to
    /// classify.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] if the process cannot be spawned or does
    /// not finish within the time limit.
    pub async fn run(&self, binary: &Path, target: &Path) -> Result<RunOutput> {
        let target = std::path::absolute(target).map_err(|e| {
            Error::io(e, Some(target.to_path_buf()), "resolving target path")
        })?;
        debug!(?binary, ?target, "Running verification tool");

        let mut command = Command::new(binary);
        command.arg(&target);
        let output = self.output(command, binary).await?;

        if !output.exit.success {
            debug!(exit = %output.exit, stderr = %output.stderr.trim(), "Verification tool exited abnormally");
        }
        Ok(output)
    }

    /// Health-check the tool with `--version`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] if the process cannot be spawned, times
    /// out, or exits unsuccessfully.
    pub async fn probe(&self, binary: &Path) -> Result<String> {
        let mut command = Command::new(binary);
        command.arg("--version");
        let output = self.output(command, binary).await?;

        if !output.exit.success {
            let detail = output.stderr.trim();
            return Err(Error::execution(format!(
                "{} --version failed with {}: {detail}",
                binary.display(),
                output.exit
            )));
        }

        let version = output.stdout.trim().to_string();
        debug!(?binary, %version, "Probed verification tool");
        Ok(version)
    }

    async fn output(&self, mut command: Command, binary: &Path) -> Result<RunOutput> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = spawn(&mut command, binary).await?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| {
                Error::execution(format!("failed to wait for {}: {e}", binary.display()))
            })?,
            Err(_) => {
                warn!(?binary, timeout = ?self.timeout, "Verification tool timed out");
                return Err(Error::timeout(self.timeout));
            }
        };

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit: output.status.into(),
        })
    }
}

/// Spawn `command`, retrying while the kernel reports the binary busy.
///
/// A freshly written binary can be briefly held open for writing by a child
/// that another thread forked before the write handle was closed.
async fn spawn(command: &mut Command, binary: &Path) -> Result<Child> {
    let mut delay = BUSY_SPAWN_BACKOFF;
    let mut attempt = 1;
    loop {
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(e)
                if e.kind() == io::ErrorKind::ExecutableFileBusy
                    && attempt < BUSY_SPAWN_ATTEMPTS =>
            {
                debug!(?binary, attempt, ?delay, "Verification tool busy, retrying spawn");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => {
                return Err(Error::execution(format!(
                    "failed to spawn {}: {e}",
                    binary.display()
                )));
            }
        }
    }
}
