// src/exec/process.rs

//! Worker process lifecycle: spawn, wait, terminate.

use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::config::ProcessOptions;
use crate::errors::{BridgeError, Result};
use crate::invocation::Invocation;
use crate::types::StdinMode;

/// A running (or finished) worker process and its output pipes.
///
/// The child is spawned with `kill_on_drop(true)`, so dropping the handle on
/// any path stops the worker. Prefer [`wait`](Self::wait) or
/// [`terminate`](Self::terminate), which also reap it.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    program: String,
    exit_code: Option<Option<i32>>,
}

impl ProcessHandle {
    /// OS process id; `None` once the child has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Exit code once the process has terminated.
    ///
    /// Outer `None` means still running (or not yet waited on); inner `None`
    /// means it was killed by a signal.
    pub fn exit_code(&self) -> Option<Option<i32>> {
        self.exit_code
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the process to exit and return its exit code.
    ///
    /// Call this after both output streams have been drained, otherwise a
    /// worker blocked on a full pipe never exits. Calling it again after the
    /// process has exited returns the same code.
    pub async fn wait(&mut self) -> Result<Option<i32>> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }

        let status = self.child.wait().await.map_err(BridgeError::ProcessWait)?;
        let code = status.code();
        self.exit_code = Some(code);

        info!(
            program = %self.program,
            exit_code = ?code,
            success = status.success(),
            "worker process exited"
        );

        Ok(code)
    }

    /// Kill the process (if still running) and reap it.
    ///
    /// Failures are logged; by the time this is called the run has already
    /// failed for another reason.
    pub async fn terminate(&mut self) {
        if self.exit_code.is_some() {
            return;
        }

        debug!(program = %self.program, pid = ?self.pid(), "terminating worker process");
        if let Err(e) = self.child.start_kill() {
            // Usually means it already exited; still reap below.
            debug!(program = %self.program, error = %e, "kill failed");
        }

        match self.child.wait().await {
            Ok(status) => {
                self.exit_code = Some(status.code());
                info!(
                    program = %self.program,
                    exit_code = ?status.code(),
                    "worker process terminated"
                );
            }
            Err(e) => {
                warn!(
                    program = %self.program,
                    error = %e,
                    "failed to reap worker process after kill"
                );
            }
        }
    }
}

/// Start the worker described by `invocation`.
///
/// Stdout and stderr are piped for draining; stdin follows
/// `options.stdin`.
pub fn launch(invocation: &Invocation, options: &ProcessOptions) -> Result<ProcessHandle> {
    let program = invocation.program().to_string_lossy().into_owned();
    info!(program = %program, invocation = %invocation, "starting worker process");

    let mut cmd = Command::new(invocation.program());
    cmd.args(invocation.args())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(match options.stdin {
            StdinMode::Inherit => Stdio::inherit(),
            StdinMode::Null => Stdio::null(),
        })
        .kill_on_drop(true);

    if let Some(ref dir) = options.working_dir {
        cmd.current_dir(dir);
    }
    cmd.envs(&options.env);

    let child = cmd.spawn().map_err(|source| BridgeError::Launch {
        program: program.clone(),
        source,
    })?;

    debug!(program = %program, pid = ?child.id(), "worker process spawned");

    Ok(ProcessHandle {
        child,
        program,
        exit_code: None,
    })
}
