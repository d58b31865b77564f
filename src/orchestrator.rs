// src/orchestrator.rs

//! One worker run, end to end: build, launch, drain, wait, parse.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{LaunchConfig, ProcessOptions, RunOptions};
use crate::errors::{BridgeError, Result};
use crate::exec::cancel::{cancelled, CancelSignal};
use crate::exec::{drain_streams, launch, OutputSink, ProcessHandle};
use crate::invocation::build_invocation;
use crate::result::{parse_result, ResultDocument};
use crate::types::OutputBuffer;

/// What a completed run produced.
///
/// `result` and `exit_code` are reported side by side. A worker that exits
/// non-zero but prints a `success` document (or the reverse) is passed
/// through as-is; the caller decides what that means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub result: ResultDocument,
    /// `None` if the worker was killed by a signal.
    pub exit_code: Option<i32>,
}

impl Outcome {
    /// Whether the exit code agrees with the reported status.
    pub fn is_consistent(&self) -> bool {
        let exited_ok = self.exit_code == Some(0);
        exited_ok == self.result.is_success()
    }
}

/// Run the worker once with default process options and no cancellation.
pub async fn orchestrate(config: &LaunchConfig, sink: Arc<dyn OutputSink>) -> Result<Outcome> {
    orchestrate_with_cancel(
        config,
        &ProcessOptions::default(),
        RunOptions::default(),
        sink,
        None,
    )
    .await
}

/// Run the worker once.
///
/// Blocks until both output streams reach end-of-input and the process has
/// exited, or until `cancel` fires / `run.timeout` elapses. On cancellation
/// the worker is killed and reaped before `Cancelled` is returned. The
/// process is reaped on every error path after a successful launch.
pub async fn orchestrate_with_cancel(
    config: &LaunchConfig,
    process: &ProcessOptions,
    run: RunOptions,
    sink: Arc<dyn OutputSink>,
    cancel: Option<CancelSignal>,
) -> Result<Outcome> {
    let invocation = build_invocation(config);
    let mut handle = launch(&invocation, process)?;

    let finished = tokio::select! {
        res = drain_then_wait(&mut handle, sink) => Ok(res),
        reason = cancelled(cancel, run.timeout) => Err(reason),
    };

    let (buffer, exit_code) = match finished {
        Ok(res) => res?,
        Err(reason) => {
            warn!(program = %handle.program(), %reason, "cancelling worker run");
            handle.terminate().await;
            return Err(BridgeError::Cancelled(reason));
        }
    };

    let result = parse_result(&buffer)?;
    let outcome = Outcome { result, exit_code };

    if !outcome.is_consistent() {
        warn!(
            exit_code = ?outcome.exit_code,
            status = ?outcome.result.status,
            "worker exit code disagrees with reported status"
        );
    }
    info!(
        status = ?outcome.result.status,
        exit_code = ?outcome.exit_code,
        "worker run finished"
    );

    Ok(outcome)
}

async fn drain_then_wait(
    handle: &mut ProcessHandle,
    sink: Arc<dyn OutputSink>,
) -> Result<(OutputBuffer, Option<i32>)> {
    match drain_streams(handle, sink).await {
        Ok(buffer) => {
            let code = handle.wait().await?;
            Ok((buffer, code))
        }
        Err(err) => {
            // The worker may be stuck writing to the pipe we stopped reading.
            handle.terminate().await;
            Err(err)
        }
    }
}
