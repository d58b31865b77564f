// src/exec/cancel.rs

use std::fmt;
use std::future::pending;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;

/// Why a run was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// [`CancelHandle::cancel`] was called.
    Requested,
    /// The configured timeout elapsed.
    TimedOut(Duration),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Requested => f.write_str("cancellation requested"),
            CancelReason::TimedOut(d) => write!(f, "timed out after {d:?}"),
        }
    }
}

/// Sending half: call [`cancel`](CancelHandle::cancel) to stop a run.
///
/// Dropping the handle without calling `cancel` does **not** cancel.
#[derive(Debug)]
pub struct CancelHandle {
    tx: oneshot::Sender<()>,
}

impl CancelHandle {
    pub fn cancel(self) {
        // The run may already be over; nothing to do then.
        let _ = self.tx.send(());
    }
}

/// Receiving half, handed to the orchestrator.
#[derive(Debug)]
pub struct CancelSignal {
    rx: oneshot::Receiver<()>,
}

/// Create a connected cancel handle/signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Resolve once the run should be cancelled; never resolves if neither a
/// signal nor a timeout is given.
pub(crate) async fn cancelled(
    signal: Option<CancelSignal>,
    timeout: Option<Duration>,
) -> CancelReason {
    let requested = async move {
        match signal {
            Some(signal) => {
                if signal.rx.await.is_err() {
                    // Sender dropped without cancelling.
                    pending::<()>().await;
                }
            }
            None => pending::<()>().await,
        }
    };

    let timer = async move {
        match timeout {
            Some(d) => {
                sleep(d).await;
                d
            }
            None => pending().await,
        }
    };

    tokio::select! {
        _ = requested => CancelReason::Requested,
        d = timer => CancelReason::TimedOut(d),
    }
}
