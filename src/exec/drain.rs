// src/exec/drain.rs

//! Concurrent draining of the worker's stdout and stderr.
//!
//! Both pipes are read by their own Tokio task. Reading one to completion
//! before touching the other would deadlock as soon as the worker fills the
//! pipe we are not reading.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::errors::{BridgeError, Result};
use crate::exec::process::ProcessHandle;
use crate::exec::sink::OutputSink;
use crate::types::{OutputBuffer, StreamKind};

/// Drain both output pipes of `handle` until end-of-input.
///
/// Stdout lines are forwarded to `sink` and collected into the returned
/// buffer; stderr lines are only forwarded.
pub async fn drain_streams(
    handle: &mut ProcessHandle,
    sink: Arc<dyn OutputSink>,
) -> Result<OutputBuffer> {
    let stdout = handle.take_stdout();
    let stderr = handle.take_stderr();
    drain_readers(stdout, stderr, sink).await
}

/// Same as [`drain_streams`], over arbitrary readers.
///
/// A missing reader counts as an already-closed stream. When one reader
/// fails, the other is stopped and the failure is returned with whatever
/// stdout had been collected so far.
pub async fn drain_readers<O, E>(
    stdout: Option<O>,
    stderr: Option<E>,
    sink: Arc<dyn OutputSink>,
) -> Result<OutputBuffer>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    let buffer = Arc::new(Mutex::new(OutputBuffer::new()));

    let mut stdout_task = {
        let sink = Arc::clone(&sink);
        let buffer = Arc::clone(&buffer);
        ReaderTask(tokio::spawn(async move {
            match stdout {
                Some(reader) => {
                    forward_lines(reader, |line| {
                        trace!(stream = %StreamKind::Stdout, "{}", line);
                        sink.stdout_line(&line);
                        lock(&buffer).push(line);
                    })
                    .await
                }
                None => Ok(()),
            }
        }))
    };

    let mut stderr_task = ReaderTask(tokio::spawn(async move {
        match stderr {
            Some(reader) => {
                forward_lines(reader, |line| {
                    trace!(stream = %StreamKind::Stderr, "{}", line);
                    sink.stderr_line(&line);
                })
                .await
            }
            None => Ok(()),
        }
    }));

    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut failure: Option<(StreamKind, io::Error)> = None;

    while (stdout_open || stderr_open) && failure.is_none() {
        tokio::select! {
            res = stdout_task.finished(), if stdout_open => {
                stdout_open = false;
                if let Err(e) = res {
                    failure = Some((StreamKind::Stdout, e));
                }
            }
            res = stderr_task.finished(), if stderr_open => {
                stderr_open = false;
                if let Err(e) = res {
                    failure = Some((StreamKind::Stderr, e));
                }
            }
        }
    }

    // Stops a reader that is still running after the other one failed.
    drop(stdout_task);
    drop(stderr_task);

    let buffer = std::mem::take(&mut *lock(&buffer));
    debug!(lines = buffer.len(), "worker output streams drained");

    match failure {
        Some((stream, source)) => Err(BridgeError::StreamRead {
            stream,
            source,
            partial: buffer,
        }),
        None => Ok(buffer),
    }
}

fn lock(buffer: &Mutex<OutputBuffer>) -> MutexGuard<'_, OutputBuffer> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read `reader` line by line until end-of-input, calling `on_line` for each.
///
/// Lines are decoded as lossy UTF-8 with the trailing `\n` or `\r\n`
/// removed. A final line without a newline is still delivered, and so is a
/// partial line read before an I/O error.
async fn forward_lines<R, F>(reader: R, mut on_line: F) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw).await {
            Ok(0) => return Ok(()),
            Ok(_) => on_line(decode_line(&raw)),
            Err(e) => {
                if !raw.is_empty() {
                    on_line(decode_line(&raw));
                }
                return Err(e);
            }
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Spawned reader that is aborted if the drain is abandoned (e.g. on
/// cancellation or a failure of the other stream), so no reader outlives
/// its run.
struct ReaderTask(JoinHandle<io::Result<()>>);

impl ReaderTask {
    /// Must not be polled again once it has resolved.
    async fn finished(&mut self) -> io::Result<()> {
        (&mut self.0).await.map_err(io::Error::other)?
    }
}

impl Drop for ReaderTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}
