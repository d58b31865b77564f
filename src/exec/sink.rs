// src/exec/sink.rs

//! Where mirrored worker output goes.

/// Receives worker output lines as they arrive.
///
/// Stdout lines are delivered in the order the worker wrote them, and so are
/// stderr lines. There is no ordering between the two streams. Implementations
/// are called from the reader tasks, so they must be cheap and must not block
/// for long.
pub trait OutputSink: Send + Sync {
    fn stdout_line(&self, line: &str);
    fn stderr_line(&self, line: &str);
}

/// Mirrors worker stdout to our stdout and worker stderr to our stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn stdout_line(&self, line: &str) {
        println!("{line}");
    }

    fn stderr_line(&self, line: &str) {
        eprintln!("worker stderr: {line}");
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn stdout_line(&self, _line: &str) {}

    fn stderr_line(&self, _line: &str) {}
}
