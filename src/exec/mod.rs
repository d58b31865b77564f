// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the worker, using
//! `tokio::process::Command`, and observing its output while it runs.
//!
//! - [`process`] spawns, waits on and terminates the worker.
//! - [`drain`] reads stdout and stderr concurrently until end-of-input.
//! - [`sink`] defines where mirrored output lines go.
//! - [`cancel`] provides explicit cancellation and the timeout safety net.

pub mod cancel;
pub mod drain;
pub mod process;
pub mod sink;

pub use cancel::{cancel_pair, CancelHandle, CancelReason, CancelSignal};
pub use drain::{drain_readers, drain_streams};
pub use process::{launch, ProcessHandle};
pub use sink::{ConsoleSink, NullSink, OutputSink};
