// src/errors.rs

//! Crate-wide error type and helpers.

use std::fmt;

use thiserror::Error;

use crate::exec::cancel::CancelReason;
use crate::types::{OutputBuffer, StreamKind};

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The worker process could not be created.
    #[error("failed to launch worker '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading one of the worker's output streams failed mid-run.
    ///
    /// `partial` holds whatever stdout lines had been collected before the
    /// failure.
    #[error("failed reading worker {stream}: {source}")]
    StreamRead {
        stream: StreamKind,
        #[source]
        source: std::io::Error,
        partial: OutputBuffer,
    },

    #[error("failed waiting for worker process: {0}")]
    ProcessWait(#[source] std::io::Error),

    #[error("worker produced no result line")]
    EmptyOutput,

    #[error("malformed result line {line:?}: {reason}")]
    MalformedResult { line: String, reason: String },

    #[error("worker run cancelled ({0})")]
    Cancelled(CancelReason),
}

/// Coarse classification of a [`BridgeError`], suitable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Launch,
    StreamRead,
    ProcessWait,
    EmptyOutput,
    MalformedResult,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config => "config",
            ErrorKind::Launch => "launch",
            ErrorKind::StreamRead => "stream-read",
            ErrorKind::ProcessWait => "process-wait",
            ErrorKind::EmptyOutput => "empty-output",
            ErrorKind::MalformedResult => "malformed-result",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::ConfigError(_) | BridgeError::IoError(_) | BridgeError::TomlError(_) => {
                ErrorKind::Config
            }
            BridgeError::Launch { .. } => ErrorKind::Launch,
            BridgeError::StreamRead { .. } => ErrorKind::StreamRead,
            BridgeError::ProcessWait(_) => ErrorKind::ProcessWait,
            BridgeError::EmptyOutput => ErrorKind::EmptyOutput,
            BridgeError::MalformedResult { .. } => ErrorKind::MalformedResult,
            BridgeError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Stdout lines gathered before a stream read failure, if any.
    ///
    /// Callers that want to salvage a result can feed this to
    /// [`crate::result::parse_result`].
    pub fn partial_output(&self) -> Option<&OutputBuffer> {
        match self {
            BridgeError::StreamRead { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
