use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which of the worker's output streams a line or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// What the worker's standard input is connected to.
///
/// - `Inherit`: the worker shares our terminal, so an interactive capture
///   prompt can be answered by the user (default).
/// - `Null`: the worker sees end-of-input immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdinMode {
    Inherit,
    Null,
}

impl Default for StdinMode {
    fn default() -> Self {
        StdinMode::Inherit
    }
}

impl FromStr for StdinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inherit" => Ok(StdinMode::Inherit),
            "null" => Ok(StdinMode::Null),
            other => Err(format!(
                "invalid stdin mode: {other} (expected \"inherit\" or \"null\")"
            )),
        }
    }
}

/// Standard-output lines captured from one worker run, in emission order.
///
/// Append-only; the orchestrator owns it for the duration of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    lines: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for OutputBuffer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}
