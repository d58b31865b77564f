use std::sync::{Arc, Mutex};

use sigbridge::exec::OutputSink;

/// A sink that records every forwarded line, per stream.
#[derive(Clone, Default)]
pub struct RecordingSink {
    stdout: Arc<Mutex<Vec<String>>>,
    stderr: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout.lock().unwrap().clone()
    }

    pub fn stderr_lines(&self) -> Vec<String> {
        self.stderr.lock().unwrap().clone()
    }
}

impl OutputSink for RecordingSink {
    fn stdout_line(&self, line: &str) {
        self.stdout.lock().unwrap().push(line.to_string());
    }

    fn stderr_line(&self, line: &str) {
        self.stderr.lock().unwrap().push(line.to_string());
    }
}
