use std::fs;
use std::path::PathBuf;

use sigbridge::config::LaunchConfig;
use tempfile::TempDir;

use crate::builders::LaunchConfigBuilder;

/// A stand-in worker: a POSIX `sh` script in a temporary directory.
///
/// The script receives the same arguments the real capture worker would
/// (`--port COM8 --baud_rate ...`), so it can echo or inspect them.
pub struct FakeWorker {
    dir: TempDir,
    script: PathBuf,
}

impl FakeWorker {
    /// Write `body` as the worker script.
    pub fn new(body: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("worker.sh");
        fs::write(&script, body)?;
        Ok(Self { dir, script })
    }

    /// A worker that prints `lines` to stdout and exits with `code`.
    pub fn printing(lines: &[&str], code: i32) -> anyhow::Result<Self> {
        let mut body = String::new();
        for line in lines {
            body.push_str(&format!("printf '%s\\n' '{}'\n", line.replace('\'', r"'\''")));
        }
        body.push_str(&format!("exit {code}\n"));
        Self::new(&body)
    }

    /// Where a script can record its pid: `echo $$ > "$(dirname "$0")/worker.pid"`.
    pub fn pid_file(&self) -> PathBuf {
        self.dir.path().join("worker.pid")
    }

    /// Pid written to [`pid_file`](Self::pid_file) by the script.
    pub fn read_pid(&self) -> anyhow::Result<u32> {
        Ok(fs::read_to_string(self.pid_file())?.trim().parse()?)
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Builder pre-wired to run this script with `sh`.
    pub fn builder(&self) -> LaunchConfigBuilder {
        LaunchConfigBuilder::new()
            .executable("sh")
            .script(&self.script)
            .save_folder(self.dir.path().join("firmas"))
    }

    pub fn launch_config(&self) -> LaunchConfig {
        self.builder().build()
    }
}
