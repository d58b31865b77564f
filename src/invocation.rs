// src/invocation.rs

//! Turning a [`LaunchConfig`] into the worker's command line.
//!
//! The worker's argument parser expects exactly this order:
//!
//! ```text
//! <executable> <script>
//! --port <port>
//! --baud_rate <baud_rate>
//! --save_folder <save_folder>
//! --interactive <true|false>
//! --default_width <width>
//! --default_height <height>
//! ```

use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::config::LaunchConfig;

/// Ordered argument vector for one worker run, program first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    argv: Vec<OsString>,
}

impl Invocation {
    /// The executable to start.
    pub fn program(&self) -> &OsStr {
        &self.argv[0]
    }

    /// Arguments after the executable (script first).
    pub fn args(&self) -> &[OsString] {
        &self.argv[1..]
    }

    /// Full argument vector including the executable.
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Build the invocation for `config`.
///
/// Pure: values are rendered as-is, nothing is checked. A bad port or path
/// is the worker's to report.
pub fn build_invocation(config: &LaunchConfig) -> Invocation {
    let mut argv: Vec<OsString> = Vec::with_capacity(14);
    argv.push(config.executable.clone().into_os_string());
    argv.push(config.script.clone().into_os_string());

    push_flag(&mut argv, "--port", config.port.as_str());
    push_flag(&mut argv, "--baud_rate", config.baud_rate.to_string());
    push_flag(&mut argv, "--save_folder", config.save_folder.as_os_str());
    push_flag(&mut argv, "--interactive", config.interactive.to_string());
    push_flag(&mut argv, "--default_width", config.default_width.to_string());
    push_flag(&mut argv, "--default_height", config.default_height.to_string());

    Invocation { argv }
}

fn push_flag(argv: &mut Vec<OsString>, flag: &str, value: impl AsRef<OsStr>) {
    argv.push(OsString::from(flag));
    argv.push(value.as_ref().to_os_string());
}
