// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::StdinMode;

/// Command-line arguments for `sigbridge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sigbridge",
    version,
    about = "Run the signature-pad capture worker and report its result.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sigbridge.toml` in the current working directory, if it
    /// exists; built-in defaults otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Worker executable (e.g. the Python interpreter).
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Worker entry script.
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Serial port of the capture pad (e.g. `COM8`, `/dev/ttyUSB0`).
    #[arg(long)]
    pub port: Option<String>,

    #[arg(long, value_name = "BAUD")]
    pub baud_rate: Option<u32>,

    /// Folder the worker saves captured signatures to.
    #[arg(long, value_name = "PATH")]
    pub save_folder: Option<PathBuf>,

    /// Whether the worker prompts before each capture.
    #[arg(long, value_name = "BOOL")]
    pub interactive: Option<bool>,

    #[arg(long, value_name = "PIXELS")]
    pub default_width: Option<u32>,

    #[arg(long, value_name = "PIXELS")]
    pub default_height: Option<u32>,

    /// What the worker's stdin is connected to: `inherit` or `null`.
    #[arg(long, value_name = "MODE")]
    pub stdin: Option<StdinMode>,

    /// Kill the worker if it runs longer than this (e.g. `90s`, `5m`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SIGBRIDGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the worker command line, but don't run it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
