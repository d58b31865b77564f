// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::BridgeError;
use crate::types::StdinMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [worker]
/// executable = "python"
/// script = "capture_wrapper.py"
///
/// [capture]
/// port = "COM8"
/// baud_rate = 115200
/// save_folder = "firmas"
/// interactive = true
/// default_width = 100
/// default_height = 100
///
/// [run]
/// timeout = "90s"
/// ```
///
/// All sections are optional and default to the stock pad setup above
/// (without a timeout).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub worker: WorkerSection,

    #[serde(default)]
    pub capture: CaptureSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[worker]` section: how to start the worker process.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// Working directory for the child; inherits ours when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables for the child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub stdin: StdinMode,
}

fn default_executable() -> PathBuf {
    PathBuf::from("python")
}

fn default_script() -> PathBuf {
    PathBuf::from("capture_wrapper.py")
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            script: default_script(),
            working_dir: None,
            env: BTreeMap::new(),
            stdin: StdinMode::default(),
        }
    }
}

/// `[capture]` section: values handed to the worker on its command line.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureSection {
    #[serde(default = "default_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_save_folder")]
    pub save_folder: PathBuf,

    #[serde(default = "default_interactive")]
    pub interactive: bool,

    #[serde(default = "default_dimension")]
    pub default_width: u32,

    #[serde(default = "default_dimension")]
    pub default_height: u32,
}

fn default_port() -> String {
    "COM8".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_save_folder() -> PathBuf {
    PathBuf::from("firmas")
}

fn default_interactive() -> bool {
    true
}

fn default_dimension() -> u32 {
    100
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            save_folder: default_save_folder(),
            interactive: default_interactive(),
            default_width: default_dimension(),
            default_height: default_dimension(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunSection {
    /// Duration string such as `"90s"` or `"2m"`. No timeout when unset.
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Everything needed to produce one worker invocation.
///
/// Built once and only ever shared by reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub executable: PathBuf,
    pub script: PathBuf,
    pub port: String,
    pub baud_rate: u32,
    pub save_folder: PathBuf,
    pub interactive: bool,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        let worker = WorkerSection::default();
        let capture = CaptureSection::default();
        LaunchConfig::from_sections(&worker, &capture)
    }
}

impl LaunchConfig {
    fn from_sections(worker: &WorkerSection, capture: &CaptureSection) -> Self {
        Self {
            executable: worker.executable.clone(),
            script: worker.script.clone(),
            port: capture.port.clone(),
            baud_rate: capture.baud_rate,
            save_folder: capture.save_folder.clone(),
            interactive: capture.interactive,
            default_width: capture.default_width,
            default_height: capture.default_height,
        }
    }
}

/// Process-level settings that do not appear on the worker's command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub stdin: StdinMode,
}

/// Run-level settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Kill the worker and fail with `Cancelled` once this elapses.
    pub timeout: Option<Duration>,
}

/// Validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub launch: LaunchConfig,
    pub process: ProcessOptions,
    pub run: RunOptions,
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BridgeError;

    fn try_from(raw: RawConfigFile) -> Result<Self, Self::Error> {
        crate::config::validate::validate_config(&raw)?;

        let timeout = raw
            .run
            .timeout
            .as_deref()
            .map(crate::config::duration::parse_timeout)
            .transpose()
            .map_err(|e| BridgeError::ConfigError(format!("[run].timeout: {e}")))?;

        Ok(ConfigFile {
            launch: LaunchConfig::from_sections(&raw.worker, &raw.capture),
            process: ProcessOptions {
                working_dir: raw.worker.working_dir,
                env: raw.worker.env,
                stdin: raw.worker.stdin,
            },
            run: RunOptions { timeout },
        })
    }
}
