// src/config/validate.rs

use crate::config::model::RawConfigFile;
use crate::errors::{BridgeError, Result};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[worker].executable` and `[worker].script` are non-empty
/// - `[capture].port` is non-empty
///
/// `[run].timeout` is checked when it is parsed in `ConfigFile::try_from`.
///
/// It does **not** check that the port exists, that the executable is on
/// `PATH`, or that the capture dimensions make sense. The worker reports
/// those itself.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_worker(cfg)?;
    validate_capture(cfg)?;
    Ok(())
}

fn validate_worker(cfg: &RawConfigFile) -> Result<()> {
    if cfg.worker.executable.as_os_str().is_empty() {
        return Err(BridgeError::ConfigError(
            "[worker].executable must not be empty".to_string(),
        ));
    }
    if cfg.worker.script.as_os_str().is_empty() {
        return Err(BridgeError::ConfigError(
            "[worker].script must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_capture(cfg: &RawConfigFile) -> Result<()> {
    if cfg.capture.port.trim().is_empty() {
        return Err(BridgeError::ConfigError(
            "[capture].port must not be empty".to_string(),
        ));
    }
    Ok(())
}
