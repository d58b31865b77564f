// src/config/mod.rs

//! Configuration loading and validation for sigbridge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Parse duration strings such as `"90s"` (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    CaptureSection, ConfigFile, LaunchConfig, ProcessOptions, RawConfigFile, RunOptions,
    RunSection, WorkerSection,
};
pub use validate::validate_config;
