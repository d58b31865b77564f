#![allow(dead_code)]

use std::path::PathBuf;

use sigbridge::config::LaunchConfig;

/// Builder for `LaunchConfig`, starting from the stock pad setup.
pub struct LaunchConfigBuilder {
    config: LaunchConfig,
}

impl LaunchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: LaunchConfig::default(),
        }
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.executable = path.into();
        self
    }

    pub fn script(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.script = path.into();
        self
    }

    pub fn port(mut self, port: &str) -> Self {
        self.config.port = port.to_string();
        self
    }

    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.config.baud_rate = baud;
        self
    }

    pub fn save_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.save_folder = path.into();
        self
    }

    pub fn interactive(mut self, val: bool) -> Self {
        self.config.interactive = val;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.config.default_width = width;
        self.config.default_height = height;
        self
    }

    pub fn build(self) -> LaunchConfig {
        self.config
    }
}

impl Default for LaunchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
