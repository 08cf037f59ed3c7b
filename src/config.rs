// src/config.rs

use serde::Deserialize;

use crate::constants::USAGE_EXIT_CODE;
use crate::error::ConfigError;

/// When help and error output may use ANSI colors.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for clap::ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => clap::ColorChoice::Auto,
            ColorMode::Always => clap::ColorChoice::Always,
            ColorMode::Never => clap::ColorChoice::Never,
        }
    }
}

/// Settings applied to a dispatch run.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Program name shown in usage lines. Taken from `argv[0]` when unset.
    pub prog: Option<String>,
    /// Enables `--version` on the root when set.
    pub version: Option<String>,
    /// Exit status after printing the help of a namespace reached without a sub-command.
    pub usage_exit_code: i32,
    pub color: ColorMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prog: None,
            version: None,
            usage_exit_code: USAGE_EXIT_CODE,
            color: ColorMode::Auto,
        }
    }
}

impl Settings {
    /// Reads settings from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        log::debug!("Settings loaded: {:?}", settings);
        Ok(settings)
    }

    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = Some(prog.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }
}
