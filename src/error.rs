// src/error.rs

use thiserror::Error;

/// Mistakes in how a command tree is declared. Raised while registering, never during dispatch.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Raw command '{0}' cannot hold sub-commands.")]
    RawChildren(String),
    #[error("Command has no name: register a named function or add `command_name(..)`.")]
    Unnamed,
}

/// Failures of a single dispatch run.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Malformed input: unknown flags, bad values, unknown sub-commands.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// The resolved action itself failed.
    #[error("Command '{command}' failed.")]
    Action {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Whether the failure came from the user's input rather than from the action.
    pub fn is_usage(&self) -> bool {
        matches!(self, DispatchError::Usage(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed settings: {0}")]
    Toml(#[from] toml::de::Error),
}
