//! Error types for a wake-up run.
//!
//! Every variant is fatal to the run that produced it. The only failure the engine
//! retries internally is a light that has not been discovered yet, and that retrying
//! happens inside device acquisition.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that end a wake-up run.
#[derive(Debug, Error)]
pub enum WakeupError {
    /// The configuration could not be loaded. No device was contacted.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The light did not show up within the acquisition window.
    #[error("light {light_id:#x} not found within {timeout:?}")]
    AcquisitionTimeout { light_id: u64, timeout: Duration },

    /// Looking up the light failed for a reason other than "not found yet".
    #[error("unexpected protocol error while looking up light {light_id:#x}")]
    UnexpectedProtocol {
        light_id: u64,
        #[source]
        source: anyhow::Error,
    },

    /// A colour or power command was not carried out by the light.
    #[error("device command `{command}` failed")]
    DeviceCommandFailed {
        command: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Errors raised while reading the wake-up configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
