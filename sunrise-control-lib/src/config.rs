use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::light::color::Color;
use crate::light::transition::{compute_color, Transition};

/// Everything a single wake-up run needs, as read from the configuration file.
///
/// `lightid` is the decimal light id printed by `sunrise_control discover`.
///
/// ```yaml
/// duration: 1800
/// lightid: 1099511627776
/// updateinterval: 10
/// initialcolor:
///   hue: 0
///   saturation: 65535
///   brightness: 0
///   kelvin: 2500
/// transitions:
///   - starttime: 0
///     endtime: 1800
///     startvalue: 0.0
///     endvalue: 1.0
///     type: brightness
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WakeupConfig {
    /// Total length of the wake-up in seconds.
    #[serde(alias = "Duration")]
    pub duration: u64,
    /// Protocol identifier of the light to drive.
    #[serde(rename = "lightid", alias = "LightID", alias = "LightId")]
    pub light_id: u64,
    /// Seconds between two colour updates.
    #[serde(rename = "updateinterval", alias = "UpdateInterval")]
    pub update_interval: u64,
    #[serde(default, alias = "Transitions")]
    pub transitions: Vec<Transition>,
    /// Baseline the light is set to before it is switched on.
    #[serde(rename = "initialcolor", alias = "Initialcolor", alias = "InitialColor", default)]
    pub initial_color: Color,
}

impl WakeupConfig {
    /// Reads and validates the configuration at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WakeupConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the control loop cannot run with and warns about suspicious ones.
    ///
    /// Transitions sharing a channel are accepted. Only the last of them has any effect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval == 0 {
            return Err(ConfigError::Invalid(
                "updateinterval must be at least one second".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, transition) in self.transitions.iter().enumerate() {
            if transition.start_time > transition.end_time {
                warn!(
                    "Transition {} ({}) ends at {}s before it starts at {}s",
                    index, transition.channel, transition.end_time, transition.start_time
                );
            }
            if !seen.insert(transition.channel) {
                warn!(
                    "Transition {} overrides an earlier {} transition, only the last one is used",
                    index, transition.channel
                );
            }
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    /// The colour the light should show `offset` seconds into the wake-up.
    pub fn color_at(&self, offset: u64) -> Color {
        compute_color(offset, &self.transitions)
    }
}
