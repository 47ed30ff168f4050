use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::light::color::Color;

/// Full scale of a normalized (non-kelvin) channel.
const CHANNEL_SCALE: f64 = 65535.0;

/// The light channel a [`Transition`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Hue,
    Saturation,
    Brightness,
    Kelvin,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Hue => "hue",
            Channel::Saturation => "saturation",
            Channel::Brightness => "brightness",
            Channel::Kelvin => "kelvin",
        };
        write!(f, "{}", name)
    }
}

/// A linear ramp of one channel over `[start_time, end_time]` seconds of the wake-up.
///
/// Values are normalized to `0.0..=1.0`, except for [`Channel::Kelvin`] where they are
/// absolute colour temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Transition {
    #[serde(rename = "starttime", alias = "Starttime")]
    pub start_time: u64,
    #[serde(rename = "endtime", alias = "Endtime")]
    pub end_time: u64,
    #[serde(rename = "startvalue", alias = "Startvalue")]
    pub start_value: f64,
    #[serde(rename = "endvalue", alias = "Endvalue")]
    pub end_value: f64,
    #[serde(rename = "type", alias = "Type")]
    pub channel: Channel,
}

impl Transition {
    pub fn new(
        start_time: u64,
        end_time: u64,
        start_value: f64,
        end_value: f64,
        channel: Channel,
    ) -> Self {
        Transition {
            start_time,
            end_time,
            start_value,
            end_value,
            channel,
        }
    }

    /// Unscaled value of this transition at `offset` seconds.
    ///
    /// The value is held at `start_value` before the ramp and at `end_value` after it.
    /// A zero-length ramp is a step at `start_time`.
    pub fn value_at(&self, offset: u64) -> f64 {
        if offset < self.start_time {
            self.start_value
        } else if self.end_time < offset || self.end_time == self.start_time {
            self.end_value
        } else {
            let scale =
                (offset - self.start_time) as f64 / (self.end_time - self.start_time) as f64;
            self.start_value + scale * (self.end_value - self.start_value)
        }
    }

    /// Device value of this transition at `offset` seconds.
    pub fn channel_value_at(&self, offset: u64) -> u16 {
        let value = self.value_at(offset);
        // `as` truncates toward zero and saturates at the u16 bounds
        match self.channel {
            Channel::Kelvin => value as u16,
            _ => (value * CHANNEL_SCALE) as u16,
        }
    }
}

/// Computes the colour the light should show `offset` seconds into the wake-up.
///
/// Transitions are evaluated in order and folded per channel, so when several transitions
/// target the same channel the last one wins at every offset. Channels without any
/// transition come out as 0.
pub fn compute_color(offset: u64, transitions: &[Transition]) -> Color {
    let mut values: HashMap<Channel, u16> = HashMap::new();
    for transition in transitions {
        values.insert(transition.channel, transition.channel_value_at(offset));
    }

    let channel = |channel: Channel| values.get(&channel).copied().unwrap_or(0);
    Color {
        hue: channel(Channel::Hue),
        saturation: channel(Channel::Saturation),
        brightness: channel(Channel::Brightness),
        kelvin: channel(Channel::Kelvin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness_ramp() -> Transition {
        Transition::new(0, 3600, 0.0, 1.0, Channel::Brightness)
    }

    #[test]
    fn test_halfway_brightness() {
        let color = compute_color(1800, &[brightness_ramp()]);
        assert_eq!(color.brightness, 32767);
    }

    #[test]
    fn test_kelvin_is_not_scaled() {
        let transitions = [Transition::new(0, 3600, 2000.0, 6000.0, Channel::Kelvin)];
        assert_eq!(compute_color(0, &transitions).kelvin, 2000);
        assert_eq!(compute_color(1800, &transitions).kelvin, 4000);
        assert_eq!(compute_color(3600, &transitions).kelvin, 6000);
    }

    #[test]
    fn test_held_before_start_and_after_end() {
        let transitions = [
            Transition::new(600, 1200, 0.25, 0.75, Channel::Saturation),
            Transition::new(600, 1200, 2500.0, 4000.0, Channel::Kelvin),
        ];
        for offset in [0, 1, 300, 599] {
            let color = compute_color(offset, &transitions);
            assert_eq!(color.saturation, (0.25 * CHANNEL_SCALE) as u16);
            assert_eq!(color.kelvin, 2500);
        }
        for offset in [1201, 5000, u64::MAX] {
            let color = compute_color(offset, &transitions);
            assert_eq!(color.saturation, (0.75 * CHANNEL_SCALE) as u16);
            assert_eq!(color.kelvin, 4000);
        }
    }

    #[test]
    fn test_continuity_at_boundaries() {
        let transition = Transition::new(100, 200, 0.25, 0.75, Channel::Hue);
        assert_eq!(transition.value_at(100), 0.25);
        assert_eq!(transition.value_at(200), 0.75);
        assert_eq!(transition.value_at(99), transition.value_at(100));
        assert_eq!(transition.value_at(201), transition.value_at(200));
    }

    #[test]
    fn test_monotonic_increasing() {
        let transitions = [brightness_ramp()];
        let mut previous = 0;
        for offset in (0..=4000).step_by(7) {
            let brightness = compute_color(offset, &transitions).brightness;
            assert!(brightness >= previous, "dropped at offset {}", offset);
            previous = brightness;
        }
        assert_eq!(previous, u16::MAX);
    }

    #[test]
    fn test_anti_monotonic_decreasing() {
        let transitions = [Transition::new(0, 1000, 6500.0, 2000.0, Channel::Kelvin)];
        let mut previous = u16::MAX;
        for offset in 0..=1100 {
            let kelvin = compute_color(offset, &transitions).kelvin;
            assert!(kelvin <= previous, "rose at offset {}", offset);
            previous = kelvin;
        }
        assert_eq!(previous, 2000);
    }

    #[test]
    fn test_last_transition_for_channel_wins() {
        let transitions = [
            Transition::new(0, 100, 0.0, 1.0, Channel::Brightness),
            Transition::new(1000, 2000, 0.5, 0.5, Channel::Brightness),
        ];
        let half = (0.5 * CHANNEL_SCALE) as u16;
        for offset in [0, 50, 100, 1500, 3000] {
            assert_eq!(compute_color(offset, &transitions).brightness, half);
        }
    }

    #[test]
    fn test_unmapped_channels_are_zero() {
        let color = compute_color(1800, &[brightness_ramp()]);
        assert_eq!(color.hue, 0);
        assert_eq!(color.saturation, 0);
        assert_eq!(color.kelvin, 0);
        assert_eq!(compute_color(10, &[]), Color::default());
    }

    #[test]
    fn test_zero_length_transition_is_a_step() {
        let transition = Transition::new(60, 60, 0.0, 1.0, Channel::Brightness);
        assert_eq!(transition.channel_value_at(59), 0);
        assert_eq!(transition.channel_value_at(60), u16::MAX);
        assert_eq!(transition.channel_value_at(61), u16::MAX);
    }

    #[test]
    fn test_out_of_range_values_saturate() {
        let transitions = [
            Transition::new(0, 10, -0.5, -0.5, Channel::Hue),
            Transition::new(0, 10, 2.0, 2.0, Channel::Saturation),
        ];
        let color = compute_color(5, &transitions);
        assert_eq!(color.hue, 0);
        assert_eq!(color.saturation, u16::MAX);
    }

    #[test]
    fn test_deserialize_transition() {
        let yaml = "starttime: 0\nendtime: 1800\nstartvalue: 0.1\nendvalue: 0.9\ntype: saturation";
        let transition: Transition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            transition,
            Transition::new(0, 1800, 0.1, 0.9, Channel::Saturation)
        );
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let yaml = "starttime: 0\nendtime: 1\nstartvalue: 0\nendvalue: 1\ntype: red";
        assert!(serde_yaml::from_str::<Transition>(yaml).is_err());
    }
}
