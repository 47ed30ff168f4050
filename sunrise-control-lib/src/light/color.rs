use serde::{Deserialize, Serialize};

/// Absolute state of a light, one unsigned 16-bit scalar per channel.
///
/// Hue, saturation and brightness span the full `0..=65535` range. Kelvin is the
/// colour temperature in degrees as the device understands it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct Color {
    #[serde(alias = "Hue")]
    pub hue: u16,
    #[serde(alias = "Saturation")]
    pub saturation: u16,
    #[serde(alias = "Brightness")]
    pub brightness: u16,
    #[serde(alias = "Kelvin")]
    pub kelvin: u16,
}

impl Color {
    pub const fn new(hue: u16, saturation: u16, brightness: u16, kelvin: u16) -> Self {
        Color {
            hue,
            saturation,
            brightness,
            kelvin,
        }
    }
}

impl From<Color> for lifx_core::HSBK {
    fn from(color: Color) -> Self {
        lifx_core::HSBK {
            hue: color.hue,
            saturation: color.saturation,
            brightness: color.brightness,
            kelvin: color.kelvin,
        }
    }
}
