//! # Sunrise Control Library
//!
//! `sunrise-control-lib` wakes you up with a simulated sunrise. It fades a networked light
//! through configured ramps of hue, saturation, brightness and colour temperature over a
//! wake-up window.
//!
//! ## Features
//!
//! - Piecewise-linear colour transitions evaluated at any offset into the wake-up
//! - A control loop that finds the light, brings it to a baseline colour and then
//!   updates it at a fixed cadence
//! - A LIFX LAN client with broadcast discovery and acknowledged commands
//! - A daily trigger in a configurable time zone
//!
//! ## Example
//!
//! Running a single wake-up from a configuration file:
//!
//! ```no_run
//! use sunrise_control_lib::config::WakeupConfig;
//! use sunrise_control_lib::control_interface::LifxClient;
//! use sunrise_control_lib::wakeup::run_wakeup;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WakeupConfig::load("config.yaml")?;
//!     let client = LifxClient::connect().await?;
//!     run_wakeup(&client, &config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## License
//!
//! This project is dual-licensed under the MIT License and the Apache License, Version 2.0.
//! You may choose to use either license, depending on your project needs.

// Loading and validating the wake-up configuration file.
pub mod config;

// The LIFX LAN implementation of the device contract the engine drives.
pub mod control_interface;

pub mod error;

// Colours and the transitions that interpolate between them.
//
// ```
// use sunrise_control_lib::light::transition::{compute_color, Channel, Transition};
//
// let ramp = Transition::new(0, 3600, 0.0, 1.0, Channel::Brightness);
// assert_eq!(compute_color(1800, &[ramp]).brightness, 32767);
// ```
pub mod light;

// Running the wake-up once a day.
pub mod schedule;

// Device discovery and the `LightClient` trait.
pub mod util;

// The wake-up control loop and its acquisition and initialization steps.
pub mod wakeup;
