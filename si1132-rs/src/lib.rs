#![no_std]
#![deny(missing_docs)]
//!# Si1132 - Driver for the Silicon Labs Si1132 UV Index and Ambient Light Sensor
//! This crate provides a driver for the Si1132 sensor, allowing you to read the UV index,
//! visible and infrared ambient light.
//! The sensor is put in autonomous ALS mode on build, so readings are always the latest sample.
mod core;
mod error;
mod register;

pub use crate::core::{SI1132_ADDRESS, Si1132, Si1132Builder};
pub use error::Error;
pub use register::{Infrared, Range, UvIndex, Visible};
