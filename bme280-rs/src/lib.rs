#![no_std]
#![deny(missing_docs)]
//!# BME280 - Driver for the Bosch BME280 Combined Humidity, Pressure and Temperature Sensor
//! This crate provides a driver for the BME280 sensor over I2C.
//! The sensor runs in normal mode with the configured oversampling, standby time and IIR filter,
//! and readings are compensated with the factory calibration stored in the device.
mod address;
mod compensation;
mod core;
mod error;
mod register;

pub use address::SlaveAddress;
pub use compensation::Calibration;
pub use crate::core::{Bme280, Bme280Builder, Measurement};
pub use error::Error;
pub use register::{Filter, Oversampling, Standby};
