//! The two sensors of the weather board, as seen by the poll loop.
use std::fmt::Debug;

use bme280::Bme280;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use si1132::Si1132;

/// UV, visible and infrared light.
pub trait LightSensor {
    type Error: Debug;

    /// UV index times 100, as reported by the sensor.
    fn uv_raw(&mut self) -> Result<f32, Self::Error>;
    /// Visible light in lux.
    fn visible_lux(&mut self) -> Result<f32, Self::Error>;
    /// Infrared light in lux.
    fn infrared_lux(&mut self) -> Result<f32, Self::Error>;
}

/// Temperature, humidity and barometric pressure.
pub trait ClimateSensor {
    type Error: Debug;

    /// Temperature in degrees Celsius.
    fn temperature(&mut self) -> Result<f32, Self::Error>;
    /// Relative humidity in percent.
    fn humidity(&mut self) -> Result<f32, Self::Error>;
    /// Pressure in pascal.
    fn pressure(&mut self) -> Result<f32, Self::Error>;
}

impl<T: I2c<SevenBitAddress>, D: DelayNs> LightSensor for Si1132<T, D> {
    type Error = si1132::Error<T::Error>;

    fn uv_raw(&mut self) -> Result<f32, Self::Error> {
        self.read_uv().map(|uv| uv.raw() as f32)
    }

    fn visible_lux(&mut self) -> Result<f32, Self::Error> {
        self.read_visible().map(|v| v.lux())
    }

    fn infrared_lux(&mut self) -> Result<f32, Self::Error> {
        self.read_infrared().map(|ir| ir.lux())
    }
}

impl<T: I2c<SevenBitAddress>, D: DelayNs> ClimateSensor for Bme280<T, D> {
    type Error = bme280::Error<T::Error>;

    fn temperature(&mut self) -> Result<f32, Self::Error> {
        self.read_temperature()
    }

    fn humidity(&mut self) -> Result<f32, Self::Error> {
        self.read_humidity()
    }

    fn pressure(&mut self) -> Result<f32, Self::Error> {
        self.read_pressure()
    }
}
