#[derive(Debug)]
/// Represents errors that can occur while interacting with the BME280 sensor.
pub enum Error<E> {
    /// An error occurred while communicating with the I2C bus.
    I2c(E),
    /// The chip ID register did not identify a BME280. Contains the value read.
    InvalidId(u8),
    /// Attempted to write to a register that is not writable.
    ReadOnly,
    /// The device did not finish copying its calibration data after reset.
    Timeout,
    /// The requested channel is disabled (oversampling set to skip).
    MeasurementSkipped,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}
