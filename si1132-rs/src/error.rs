#[derive(Debug)]
/// Represents errors that can occur while interacting with the Si1132 sensor.
pub enum Error<E> {
    /// An error occurred while communicating with the I2C bus.
    I2c(E),
    /// The part ID register did not identify an Si1132. Contains the value read.
    InvalidId(u8),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}
