use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{
    Error, SlaveAddress,
    compensation::{CALIB_H_ADDRESS, CALIB_H_LEN, CALIB_TP_ADDRESS, CALIB_TP_LEN, Calibration},
    register::{
        BME280_RESET_WORD, Bme280Register, ChipId, Config, CtrlHum, CtrlMeas, Filter, Mode,
        Oversampling, RawSample, SKIPPED_H, SKIPPED_TP, Standby, Status,
    },
};

const RESET_REGISTER: u8 = 0xE0;
/// Polls of the status register while the NVM is copied after reset.
const NVM_COPY_POLLS: usize = 10;
const NVM_COPY_POLL_MS: u32 = 2;
/// Wait for the first normal mode conversion after configuration.
const STARTUP_MS: u32 = 100;

/// Represents the BME280 sensor.
pub struct Bme280<I2C, D> {
    pub(crate) i2c: I2C,
    pub(crate) delay: D,
    pub(crate) address: u8,
    pub(crate) calibration: Calibration,
}

#[derive(Debug, Default, Clone, Copy)]
/// Builder for a BME280 sensor.
pub struct Bme280Builder {
    pub(crate) address: SlaveAddress,
    pub(crate) osrs_t: Oversampling,
    pub(crate) osrs_p: Oversampling,
    pub(crate) osrs_h: Oversampling,
    pub(crate) standby: Standby,
    pub(crate) filter: Filter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A compensated measurement of all three channels, taken from a single readout.
pub struct Measurement {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Pressure in pascal.
    pub pressure: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

impl Bme280Builder {
    /// Set the address of the BME280 sensor.
    pub fn with_address(mut self, address: SlaveAddress) -> Self {
        self.address = address;
        self
    }

    /// Set the temperature oversampling.
    pub fn with_temperature_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.osrs_t = oversampling;
        self
    }

    /// Set the pressure oversampling.
    pub fn with_pressure_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.osrs_p = oversampling;
        self
    }

    /// Set the humidity oversampling.
    pub fn with_humidity_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.osrs_h = oversampling;
        self
    }

    /// Set the standby time between conversions in normal mode.
    pub fn with_standby(mut self, standby: Standby) -> Self {
        self.standby = standby;
        self
    }

    /// Set the IIR filter coefficient.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Build the BME280 sensor with the specified configuration.
    ///
    /// The chip ID is checked, the device is reset, the calibration is loaded and
    /// the sensor is started in normal mode.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: T,
        delay: D,
    ) -> Result<Bme280<T, D>, Error<T::Error>> {
        let mut dev = Bme280 {
            i2c,
            delay,
            address: self.address.into_bits(),
            calibration: Calibration::default(),
        };
        // Check if the device is present by reading its ID register
        ChipId::default().read(&mut dev)?;
        dev.soft_reset()?;
        dev.calibration = dev.read_calibration()?;
        // ctrl_hum only takes effect after a write to ctrl_meas
        CtrlHum::new().with_osrs_h(self.osrs_h).write(&mut dev)?;
        // config writes may be ignored in normal mode, so write it while sleeping
        Config::new()
            .with_t_sb(self.standby)
            .with_filter(self.filter)
            .write(&mut dev)?;
        CtrlMeas::new()
            .with_osrs_t(self.osrs_t)
            .with_osrs_p(self.osrs_p)
            .with_mode(Mode::Normal)
            .write(&mut dev)?;
        dev.delay.delay_ms(STARTUP_MS);
        Ok(dev)
    }
}

impl<T: I2c<SevenBitAddress>, D: DelayNs> Bme280<T, D> {
    /// Get the address of the device.
    pub fn get_address(&self) -> u8 {
        self.address
    }

    /// Get the calibration loaded from the device.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Read the current temperature in degrees Celsius.
    pub fn read_temperature(&mut self) -> Result<f32, Error<T::Error>> {
        let raw = self.read_raw()?;
        let (celsius, _) = self.compensate_temperature(&raw)?;
        Ok(celsius as f32)
    }

    /// Read the current pressure in pascal.
    pub fn read_pressure(&mut self) -> Result<f32, Error<T::Error>> {
        let raw = self.read_raw()?;
        let (_, t_fine) = self.compensate_temperature(&raw)?;
        if raw.pressure == SKIPPED_TP {
            return Err(Error::MeasurementSkipped);
        }
        Ok(self.calibration.pressure(raw.pressure, t_fine) as f32)
    }

    /// Read the current relative humidity in percent.
    pub fn read_humidity(&mut self) -> Result<f32, Error<T::Error>> {
        let raw = self.read_raw()?;
        let (_, t_fine) = self.compensate_temperature(&raw)?;
        if raw.humidity == SKIPPED_H {
            return Err(Error::MeasurementSkipped);
        }
        Ok(self.calibration.humidity(raw.humidity, t_fine) as f32)
    }

    /// Read temperature, pressure and humidity from the same conversion.
    pub fn measure(&mut self) -> Result<Measurement, Error<T::Error>> {
        let raw = self.read_raw()?;
        let (celsius, t_fine) = self.compensate_temperature(&raw)?;
        if raw.pressure == SKIPPED_TP || raw.humidity == SKIPPED_H {
            return Err(Error::MeasurementSkipped);
        }
        Ok(Measurement {
            temperature: celsius as f32,
            pressure: self.calibration.pressure(raw.pressure, t_fine) as f32,
            humidity: self.calibration.humidity(raw.humidity, t_fine) as f32,
        })
    }

    /// Perform a soft reset and wait for the calibration data to be copied from NVM.
    pub fn soft_reset(&mut self) -> Result<(), Error<T::Error>> {
        self.i2c
            .write(self.address, &[RESET_REGISTER, BME280_RESET_WORD])?;
        let mut status = Status::default();
        for _ in 0..NVM_COPY_POLLS {
            self.delay.delay_ms(NVM_COPY_POLL_MS);
            status.read(self)?;
            if !status.im_update() {
                return Ok(());
            }
        }
        Err(Error::Timeout)
    }

    /// Release the bus and delay provider.
    pub fn release(self) -> (T, D) {
        (self.i2c, self.delay)
    }

    fn read_raw(&mut self) -> Result<RawSample, Error<T::Error>> {
        let mut raw = RawSample::default();
        raw.read(self)?;
        Ok(raw)
    }

    fn read_calibration(&mut self) -> Result<Calibration, Error<T::Error>> {
        let mut tp = [0u8; CALIB_TP_LEN];
        self.i2c
            .write_read(self.address, &[CALIB_TP_ADDRESS], &mut tp)?;
        let mut h = [0u8; CALIB_H_LEN];
        self.i2c
            .write_read(self.address, &[CALIB_H_ADDRESS], &mut h)?;
        Ok(Calibration::from_registers(&tp, &h))
    }

    /// Every channel is compensated against the fine temperature.
    fn compensate_temperature(&self, raw: &RawSample) -> Result<(f64, i32), Error<T::Error>> {
        if raw.temperature == SKIPPED_TP {
            return Err(Error::MeasurementSkipped);
        }
        Ok(self.calibration.temperature(raw.temperature))
    }
}
