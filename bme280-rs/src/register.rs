use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{Error, core::Bme280};

pub(crate) const BME280_CHIP_ID: u8 = 0x60;
pub(crate) const BME280_RESET_WORD: u8 = 0xB6;
/// Raw readout of a temperature or pressure channel that is not being measured.
pub(crate) const SKIPPED_TP: u32 = 0x80000;
/// Raw readout of the humidity channel when it is not being measured.
pub(crate) const SKIPPED_H: u32 = 0x8000;

pub(crate) trait Bme280Register: Default {
    const ADDRESS: u8;
    const REGISTER_LEN: usize;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Bme280<T, D>,
    ) -> Result<(), Error<T::Error>>;
    fn write<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        _dev: &mut Bme280<T, D>,
    ) -> Result<(), Error<T::Error>> {
        Err(Error::ReadOnly)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ChipId(u8);

impl Bme280Register for ChipId {
    const ADDRESS: u8 = 0xD0;
    const REGISTER_LEN: usize = 1;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Bme280<T, D>,
    ) -> Result<(), Error<T::Error>> {
        let mut buffer = [0u8; Self::REGISTER_LEN];
        dev.i2c
            .write_read(dev.address, &[Self::ADDRESS], &mut buffer)?;
        self.0 = buffer[0];
        if self.0 != BME280_CHIP_ID {
            return Err(Error::InvalidId(self.0));
        }
        Ok(())
    }
}

#[bitfield(u8)]
pub(crate) struct Status {
    /// NVM data is being copied to the image registers.
    #[bits(1, access = RO)]
    pub im_update: bool,
    #[bits(2, default = 0, access = RO)]
    rsvd: u8,
    /// A conversion is running.
    #[bits(1, access = RO)]
    pub measuring: bool,
    #[bits(4, default = 0, access = RO)]
    rsvd2: u8,
}

#[bitfield(u8)]
pub(crate) struct CtrlHum {
    #[bits(3, default = Oversampling::X1)]
    pub osrs_h: Oversampling,
    #[bits(5, default = 0, access = RO)]
    rsvd: u8,
}

#[bitfield(u8)]
pub(crate) struct CtrlMeas {
    #[bits(2, default = Mode::Sleep)]
    pub mode: Mode,
    #[bits(3, default = Oversampling::X1)]
    pub osrs_p: Oversampling,
    #[bits(3, default = Oversampling::X1)]
    pub osrs_t: Oversampling,
}

#[bitfield(u8)]
pub(crate) struct Config {
    #[bits(1, default = false)]
    pub spi3w_en: bool,
    #[bits(1, default = 0, access = RO)]
    rsvd: u8,
    #[bits(3, default = Filter::Off)]
    pub filter: Filter,
    #[bits(3, default = Standby::Ms250)]
    pub t_sb: Standby,
}

macro_rules! control_register {
    ($ty:ident, $addr:expr) => {
        impl Bme280Register for $ty {
            const ADDRESS: u8 = $addr;
            const REGISTER_LEN: usize = 1;

            fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
                &mut self,
                dev: &mut Bme280<T, D>,
            ) -> Result<(), Error<T::Error>> {
                let mut buffer = [0u8; Self::REGISTER_LEN];
                dev.i2c
                    .write_read(dev.address, &[Self::ADDRESS], &mut buffer)?;
                *self = buffer[0].into();
                Ok(())
            }

            fn write<T: I2c<SevenBitAddress>, D: DelayNs>(
                &mut self,
                dev: &mut Bme280<T, D>,
            ) -> Result<(), Error<T::Error>> {
                dev.i2c
                    .write(dev.address, &[Self::ADDRESS, self.into_bits()])?;
                Ok(())
            }
        }
    };
}

control_register!(CtrlHum, 0xF2);
control_register!(CtrlMeas, 0xF4);
control_register!(Config, 0xF5);

impl Bme280Register for Status {
    const ADDRESS: u8 = 0xF3;
    const REGISTER_LEN: usize = 1;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Bme280<T, D>,
    ) -> Result<(), Error<T::Error>> {
        let mut buffer = [0u8; Self::REGISTER_LEN];
        dev.i2c
            .write_read(dev.address, &[Self::ADDRESS], &mut buffer)?;
        *self = buffer[0].into();
        Ok(())
    }
}

/// Burst readout of the pressure, temperature and humidity ADCs.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
    pub humidity: u32,
}

impl Bme280Register for RawSample {
    const ADDRESS: u8 = 0xF7;
    const REGISTER_LEN: usize = 8;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Bme280<T, D>,
    ) -> Result<(), Error<T::Error>> {
        let mut buf = [0u8; Self::REGISTER_LEN];
        dev.i2c.write_read(dev.address, &[Self::ADDRESS], &mut buf)?;
        // 20-bit, msb first, xlsb holds the low nibble in its upper half
        self.pressure = (buf[0] as u32) << 12 | (buf[1] as u32) << 4 | (buf[2] as u32) >> 4;
        self.temperature = (buf[3] as u32) << 12 | (buf[4] as u32) << 4 | (buf[5] as u32) >> 4;
        self.humidity = (buf[6] as u32) << 8 | buf[7] as u32;
        Ok(())
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Oversampling of a measurement channel. Higher oversampling lowers noise and raises conversion time.
pub enum Oversampling {
    /// The channel is not measured.
    Skip = 0b000,
    #[default]
    /// One sample.
    X1 = 0b001,
    /// Two samples.
    X2 = 0b010,
    /// Four samples.
    X4 = 0b011,
    /// Eight samples.
    X8 = 0b100,
    /// Sixteen samples.
    X16 = 0b101,
}

impl Oversampling {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b000 => Oversampling::Skip,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as u8
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Mode {
    #[default]
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

impl Mode {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b00 => Mode::Sleep,
            0b11 => Mode::Normal,
            _ => Mode::Forced,
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as u8
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Inactive time between two conversions in normal mode.
pub enum Standby {
    /// 0.5 milliseconds.
    Ms0_5 = 0b000,
    /// 62.5 milliseconds.
    Ms62_5 = 0b001,
    /// 125 milliseconds.
    Ms125 = 0b010,
    #[default]
    /// 250 milliseconds.
    Ms250 = 0b011,
    /// 500 milliseconds.
    Ms500 = 0b100,
    /// 1 second.
    Ms1000 = 0b101,
    /// 10 milliseconds.
    Ms10 = 0b110,
    /// 20 milliseconds.
    Ms20 = 0b111,
}

impl Standby {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b000 => Standby::Ms0_5,
            0b001 => Standby::Ms62_5,
            0b010 => Standby::Ms125,
            0b011 => Standby::Ms250,
            0b100 => Standby::Ms500,
            0b101 => Standby::Ms1000,
            0b110 => Standby::Ms10,
            _ => Standby::Ms20,
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as u8
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// IIR filter coefficient applied to temperature and pressure.
pub enum Filter {
    #[default]
    /// Filter disabled.
    Off = 0b000,
    /// Coefficient 2.
    X2 = 0b001,
    /// Coefficient 4.
    X4 = 0b010,
    /// Coefficient 8.
    X8 = 0b011,
    /// Coefficient 16.
    X16 = 0b100,
}

impl Filter {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as u8
    }
}
