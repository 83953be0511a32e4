use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{Error, core::Si1132};

pub(crate) const SI1132_PART_ID: u8 = 0x32;
pub(crate) const SI1132_HW_KEY: u8 = 0x17;
/// 511 ADC clocks per measurement, the recommended counter for ALS.
pub(crate) const ADC_COUNTER_511_CLK: u8 = 0x70;
/// Small IR photodiode on the IR ADC input.
pub(crate) const ADC_MUX_SMALL_IR: u8 = 0x00;

/// I2C register map.
pub(crate) mod reg {
    pub const PART_ID: u8 = 0x00;
    pub const INT_CFG: u8 = 0x03;
    pub const IRQ_ENABLE: u8 = 0x04;
    pub const IRQ_MODE1: u8 = 0x05;
    pub const IRQ_MODE2: u8 = 0x06;
    pub const HW_KEY: u8 = 0x07;
    pub const MEAS_RATE0: u8 = 0x08;
    pub const MEAS_RATE1: u8 = 0x09;
    pub const UCOEF0: u8 = 0x13;
    pub const PARAM_WR: u8 = 0x17;
    pub const COMMAND: u8 = 0x18;
    pub const IRQ_STATUS: u8 = 0x21;
    pub const ALS_VIS_DATA0: u8 = 0x22;
    pub const ALS_IR_DATA0: u8 = 0x24;
    pub const AUX_DATA0: u8 = 0x2C;
}

pub(crate) const INT_CFG_INT_OE: u8 = 0x01;
pub(crate) const IRQ_ENABLE_ALS_EVERY_SAMPLE: u8 = 0x01;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Commands written to the COMMAND register.
pub(crate) enum Command {
    Reset = 0x01,
    AlsAuto = 0x0E,
    ParamSet = 0xA0,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Offsets into the parameter RAM, reachable only through PARAM_WR and COMMAND.
pub(crate) enum Parameter {
    ChannelList = 0x01,
    AlsIrAdcMux = 0x0E,
    AlsVisAdcCounter = 0x10,
    AlsVisAdcGain = 0x11,
    AlsVisAdcMisc = 0x12,
    AlsIrAdcCounter = 0x1D,
    AlsIrAdcGain = 0x1E,
    AlsIrAdcMisc = 0x1F,
}

#[bitfield(u8)]
/// CHLIST parameter: which channels are measured in autonomous mode.
pub(crate) struct ChannelList {
    #[bits(4, default = 0, access = RO)]
    rsvd: u8,
    #[bits(1, default = false)]
    pub als_visible: bool,
    #[bits(1, default = false)]
    pub als_infrared: bool,
    #[bits(1, default = false)]
    pub aux: bool,
    #[bits(1, default = false)]
    pub uv: bool,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Signal range of the visible and infrared ADCs.
pub enum Range {
    /// Normal signal range.
    Normal = 0x00,
    #[default]
    /// High signal range, the ADC gain is divided by roughly 14.5. Use under direct sunlight.
    High = 0x20,
}

pub(crate) trait Si1132Register: Default {
    const ADDRESS: u8;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Si1132<T, D>,
    ) -> Result<(), Error<T::Error>>;
}

#[derive(Debug, Default)]
pub(crate) struct PartId(pub(crate) u8);

impl Si1132Register for PartId {
    const ADDRESS: u8 = reg::PART_ID;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Si1132<T, D>,
    ) -> Result<(), Error<T::Error>> {
        let mut buffer = [0u8; 1];
        dev.i2c
            .write_read(dev.address, &[Self::ADDRESS], &mut buffer)?;
        self.0 = buffer[0];
        if self.0 != SI1132_PART_ID {
            return Err(Error::InvalidId(self.0));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Represents a UV index measurement from the Si1132 sensor.
pub struct UvIndex(pub(crate) u16);

impl UvIndex {
    /// Raw register value, which is the UV index multiplied by 100.
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// The UV index.
    pub fn index(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Represents a visible light measurement from the Si1132 sensor.
pub struct Visible(pub(crate) u16);

impl Visible {
    /// Raw ADC count.
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Converts the raw count to lux, assuming the high signal range. Never negative.
    pub fn lux(&self) -> f32 {
        ((self.0 as f32 - 256.0) / 0.282 * 14.5).max(0.0)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Represents an infrared light measurement from the Si1132 sensor.
pub struct Infrared(pub(crate) u16);

impl Infrared {
    /// Raw ADC count.
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Converts the raw count to lux, assuming the high signal range. Never negative.
    pub fn lux(&self) -> f32 {
        ((self.0 as f32 - 250.0) / 2.44 * 14.5).max(0.0)
    }
}

macro_rules! data_register {
    ($ty:ident, $addr:expr) => {
        impl Si1132Register for $ty {
            const ADDRESS: u8 = $addr;

            fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
                &mut self,
                dev: &mut Si1132<T, D>,
            ) -> Result<(), Error<T::Error>> {
                let mut buffer = [0u8; 2];
                dev.i2c
                    .write_read(dev.address, &[Self::ADDRESS], &mut buffer)?;
                self.0 = u16::from_le_bytes(buffer);
                Ok(())
            }
        }
    };
}

data_register!(UvIndex, reg::AUX_DATA0);
data_register!(Visible, reg::ALS_VIS_DATA0);
data_register!(Infrared, reg::ALS_IR_DATA0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_list_bits() {
        let chlist = ChannelList::new()
            .with_uv(true)
            .with_als_infrared(true)
            .with_als_visible(true);
        assert_eq!(chlist.into_bits(), 0xB0);
    }

    #[test]
    fn lux_clamps_at_zero() {
        assert_eq!(Visible(0).lux(), 0.0);
        assert_eq!(Visible(256).lux(), 0.0);
        assert_eq!(Infrared(100).lux(), 0.0);
        assert_eq!(Infrared(250).lux(), 0.0);
    }

    #[test]
    fn lux_conversion() {
        // 282 counts above the dark offset
        let vis = Visible(256 + 282).lux();
        assert!((vis - 14500.0).abs() < 0.5, "{vis}");
        let ir = Infrared(250 + 244).lux();
        assert!((ir - 1450.0).abs() < 0.5, "{ir}");
    }

    #[test]
    fn uv_index_scale() {
        let uv = UvIndex(523);
        assert_eq!(uv.raw(), 523);
        assert!((uv.index() - 5.23).abs() < 1e-6);
    }
}
