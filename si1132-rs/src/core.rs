use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{
    Error, Infrared, Range, UvIndex, Visible,
    register::{
        ADC_COUNTER_511_CLK, ADC_MUX_SMALL_IR, ChannelList, Command, INT_CFG_INT_OE,
        IRQ_ENABLE_ALS_EVERY_SAMPLE, Parameter, PartId, SI1132_HW_KEY, Si1132Register, reg,
    },
};

/// Default I2C address of the Si1132.
pub const SI1132_ADDRESS: u8 = 0x60;
/// Settle time after a reset or an ADC parameter change.
const SETTLE_MS: u32 = 10;

/// Represents the Si1132 sensor.
pub struct Si1132<I2C, D> {
    pub(crate) i2c: I2C,
    pub(crate) delay: D,
    pub(crate) address: u8,
}

#[derive(Debug, Clone, Copy)]
/// Builder for a Si1132 sensor.
pub struct Si1132Builder {
    pub(crate) address: u8,
    pub(crate) ucoef: [u8; 4],
    pub(crate) vis_range: Range,
    pub(crate) ir_range: Range,
    pub(crate) meas_rate: u16,
}

impl Default for Si1132Builder {
    fn default() -> Self {
        Self {
            address: SI1132_ADDRESS,
            ucoef: [0x7B, 0x6B, 0x01, 0x00],
            vis_range: Range::High,
            ir_range: Range::High,
            meas_rate: 0x00FF,
        }
    }
}

impl Si1132Builder {
    /// Set the address of the Si1132 sensor.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the UV index calibration coefficients (UCOEF0..UCOEF3).
    pub fn with_uv_coefficients(mut self, ucoef: [u8; 4]) -> Self {
        self.ucoef = ucoef;
        self
    }

    /// Set the signal range of the visible light ADC.
    pub fn with_visible_range(mut self, range: Range) -> Self {
        self.vis_range = range;
        self
    }

    /// Set the signal range of the infrared ADC.
    pub fn with_infrared_range(mut self, range: Range) -> Self {
        self.ir_range = range;
        self
    }

    /// Set the autonomous measurement rate, in units of 31.25 us.
    pub fn with_measurement_rate(mut self, rate: u16) -> Self {
        self.meas_rate = rate;
        self
    }

    /// Build the Si1132 sensor with the specified configuration.
    ///
    /// The part ID is checked, the device is reset and put in autonomous ALS mode
    /// measuring the UV, visible and infrared channels.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: T,
        delay: D,
    ) -> Result<Si1132<T, D>, Error<T::Error>> {
        let mut dev = Si1132 {
            i2c,
            delay,
            address: self.address,
        };
        // Check if the device is present by reading its ID register
        PartId::default().read(&mut dev)?;
        dev.reset()?;

        for (offset, coef) in self.ucoef.iter().enumerate() {
            dev.write_register(reg::UCOEF0 + offset as u8, *coef)?;
        }
        let chlist = ChannelList::new()
            .with_uv(true)
            .with_als_infrared(true)
            .with_als_visible(true);
        dev.write_param(Parameter::ChannelList, chlist.into_bits())?;
        dev.write_register(reg::INT_CFG, INT_CFG_INT_OE)?;
        dev.write_register(reg::IRQ_ENABLE, IRQ_ENABLE_ALS_EVERY_SAMPLE)?;

        dev.write_param(Parameter::AlsIrAdcMux, ADC_MUX_SMALL_IR)?;
        dev.delay.delay_ms(SETTLE_MS);
        // fastest clocks, clock div 1
        dev.write_param(Parameter::AlsIrAdcGain, 0)?;
        dev.delay.delay_ms(SETTLE_MS);
        dev.write_param(Parameter::AlsIrAdcCounter, ADC_COUNTER_511_CLK)?;
        dev.write_param(Parameter::AlsIrAdcMisc, self.ir_range as u8)?;
        dev.delay.delay_ms(SETTLE_MS);

        dev.write_param(Parameter::AlsVisAdcGain, 0)?;
        dev.delay.delay_ms(SETTLE_MS);
        dev.write_param(Parameter::AlsVisAdcCounter, ADC_COUNTER_511_CLK)?;
        dev.write_param(Parameter::AlsVisAdcMisc, self.vis_range as u8)?;
        dev.delay.delay_ms(SETTLE_MS);

        let [rate0, rate1] = self.meas_rate.to_le_bytes();
        dev.write_register(reg::MEAS_RATE0, rate0)?;
        dev.write_register(reg::MEAS_RATE1, rate1)?;
        dev.command(Command::AlsAuto)?;
        Ok(dev)
    }
}

impl<T: I2c<SevenBitAddress>, D: DelayNs> Si1132<T, D> {
    /// Get the address of the device.
    pub fn get_address(&self) -> u8 {
        self.address
    }

    /// Read the latest UV index sample.
    pub fn read_uv(&mut self) -> Result<UvIndex, Error<T::Error>> {
        self.read_sample()
    }

    /// Read the latest visible light sample.
    pub fn read_visible(&mut self) -> Result<Visible, Error<T::Error>> {
        self.read_sample()
    }

    /// Read the latest infrared light sample.
    pub fn read_infrared(&mut self) -> Result<Infrared, Error<T::Error>> {
        self.read_sample()
    }

    /// Stop autonomous measurements and return the device to its power-on state.
    pub fn reset(&mut self) -> Result<(), Error<T::Error>> {
        self.write_register(reg::MEAS_RATE0, 0)?;
        self.write_register(reg::MEAS_RATE1, 0)?;
        self.write_register(reg::IRQ_ENABLE, 0)?;
        self.write_register(reg::IRQ_MODE1, 0)?;
        self.write_register(reg::IRQ_MODE2, 0)?;
        self.write_register(reg::INT_CFG, 0)?;
        self.write_register(reg::IRQ_STATUS, 0xFF)?;

        self.command(Command::Reset)?;
        self.delay.delay_ms(SETTLE_MS);
        self.write_register(reg::HW_KEY, SI1132_HW_KEY)?;
        self.delay.delay_ms(SETTLE_MS);
        Ok(())
    }

    /// Release the bus and delay provider.
    pub fn release(self) -> (T, D) {
        (self.i2c, self.delay)
    }

    fn read_sample<R: Si1132Register>(&mut self) -> Result<R, Error<T::Error>> {
        // let the running ALS cycle finish
        self.delay.delay_ms(SETTLE_MS);
        let mut v = R::default();
        v.read(self)?;
        Ok(v)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<T::Error>> {
        self.i2c.write(self.address, &[register, value])?;
        Ok(())
    }

    fn command(&mut self, command: Command) -> Result<(), Error<T::Error>> {
        self.write_register(reg::COMMAND, command as u8)
    }

    fn write_param(&mut self, param: Parameter, value: u8) -> Result<(), Error<T::Error>> {
        self.write_register(reg::PARAM_WR, value)?;
        self.write_register(reg::COMMAND, Command::ParamSet as u8 | param as u8)
    }
}
