//! Conversion of raw ADC readouts to physical units, following the floating point
//! compensation formulas of the BME280 datasheet (section 8.1).

/// Length of the first calibration block, 0x88..=0xA1.
pub(crate) const CALIB_TP_LEN: usize = 26;
/// Length of the second calibration block, 0xE1..=0xE7.
pub(crate) const CALIB_H_LEN: usize = 7;
pub(crate) const CALIB_TP_ADDRESS: u8 = 0x88;
pub(crate) const CALIB_H_ADDRESS: u8 = 0xE1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Factory trimming parameters read from the sensor's non-volatile memory.
pub struct Calibration {
    pub(crate) t1: u16,
    pub(crate) t2: i16,
    pub(crate) t3: i16,
    pub(crate) p1: u16,
    pub(crate) p2: i16,
    pub(crate) p3: i16,
    pub(crate) p4: i16,
    pub(crate) p5: i16,
    pub(crate) p6: i16,
    pub(crate) p7: i16,
    pub(crate) p8: i16,
    pub(crate) p9: i16,
    pub(crate) h1: u8,
    pub(crate) h2: i16,
    pub(crate) h3: u8,
    pub(crate) h4: i16,
    pub(crate) h5: i16,
    pub(crate) h6: i8,
}

impl Calibration {
    /// Decode the two calibration blocks as laid out in the device memory map.
    pub fn from_registers(tp: &[u8; CALIB_TP_LEN], h: &[u8; CALIB_H_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);
        Self {
            t1: u16_at(0),
            t2: i16_at(2),
            t3: i16_at(4),
            p1: u16_at(6),
            p2: i16_at(8),
            p3: i16_at(10),
            p4: i16_at(12),
            p5: i16_at(14),
            p6: i16_at(16),
            p7: i16_at(18),
            p8: i16_at(20),
            p9: i16_at(22),
            // 0xA0 is unused
            h1: tp[25],
            h2: i16::from_le_bytes([h[0], h[1]]),
            h3: h[2],
            // H4 and H5 are 12-bit signed values sharing the nibbles of 0xE5
            h4: (h[3] as i8 as i16) << 4 | (h[4] & 0x0F) as i16,
            h5: (h[5] as i8 as i16) << 4 | (h[4] >> 4) as i16,
            h6: h[6] as i8,
        }
    }

    /// Temperature in degrees Celsius, and the fine temperature used by the other channels.
    pub(crate) fn temperature(&self, adc_t: u32) -> (f64, i32) {
        let adc_t = adc_t as f64;
        let t1 = self.t1 as f64;
        let var1 = (adc_t / 16384.0 - t1 / 1024.0) * self.t2 as f64;
        let var2 = adc_t / 131072.0 - t1 / 8192.0;
        let var2 = var2 * var2 * self.t3 as f64;
        let t_fine = var1 + var2;
        (t_fine / 5120.0, t_fine as i32)
    }

    /// Pressure in pascal.
    pub(crate) fn pressure(&self, adc_p: u32, t_fine: i32) -> f64 {
        let mut var1 = t_fine as f64 / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * self.p6 as f64 / 32768.0;
        var2 += var1 * self.p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.p4 as f64 * 65536.0;
        var1 = (self.p3 as f64 * var1 * var1 / 524288.0 + self.p2 as f64 * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * self.p1 as f64;
        if var1 == 0.0 {
            // avoid division by zero on a blank calibration
            return 0.0;
        }
        let mut p = 1048576.0 - adc_p as f64;
        p = (p - var2 / 4096.0) * 6250.0 / var1;
        var1 = self.p9 as f64 * p * p / 2147483648.0;
        var2 = p * self.p8 as f64 / 32768.0;
        p + (var1 + var2 + self.p7 as f64) / 16.0
    }

    /// Relative humidity in percent, clamped to 0..=100.
    pub(crate) fn humidity(&self, adc_h: u32, t_fine: i32) -> f64 {
        let var_h = t_fine as f64 - 76800.0;
        let var_h = (adc_h as f64 - (self.h4 as f64 * 64.0 + self.h5 as f64 / 16384.0 * var_h))
            * (self.h2 as f64 / 65536.0
                * (1.0
                    + self.h6 as f64 / 67108864.0
                        * var_h
                        * (1.0 + self.h3 as f64 / 67108864.0 * var_h)));
        let var_h = var_h * (1.0 - self.h1 as f64 * var_h / 524288.0);
        var_h.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Trimming values of the datasheet's worked example, plus a plausible humidity set.
    pub(crate) fn sample_registers() -> ([u8; CALIB_TP_LEN], [u8; CALIB_H_LEN]) {
        let words: [u16; 12] = [
            27504,
            26435,
            (-1000i16) as u16,
            36477,
            (-10685i16) as u16,
            3024,
            2855,
            140,
            (-7i16) as u16,
            15500,
            (-14600i16) as u16,
            6000,
        ];
        let mut tp = [0u8; CALIB_TP_LEN];
        for (i, w) in words.iter().enumerate() {
            tp[2 * i..2 * i + 2].copy_from_slice(&w.to_le_bytes());
        }
        tp[25] = 75;
        let h2 = 362i16.to_le_bytes();
        let (h4, h5) = (313i16, 50i16);
        let h = [
            h2[0],
            h2[1],
            0,
            (h4 >> 4) as u8,
            (h4 & 0x0F) as u8 | ((h5 & 0x0F) as u8) << 4,
            (h5 >> 4) as u8,
            30,
        ];
        (tp, h)
    }

    #[test]
    fn decodes_register_blocks() {
        let (tp, h) = sample_registers();
        let cal = Calibration::from_registers(&tp, &h);
        assert_eq!(cal.t1, 27504);
        assert_eq!(cal.t3, -1000);
        assert_eq!(cal.p1, 36477);
        assert_eq!(cal.p6, -7);
        assert_eq!(cal.p9, 6000);
        assert_eq!(cal.h1, 75);
        assert_eq!(cal.h2, 362);
        assert_eq!(cal.h4, 313);
        assert_eq!(cal.h5, 50);
        assert_eq!(cal.h6, 30);
    }

    #[test]
    fn negative_h4_is_sign_extended() {
        let (tp, mut h) = sample_registers();
        h[3] = 0xFF;
        h[4] = 0x0F;
        let cal = Calibration::from_registers(&tp, &h);
        assert_eq!(cal.h4, -1);
    }

    #[test]
    fn datasheet_example() {
        let (tp, h) = sample_registers();
        let cal = Calibration::from_registers(&tp, &h);
        let (t, t_fine) = cal.temperature(519888);
        assert!((t - 25.08).abs() < 0.01, "{t}");
        assert_eq!(t_fine, 128422);
        let p = cal.pressure(415148, t_fine);
        assert!((p - 100653.27).abs() < 1.0, "{p}");
        let rh = cal.humidity(0x6B00, t_fine);
        assert!((rh - 40.47).abs() < 0.01, "{rh}");
    }

    #[test]
    fn blank_calibration_does_not_divide_by_zero() {
        let cal = Calibration::default();
        assert_eq!(cal.pressure(415148, 128422), 0.0);
        assert_eq!(cal.humidity(0xFFFF, 128422), 0.0);
    }
}
