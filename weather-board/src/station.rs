use std::{
    convert::Infallible,
    fmt::{self, Debug},
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};

use crate::sensors::{ClimateSensor, LightSensor};

/// Assumed barometric pressure at sea level, in hPa.
pub const SEA_LEVEL_HPA: f64 = 1024.25;
/// Move the cursor home and erase the display.
pub const CLEAR_SCREEN: &str = "\x1b[1;1H\x1b[2J";

/// Altitude in metres from the international barometric formula.
pub fn altitude(pressure_pa: f64, sea_level_hpa: f64) -> f64 {
    let atmospheric = pressure_pa / 100.0;
    44330.0 * (1.0 - (atmospheric / sea_level_hpa).powf(0.1903))
}

/// One polling cycle worth of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    /// UV index times 100.
    pub uv: f64,
    pub visible: f64,
    pub infrared: f64,
    pub temperature: f64,
    pub humidity: f64,
    /// Pascal.
    pub pressure: f64,
    pub altitude: f64,
}

impl fmt::Display for Readings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======== si1132 ========")?;
        writeln!(f, "UV_index : {:.2}", self.uv / 100.0)?;
        writeln!(f, "Visible : {} Lux", self.visible as i64)?;
        writeln!(f, "IR : {} Lux", self.infrared as i64)?;
        writeln!(f, "======== bme280 ========")?;
        writeln!(f, "temperature : {:.2} 'C", self.temperature)?;
        writeln!(f, "humidity : {:.2} %", self.humidity)?;
        writeln!(f, "pressure : {:.2} hPa", self.pressure / 100.0)?;
        writeln!(f, "altitude : {:.2} m", self.altitude)
    }
}

#[derive(Debug)]
pub enum StationError<L, C> {
    Light(L),
    Climate(C),
    Io(io::Error),
}

impl<L, C> From<io::Error> for StationError<L, C> {
    fn from(e: io::Error) -> Self {
        StationError::Io(e)
    }
}

impl<L: Debug, C: Debug> fmt::Display for StationError<L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Light(e) => write!(f, "light sensor: {e:?}"),
            StationError::Climate(e) => write!(f, "climate sensor: {e:?}"),
            StationError::Io(e) => write!(f, "output: {e}"),
        }
    }
}

/// Holds both sensors for the lifetime of the program.
pub struct Station<L, C> {
    light: L,
    climate: C,
}

impl<L: LightSensor, C: ClimateSensor> Station<L, C> {
    pub fn new(light: L, climate: C) -> Self {
        Self { light, climate }
    }

    /// Read every channel, light sensor first.
    pub fn sample(&mut self) -> Result<Readings, StationError<L::Error, C::Error>> {
        let uv = self.light.uv_raw().map_err(StationError::Light)?;
        let visible = self.light.visible_lux().map_err(StationError::Light)?;
        let infrared = self.light.infrared_lux().map_err(StationError::Light)?;
        let temperature = self.climate.temperature().map_err(StationError::Climate)?;
        let humidity = self.climate.humidity().map_err(StationError::Climate)?;
        let pressure = self.climate.pressure().map_err(StationError::Climate)? as f64;
        Ok(Readings {
            uv: uv as f64,
            visible: visible as f64,
            infrared: infrared as f64,
            temperature: temperature as f64,
            humidity: humidity as f64,
            pressure,
            altitude: altitude(pressure, SEA_LEVEL_HPA),
        })
    }

    /// Clear the screen, then sample and print one report.
    pub fn cycle<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<Readings, StationError<L::Error, C::Error>> {
        let start = Instant::now();
        out.write_all(CLEAR_SCREEN.as_bytes())?;
        let readings = self.sample()?;
        write!(out, "{readings}")?;
        out.flush()?;
        log::debug!(
            "[WB] Cycle done in {:.2} ms.",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(readings)
    }

    /// Print a report every `period` until a sensor or the output fails.
    ///
    /// The period does not account for the time spent reading.
    pub fn run<W: Write>(
        &mut self,
        out: &mut W,
        period: Duration,
    ) -> Result<Infallible, StationError<L::Error, C::Error>> {
        loop {
            self.cycle(out)?;
            thread::sleep(period);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    type Calls = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Debug, PartialEq)]
    struct Fault(&'static str);

    struct FakeLight {
        calls: Calls,
        fail: Option<&'static str>,
    }

    struct FakeClimate {
        calls: Calls,
        fail: Option<&'static str>,
        pressure: f32,
    }

    fn record(
        calls: &Calls,
        fail: Option<&'static str>,
        name: &'static str,
        value: f32,
    ) -> Result<f32, Fault> {
        calls.borrow_mut().push(name);
        match fail {
            Some(f) if f == name => Err(Fault(name)),
            _ => Ok(value),
        }
    }

    impl LightSensor for FakeLight {
        type Error = Fault;

        fn uv_raw(&mut self) -> Result<f32, Fault> {
            record(&self.calls, self.fail, "uv", 523.0)
        }

        fn visible_lux(&mut self) -> Result<f32, Fault> {
            record(&self.calls, self.fail, "visible", 260.9)
        }

        fn infrared_lux(&mut self) -> Result<f32, Fault> {
            record(&self.calls, self.fail, "infrared", 271.99)
        }
    }

    impl ClimateSensor for FakeClimate {
        type Error = Fault;

        fn temperature(&mut self) -> Result<f32, Fault> {
            record(&self.calls, self.fail, "temperature", 24.714)
        }

        fn humidity(&mut self) -> Result<f32, Fault> {
            record(&self.calls, self.fail, "humidity", 45.333)
        }

        fn pressure(&mut self) -> Result<f32, Fault> {
            record(&self.calls, self.fail, "pressure", self.pressure)
        }
    }

    fn station(
        fail: Option<&'static str>,
        pressure: f32,
    ) -> (Station<FakeLight, FakeClimate>, Calls) {
        let calls = Calls::default();
        let light = FakeLight {
            calls: calls.clone(),
            fail,
        };
        let climate = FakeClimate {
            calls: calls.clone(),
            fail,
            pressure,
        };
        (Station::new(light, climate), calls)
    }

    #[test]
    fn altitude_is_zero_at_sea_level() {
        assert_eq!(altitude(102425.0, SEA_LEVEL_HPA), 0.0);
    }

    #[test]
    fn altitude_at_standard_atmosphere() {
        let alt = altitude(101325.0, SEA_LEVEL_HPA);
        assert!((alt - 90.995).abs() < 0.01, "{alt}");
    }

    #[test]
    fn altitude_follows_barometric_formula() {
        for pa in [30000.0, 70000.0, 95000.0, 101325.0, 105000.0] {
            let expected = 44330.0 * (1.0 - (pa / 100.0 / 1024.25f64).powf(0.1903));
            assert_eq!(altitude(pa, SEA_LEVEL_HPA), expected);
        }
        // lower pressure, higher up
        assert!(altitude(90000.0, SEA_LEVEL_HPA) > altitude(100000.0, SEA_LEVEL_HPA));
        assert!(altitude(105000.0, SEA_LEVEL_HPA) < 0.0);
    }

    #[test]
    fn sample_reads_in_fixed_order() {
        let (mut station, calls) = station(None, 102425.0);
        let readings = station.sample().expect("sample");
        assert_eq!(
            *calls.borrow(),
            [
                "uv",
                "visible",
                "infrared",
                "temperature",
                "humidity",
                "pressure"
            ]
        );
        assert_eq!(readings.uv, 523.0);
        assert_eq!(readings.pressure, 102425.0);
        assert_eq!(readings.altitude, 0.0);
    }

    #[test]
    fn cycle_clears_then_prints_report() {
        let (mut station, _) = station(None, 102425.0);
        let mut out = Vec::new();
        station.cycle(&mut out).expect("cycle");
        let text = String::from_utf8(out).expect("utf8");
        let expected = [
            CLEAR_SCREEN,
            "======== si1132 ========\n",
            "UV_index : 5.23\n",
            "Visible : 260 Lux\n",
            "IR : 271 Lux\n",
            "======== bme280 ========\n",
            "temperature : 24.71 'C\n",
            "humidity : 45.33 %\n",
            "pressure : 1024.25 hPa\n",
            "altitude : 0.00 m\n",
        ]
        .concat();
        assert_eq!(text, expected);
    }

    #[test]
    fn report_truncates_lux() {
        let readings = Readings {
            uv: 0.0,
            visible: 99.999,
            infrared: 0.5,
            temperature: -3.456,
            humidity: 100.0,
            pressure: 99000.0,
            altitude: 212.3,
        };
        let text = readings.to_string();
        assert!(text.contains("UV_index : 0.00\n"));
        assert!(text.contains("Visible : 99 Lux\n"));
        assert!(text.contains("IR : 0 Lux\n"));
        assert!(text.contains("temperature : -3.46 'C\n"));
        assert!(text.contains("pressure : 990.00 hPa\n"));
        assert!(text.contains("altitude : 212.30 m\n"));
        assert_eq!(text.lines().count(), 9);
    }

    #[test]
    fn light_error_stops_the_cycle() {
        let (mut station, calls) = station(Some("visible"), 102425.0);
        let mut out = Vec::new();
        match station.cycle(&mut out) {
            Err(StationError::Light(Fault("visible"))) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(*calls.borrow(), ["uv", "visible"]);
        // only the clear sequence made it out
        assert_eq!(out, CLEAR_SCREEN.as_bytes());
    }

    #[test]
    fn climate_error_propagates_from_run() {
        let (mut station, calls) = station(Some("humidity"), 102425.0);
        let mut out = Vec::new();
        let Err(e) = station.run(&mut out, Duration::ZERO);
        assert!(matches!(e, StationError::Climate(Fault("humidity"))));
        assert_eq!(calls.borrow().last(), Some(&"humidity"));
        assert!(!calls.borrow().contains(&"pressure"));
    }
}
