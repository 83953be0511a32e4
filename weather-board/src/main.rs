use std::{
    io,
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use bme280::{Bme280, Bme280Builder, Oversampling, Standby};
use clap::Parser;
use linux_embedded_hal::{Delay, I2cdev};
use si1132::{Si1132, Si1132Builder};

// Local imports
mod sensors;
mod station;

use station::Station;

/// Poll the Si1132 and BME280 of a weather board and print their readings every second
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    path: PathBuf,
}

const PERIOD: Duration = Duration::from_secs(1);

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    log::info!("[WB] Arguments: {args:?}");
    let mut station = Station::new(init_light(&args.path), init_climate(&args.path));
    let mut stdout = io::stdout().lock();
    let Err(e) = station.run(&mut stdout, PERIOD);
    fatal(&format!("[WB] Stopped: {e}"));
}

fn fatal(msg: &str) -> ! {
    log::error!("{msg}");
    process::exit(1)
}

fn open_bus(path: &Path) -> I2cdev {
    I2cdev::new(path).unwrap_or_else(|e| {
        fatal(&format!(
            "[WB] {}> Failed to open I2C device: {e}",
            path.to_string_lossy()
        ))
    })
}

fn init_light(path: &Path) -> Si1132<I2cdev, Delay> {
    let lpath = path.to_string_lossy();
    log::info!("[UV] {lpath}> Opening bus");
    match Si1132Builder::default().build(open_bus(path), Delay) {
        Ok(si) => {
            log::info!("[UV] {lpath}> Device found at address {:02x}", si.get_address());
            si
        }
        Err(e) => fatal(&format!("[UV] {lpath}> Could not initialize Si1132: {e:?}")),
    }
}

fn init_climate(path: &Path) -> Bme280<I2cdev, Delay> {
    let lpath = path.to_string_lossy();
    log::info!("[ENV] {lpath}> Opening bus");
    match Bme280Builder::default()
        .with_temperature_oversampling(Oversampling::X4)
        .with_pressure_oversampling(Oversampling::X2)
        .with_humidity_oversampling(Oversampling::X2)
        .with_standby(Standby::Ms125)
        .build(open_bus(path), Delay)
    {
        Ok(bme) => {
            log::info!("[ENV] {lpath}> Device found at address {:02x}", bme.get_address());
            log::debug!("[ENV] {lpath}> Calibration: {:?}", bme.calibration());
            bme
        }
        Err(e) => fatal(&format!("[ENV] {lpath}> Could not initialize BME280: {e:?}")),
    }
}
