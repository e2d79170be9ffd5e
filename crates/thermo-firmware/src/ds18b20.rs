//! DS18B20 probe on the one-wire bus (Grove port, GPIO33)
//!
//! The bus pin is an open-drain [`Flex`] with the internal pull-up. The
//! `onewire` driver bit-bangs with a blocking delay; conversion waits are
//! async so the executor keeps running while the probe measures.

use embassy_time::{Delay, Duration, Instant, Timer};
use esp_hal::gpio::{DriveMode, Flex, OutputConfig, Pull};
use log::{debug, info};
use onewire::{DS18B20, DeviceSearch, OneWire};

use thermo_core::sensors::{PROBE_NAME, SensorError, TemperatureProbe};

/// Pause between conversion-complete polls.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct Ds18b20Probe {
    pin: Flex<'static>,
    sensor: Option<DS18B20>,
    ready_at: Option<Instant>,
}

impl Ds18b20Probe {
    pub fn new(mut pin: Flex<'static>) -> Self {
        pin.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        pin.set_input_enable(true);
        pin.set_output_enable(true);
        pin.set_high();

        Self {
            pin,
            sensor: None,
            ready_at: None,
        }
    }

    /// Find the first DS18B20 on the bus, replacing any previous one.
    fn discover(&mut self) -> bool {
        self.sensor = None;
        let mut wire = OneWire::new(&mut self.pin, false);

        if wire.reset(&mut Delay).is_err() {
            return false;
        }

        let mut search = DeviceSearch::new();
        let Ok(Some(device)) = wire.search_next(&mut search, &mut Delay) else {
            return false;
        };

        match DS18B20::new(device) {
            Ok(sensor) => {
                info!("{} found on the one-wire bus", PROBE_NAME);
                self.sensor = Some(sensor);
                true
            }
            Err(_) => false,
        }
    }
}

impl TemperatureProbe for Ds18b20Probe {
    async fn is_connected(&mut self) -> bool {
        if self.sensor.is_some() {
            let mut wire = OneWire::new(&mut self.pin, false);
            if wire.reset(&mut Delay).is_ok() {
                return true;
            }
        }
        self.discover()
    }

    async fn request_temperatures(&mut self) -> Result<(), SensorError> {
        let sensor = self
            .sensor
            .as_ref()
            .ok_or(SensorError::NotConnected { sensor: PROBE_NAME })?;
        let mut wire = OneWire::new(&mut self.pin, false);

        let resolution = sensor
            .measure_temperature(&mut wire, &mut Delay)
            .map_err(|_| SensorError::ReadFailed {
                sensor: PROBE_NAME,
                operation: "start conversion",
                details: "bus error",
            })?;

        let wait = Duration::from_millis(u64::from(resolution.time_ms()));
        self.ready_at = Some(Instant::now() + wait);
        debug!("{} conversion started, ready in {} ms", PROBE_NAME, wait.as_millis());
        Ok(())
    }

    async fn is_conversion_complete(&mut self) -> Result<bool, SensorError> {
        let ready_at = self.ready_at.ok_or(SensorError::ReadFailed {
            sensor: PROBE_NAME,
            operation: "conversion",
            details: "no conversion requested",
        })?;
        Timer::after(POLL_INTERVAL).await;
        Ok(Instant::now() >= ready_at)
    }

    async fn temperature_celsius(&mut self) -> Result<f32, SensorError> {
        let sensor = self
            .sensor
            .as_ref()
            .ok_or(SensorError::NotConnected { sensor: PROBE_NAME })?;
        let mut wire = OneWire::new(&mut self.pin, false);

        let raw = sensor
            .read_temperature(&mut wire, &mut Delay)
            .map_err(|_| SensorError::ReadFailed {
                sensor: PROBE_NAME,
                operation: "read scratchpad",
                details: "bus or CRC error",
            })?;
        self.ready_at = None;

        let (integer, fraction) = onewire::ds18b20::split_temp(raw);
        Ok(integer as f32 + fraction as f32 / 10_000.0)
    }
}
