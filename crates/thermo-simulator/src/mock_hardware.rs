//! Host-side stand-ins for the device collaborators.
//!
//! Values are synthetic but move over time so every page has something to
//! redraw: the probe follows a slow sine wave, the battery drains, and the
//! network "associates" and "answers" SNTP after short fixed delays.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::info;

use thermo_core::app_state::AppError;
use thermo_core::board::Hardware;
use thermo_core::net::{LinkState, SyncStatus, TimeSyncService};
use thermo_core::power::PowerGauge;
use thermo_core::sensors::{SensorError, TemperatureProbe};
use thermo_core::storage::MemoryCorrectionStore;
use thermo_core::time::{DateTime, RtcClock, TzRule};

/// Simulated association time.
const CONNECT_DELAY: Duration = Duration::from_millis(1_500);
/// Simulated SNTP round trip.
const SYNC_DELAY: Duration = Duration::from_millis(2_500);
/// Battery drains one percent per this much wall time.
const DRAIN_PERIOD: Duration = Duration::from_secs(20);

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

pub struct SimProbe {
    pub connected: bool,
    started: Instant,
}

impl SimProbe {
    pub fn new() -> Self {
        Self {
            connected: true,
            started: Instant::now(),
        }
    }
}

impl TemperatureProbe for SimProbe {
    async fn is_connected(&mut self) -> bool {
        self.connected
    }

    async fn request_temperatures(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    async fn is_conversion_complete(&mut self) -> Result<bool, SensorError> {
        Ok(true)
    }

    async fn temperature_celsius(&mut self) -> Result<f32, SensorError> {
        let t = self.started.elapsed().as_secs_f64();
        // 15-35 °C so the bar crosses every color band
        Ok((25.0 + 10.0 * (t / 40.0).sin()) as f32)
    }
}

pub struct SimPower {
    started: Instant,
    led_on: bool,
}

impl SimPower {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            led_on: false,
        }
    }

    fn drained(&self) -> u64 {
        self.started.elapsed().as_secs() / DRAIN_PERIOD.as_secs()
    }
}

impl PowerGauge for SimPower {
    async fn battery_level(&mut self) -> Result<u8, AppError> {
        Ok(100u64.saturating_sub(self.drained() % 101) as u8)
    }

    /// Alternates between charging and discharging every minute.
    async fn is_charging(&mut self) -> Result<bool, AppError> {
        Ok(self.started.elapsed().as_secs() / 60 % 2 == 1)
    }

    async fn vbus_voltage(&mut self) -> Result<f32, AppError> {
        Ok(if self.is_charging().await? { 5.02 } else { 0.0 })
    }

    async fn set_led(&mut self, brightness: u8) -> Result<(), AppError> {
        let on = brightness > 0;
        if on != self.led_on {
            info!("LED {}", if on { "on" } else { "off" });
            self.led_on = on;
        }
        Ok(())
    }
}

/// RTC that follows the host clock, shifted by whatever was last written.
pub struct SimRtc {
    timezone: TzRule,
    offset_seconds: i64,
}

impl SimRtc {
    pub fn new(timezone: TzRule) -> Self {
        Self {
            timezone,
            offset_seconds: 0,
        }
    }
}

impl RtcClock for SimRtc {
    async fn read_datetime(&mut self) -> Result<DateTime, AppError> {
        let local = self.timezone.to_local(unix_now());
        Ok(DateTime::from_unix(local.to_unix() + self.offset_seconds))
    }

    async fn write_datetime(&mut self, datetime: &DateTime) -> Result<(), AppError> {
        let local = self.timezone.to_local(unix_now());
        self.offset_seconds = datetime.to_unix() - local.to_unix();
        info!(
            "RTC set to {} {} (offset {} s)",
            datetime.format_date(),
            datetime.format_time_12h(),
            self.offset_seconds
        );
        Ok(())
    }
}

#[derive(Default)]
pub struct SimNet {
    connecting_since: Option<Instant>,
    syncing_since: Option<Instant>,
    /// Refuse associations, to exercise the failure screens
    pub reject: bool,
}

impl TimeSyncService for SimNet {
    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), AppError> {
        info!("Simulated WiFi connecting to {}", ssid);
        self.connecting_since = Some(Instant::now());
        Ok(())
    }

    fn link_state(&mut self) -> LinkState {
        match self.connecting_since {
            None => LinkState::Down,
            Some(_) if self.reject => LinkState::Failed,
            Some(since) if since.elapsed() >= CONNECT_DELAY => LinkState::Up,
            Some(_) => LinkState::Connecting,
        }
    }

    fn start_sync(&mut self, server: &str) -> Result<(), AppError> {
        info!("Simulated SNTP query to {}", server);
        self.syncing_since = Some(Instant::now());
        Ok(())
    }

    fn sync_status(&mut self) -> SyncStatus {
        match self.syncing_since {
            None => SyncStatus::Idle,
            Some(since) if since.elapsed() >= SYNC_DELAY => SyncStatus::Synced(unix_now()),
            Some(_) => SyncStatus::InProgress,
        }
    }

    fn disconnect(&mut self) {
        info!("Simulated WiFi off");
        self.connecting_since = None;
        self.syncing_since = None;
    }
}

pub struct SimHardware;

impl Hardware for SimHardware {
    type Probe = SimProbe;
    type Power = SimPower;
    type Rtc = SimRtc;
    type Store = MemoryCorrectionStore;
    type Net = SimNet;
}
