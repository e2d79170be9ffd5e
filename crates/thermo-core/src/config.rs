//! Build-time configuration and timing constants

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

/// NTP pool used when nothing else is configured.
pub const DEFAULT_NTP_SERVER: &str = "0.au.pool.ntp.org";

/// POSIX TZ rule for Adelaide (ACST/ACDT).
pub const DEFAULT_TIMEZONE: &str = "ACST-9:30ACDT,M10.1.0,M4.1.0/3";

// Page refresh intervals
pub const CLOCK_REFRESH_INTERVAL: Duration = Duration::from_millis(1_000);
pub const THERMOMETER_REFRESH_INTERVAL: Duration = Duration::from_millis(10_000);
pub const BATTERY_REFRESH_INTERVAL: Duration = Duration::from_millis(5_000);

/// How long the update indicator stays lit after a refresh.
pub const INDICATOR_ON_TIME: Duration = Duration::from_millis(500);

/// Maximum time the boot splash waits for button A.
pub const BOOT_SPLASH_TIMEOUT: Duration = Duration::from_millis(4_100);

// Button timing
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(20);
pub const BUTTON_HOLD_THRESHOLD: Duration = Duration::from_millis(500);

// Calibration routine
pub const CALIBRATION_STEP: f32 = 0.2;
pub const CALIBRATION_SETTLE_TIME: Duration = Duration::from_millis(700);
pub const CALIBRATION_STEP_DEBOUNCE: Duration = Duration::from_millis(300);
pub const CALIBRATION_FINISHED_HOLD: Duration = Duration::from_millis(1_000);

// Clock resync routine
pub const WIFI_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const NTP_SYNC_TIMEOUT: Duration = Duration::from_secs(30);
pub const SYNC_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
pub const SYNC_SUCCESS_HOLD: Duration = Duration::from_millis(1_500);
pub const SYNC_FAILURE_HOLD: Duration = Duration::from_millis(3_000);

// Boot LED flash: 20% brightness, 6 Hz, twice
pub const BOOT_LED_BRIGHTNESS_PERCENT: u8 = 20;
pub const BOOT_LED_FREQUENCY_HZ: u32 = 6;
pub const BOOT_LED_FLASHES: u16 = 2;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    pub time: TimeConfig<'a>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct TimeConfig<'a> {
    pub ntp_server: &'a str,
    /// POSIX TZ rule, e.g. `ACST-9:30ACDT,M10.1.0,M4.1.0/3`
    pub timezone: &'a str,
}

impl Default for TimeConfig<'_> {
    fn default() -> Self {
        Self {
            ntp_server: DEFAULT_NTP_SERVER,
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl<'a> Config<'a> {
    /// Config with the given WiFi credentials and the default time settings.
    pub fn with_credentials(ssid: &'a str, password: &'a str) -> Self {
        Self {
            internet: InternetConfig { ssid, password },
            time: TimeConfig::default(),
        }
    }
}
