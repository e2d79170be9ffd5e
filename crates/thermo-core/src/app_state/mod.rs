//! Application-wide run state and error types for thermo-lcd

use thiserror_no_std::Error;

use crate::sensors::SensorError;

/// Top-level mode of the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    /// Splash shown, waiting for button A or the boot timeout
    Booting,
    /// Normal page navigation and refresh
    Browsing,
    /// Interactive temperature offset adjustment
    Calibrating,
    /// WiFi + NTP clock resync in progress
    SyncingClock,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("WiFi connection failed: {0}")]
    Wifi(heapless::String<64>),
    #[error("Time sync failed: {0}")]
    TimeSync(heapless::String<64>),
    #[error("Storage error: {0}")]
    Storage(heapless::String<64>),
    #[error("Sensor error: {0}")]
    Sensor(SensorError),
    #[error("Power gauge error: {0}")]
    Power(heapless::String<64>),
    #[error("RTC error: {0}")]
    Rtc(heapless::String<64>),
    #[error("Display error")]
    Display,
    #[error("Invalid configuration: {0}")]
    Config(heapless::String<64>),
}

impl AppError {
    /// Log a draw-target error and collapse it into [`AppError::Display`].
    ///
    /// Draw targets have unrelated error types, so the detail only survives
    /// in the log.
    pub fn display<E: core::fmt::Debug>(err: E) -> Self {
        log::error!("Display error: {:?}", err);
        AppError::Display
    }
}

impl From<SensorError> for AppError {
    fn from(err: SensorError) -> Self {
        AppError::Sensor(err)
    }
}

pub trait FromUnchecked<T> {
    fn from_unchecked(value: T) -> Self;
}

/// Builds a `heapless::String` from a literal, truncating at capacity.
impl<'a, const N: usize> FromUnchecked<&'a str> for heapless::String<N> {
    fn from_unchecked(value: &'a str) -> Self {
        let mut out = heapless::String::<N>::new();
        for c in value.chars() {
            if out.push(c).is_err() {
                break;
            }
        }
        out
    }
}
