//! Temperature probe abstraction
//!
//! The firmware drives a DS18B20 on a one-wire bus; the simulator and tests
//! use mocks. Page code only ever goes through [`read_temperature`], which
//! performs the presence check, starts a conversion and polls for it to
//! finish within a bounded number of attempts.

use thiserror_no_std::Error;

/// Name used in logs and on the "not connected" screen.
pub const PROBE_NAME: &str = "DS18B20";

/// Upper bound on completion polls for one conversion.
///
/// Adapters pace the polls (the DS18B20 adapter waits 50 ms per poll, so a
/// 12-bit conversion of 750 ms fits comfortably).
pub const MAX_CONVERSION_POLLS: u32 = 25;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} not connected")]
    NotConnected { sensor: &'static str },
    #[error("{sensor} {operation} failed: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor} timed out during {operation}")]
    Timeout {
        sensor: &'static str,
        operation: &'static str,
    },
}

/// One-wire style temperature probe.
pub trait TemperatureProbe {
    /// Presence check for the probe on the bus.
    fn is_connected(&mut self) -> impl Future<Output = bool>;

    /// Start a temperature conversion.
    fn request_temperatures(&mut self) -> impl Future<Output = Result<(), SensorError>>;

    /// Whether the last requested conversion has finished.
    ///
    /// Implementations may wait a short, fixed time before answering so that
    /// repeated polling does not spin.
    fn is_conversion_complete(&mut self) -> impl Future<Output = Result<bool, SensorError>>;

    /// Result of the last conversion in degrees Celsius.
    fn temperature_celsius(&mut self) -> impl Future<Output = Result<f32, SensorError>>;
}

/// Read one uncorrected temperature from the probe.
pub async fn read_temperature<P: TemperatureProbe>(probe: &mut P) -> Result<f32, SensorError> {
    if !probe.is_connected().await {
        return Err(SensorError::NotConnected { sensor: PROBE_NAME });
    }

    probe.request_temperatures().await?;

    for _ in 0..MAX_CONVERSION_POLLS {
        if probe.is_conversion_complete().await? {
            return probe.temperature_celsius().await;
        }
    }

    Err(SensorError::Timeout {
        sensor: PROBE_NAME,
        operation: "conversion",
    })
}
