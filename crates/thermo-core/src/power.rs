//! Battery gauge, charge state and status LED

use embedded_hal_async::delay::DelayNs;

use crate::app_state::AppError;

// AXP192-style level estimate from the battery voltage
const LEVEL_ZERO_MV: u32 = 3_300;
const LEVEL_SPAN_MV: u32 = 800;

/// Power management chip as seen by the pages.
pub trait PowerGauge {
    /// Battery charge in percent (0-100).
    fn battery_level(&mut self) -> impl Future<Output = Result<u8, AppError>>;

    fn is_charging(&mut self) -> impl Future<Output = Result<bool, AppError>>;

    /// USB bus voltage in volts.
    fn vbus_voltage(&mut self) -> impl Future<Output = Result<f32, AppError>>;

    /// Status LED brightness, 0 (off) to 255.
    fn set_led(&mut self, brightness: u8) -> impl Future<Output = Result<(), AppError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Charging,
    Full,
    Discharging,
}

impl ChargeState {
    pub const fn label(self) -> &'static str {
        match self {
            ChargeState::Charging => "Charging",
            ChargeState::Full => "Full",
            ChargeState::Discharging => "Discharge",
        }
    }
}

/// One snapshot of the power gauge, as drawn on the battery page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStatus {
    pub level: u8,
    pub charging: bool,
    pub vbus_volts: f32,
}

impl BatteryStatus {
    pub const fn charge_state(&self) -> ChargeState {
        if self.charging {
            ChargeState::Charging
        } else if self.level >= 100 {
            ChargeState::Full
        } else {
            ChargeState::Discharging
        }
    }
}

pub async fn read_battery_status<G: PowerGauge>(gauge: &mut G) -> Result<BatteryStatus, AppError> {
    Ok(BatteryStatus {
        level: gauge.battery_level().await?.min(100),
        charging: gauge.is_charging().await?,
        vbus_volts: gauge.vbus_voltage().await?,
    })
}

/// Battery percentage estimated from the cell voltage in millivolts.
pub fn battery_level_from_millivolts(millivolts: u32) -> u8 {
    let above_zero = millivolts.saturating_sub(LEVEL_ZERO_MV);
    (above_zero * 100 / LEVEL_SPAN_MV).min(100) as u8
}

/// Blink the status LED `count` times.
///
/// Each flash is on for `500 / frequency_hz` ms and then off for the same
/// time. Does nothing when `brightness_percent` is zero.
pub async fn flash_led<G, D>(
    gauge: &mut G,
    delay: &mut D,
    brightness_percent: u8,
    frequency_hz: u32,
    count: u16,
) -> Result<(), AppError>
where
    G: PowerGauge,
    D: DelayNs,
{
    if brightness_percent == 0 || frequency_hz == 0 {
        return Ok(());
    }

    let period_ms = 500 / frequency_hz;
    let brightness = (u32::from(brightness_percent.min(100)) * 0xFF / 100) as u8;

    for _ in 0..count {
        gauge.set_led(brightness).await?;
        delay.delay_ms(period_ms).await;
        gauge.set_led(0).await?;
        delay.delay_ms(period_ms).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockPower, NoopDelay};
    use embassy_futures::block_on;

    #[test]
    fn test_charge_state_labels() {
        let mut status = BatteryStatus {
            level: 80,
            charging: true,
            vbus_volts: 5.0,
        };
        assert_eq!(status.charge_state().label(), "Charging");

        status.charging = false;
        assert_eq!(status.charge_state().label(), "Discharge");

        status.level = 100;
        assert_eq!(status.charge_state(), ChargeState::Full);
    }

    #[test]
    fn test_level_from_millivolts_clamps() {
        assert_eq!(battery_level_from_millivolts(3_000), 0);
        assert_eq!(battery_level_from_millivolts(3_300), 0);
        assert_eq!(battery_level_from_millivolts(3_700), 50);
        assert_eq!(battery_level_from_millivolts(4_100), 100);
        assert_eq!(battery_level_from_millivolts(4_200), 100);
    }

    #[test]
    fn test_flash_led_sequence() {
        let mut power = MockPower::default();
        let mut delay = NoopDelay::default();
        block_on(flash_led(&mut power, &mut delay, 20, 6, 2)).unwrap();

        assert_eq!(power.led_writes.as_slice(), &[51, 0, 51, 0]);
        assert_eq!(delay.total_ms, 4 * 83);
    }

    #[test]
    fn test_flash_led_zero_brightness_is_noop() {
        let mut power = MockPower::default();
        let mut delay = NoopDelay::default();
        block_on(flash_led(&mut power, &mut delay, 0, 6, 2)).unwrap();
        assert!(power.led_writes.is_empty());
    }
}
