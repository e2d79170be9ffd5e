//! Hardware initialization and the M5StickC Plus collaborator set
//!
//! I2C0 (SDA 21, SCL 22) is shared by the AXP192 power chip and the BM8563
//! RTC. The red status LED on GPIO10 is wired active low.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use esp_hal::gpio::Output;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::Async;
use log::{error, info};
use static_cell::StaticCell;

use thermo_core::app_state::{AppError, FromUnchecked};
use thermo_core::board::Hardware;
use thermo_core::power::PowerGauge;

use crate::async_i2c_bus::AsyncI2cDevice;
use crate::axp192::Axp192;
use crate::bm8563::Bm8563;
use crate::ds18b20::Ds18b20Probe;
use crate::flash_store::FlashCorrectionStore;
use crate::wifi::WifiTimeSync;

pub type I2cBus = I2c<'static, Async>;
pub type SharedI2c = AsyncI2cDevice<'static, CriticalSectionRawMutex, I2cBus>;

/// Create the I2C0 peripheral at 400 kHz.
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO21<'static>,
    scl: esp_hal::peripherals::GPIO22<'static>,
) -> Result<I2cBus, AppError> {
    let i2c = I2c::new(i2c0, I2cConfig::default().with_frequency(Rate::from_khz(400)))
        .map_err(|_| AppError::Config(heapless::String::from_unchecked("I2C config rejected")))?;
    Ok(i2c.with_sda(sda).with_scl(scl).into_async())
}

/// Share the bus and bring up the chips on it.
///
/// Chip init failures are logged rather than returned: a dead RTC or gauge
/// still leaves a usable thermometer.
pub async fn init_i2c_hardware(i2c0: I2cBus) -> (Axp192<SharedI2c>, Bm8563<SharedI2c>) {
    static I2C0_BUS: StaticCell<AsyncMutex<CriticalSectionRawMutex, I2cBus>> = StaticCell::new();
    let bus = I2C0_BUS.init(AsyncMutex::new(i2c0));

    let mut axp = Axp192::new(AsyncI2cDevice::new(bus));
    info!("Configuring power management");
    if let Err(e) = axp.init().await {
        error!("Power init failed: {}", e);
    }

    let mut rtc = Bm8563::new(AsyncI2cDevice::new(bus));
    match rtc.init().await {
        Ok(()) => info!("RTC ready"),
        Err(e) => error!("RTC init failed: {}", e),
    }

    (axp, rtc)
}

/// AXP192 gauge plus the GPIO status LED.
pub struct StickPower {
    axp: Axp192<SharedI2c>,
    led: Output<'static>,
}

impl StickPower {
    pub fn new(axp: Axp192<SharedI2c>, mut led: Output<'static>) -> Self {
        led.set_high();
        Self { axp, led }
    }

    /// Power key short press since the last call.
    pub async fn take_power_key_click(&mut self) -> Result<bool, AppError> {
        self.axp.take_power_key_click().await
    }
}

impl PowerGauge for StickPower {
    async fn battery_level(&mut self) -> Result<u8, AppError> {
        self.axp.battery_level().await
    }

    async fn is_charging(&mut self) -> Result<bool, AppError> {
        self.axp.is_charging().await
    }

    async fn vbus_voltage(&mut self) -> Result<f32, AppError> {
        self.axp.vbus_voltage().await
    }

    /// The LED has no dimming, so any non-zero brightness lights it.
    async fn set_led(&mut self, brightness: u8) -> Result<(), AppError> {
        if brightness > 0 {
            self.led.set_low();
        } else {
            self.led.set_high();
        }
        Ok(())
    }
}

pub struct StickHardware;

impl Hardware for StickHardware {
    type Probe = Ds18b20Probe;
    type Power = StickPower;
    type Rtc = Bm8563<SharedI2c>;
    type Store = FlashCorrectionStore;
    type Net = WifiTimeSync;
}
