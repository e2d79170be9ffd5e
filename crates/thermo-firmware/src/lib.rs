//! ESP32 firmware-specific modules for thermo-lcd
//!
//! Everything in here touches M5StickC Plus peripherals directly: the
//! shared I2C bus and the AXP192/BM8563 chips on it, the DS18B20 probe on
//! the Grove port, the flash record holding the temperature correction and
//! the WiFi/SNTP tasks. The application itself lives in `thermo-core`.

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod async_i2c_bus;
pub mod axp192;
pub mod bm8563;
pub mod ds18b20;
pub mod flash_store;
pub mod wifi;
pub mod wifi_secrets;
