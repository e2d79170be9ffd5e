//! Minimal async AXP192 power management driver
//!
//! Only what the M5StickC Plus needs: rail setup at boot (LCD backlight and
//! logic on LDO2/LDO3), the ADCs for battery and USB voltage, the charge
//! status bit and the power key short-press interrupt.

use embedded_hal_async::i2c::I2c;
use log::{debug, info};

use thermo_core::app_state::{AppError, FromUnchecked};
use thermo_core::power::battery_level_from_millivolts;

pub const AXP192_ADDRESS: u8 = 0x34;

mod reg {
    pub const POWER_STATUS: u8 = 0x00;
    pub const CHARGE_STATUS: u8 = 0x01;
    pub const VBUS_IPSOUT: u8 = 0x30;
    pub const OUTPUT_ENABLE: u8 = 0x12;
    pub const LDO23_VOLTAGE: u8 = 0x28;
    pub const CHARGE_CONTROL_1: u8 = 0x33;
    pub const BACKUP_CHARGE: u8 = 0x35;
    pub const PEK_PARAMS: u8 = 0x36;
    pub const TEMP_PROTECTION: u8 = 0x39;
    pub const IRQ_ENABLE_3: u8 = 0x42;
    pub const IRQ_STATUS_3: u8 = 0x46;
    pub const VBUS_VOLTAGE_H: u8 = 0x5A;
    pub const BATTERY_VOLTAGE_H: u8 = 0x78;
    pub const ADC_ENABLE_1: u8 = 0x82;
}

// Output enable bits
const DCDC1: u8 = 1 << 0;
const LDO2: u8 = 1 << 2;
const LDO3: u8 = 1 << 3;
const EXTEN: u8 = 1 << 6;

const CHARGING: u8 = 1 << 6;
const VBUS_PRESENT: u8 = 1 << 5;
const PEK_SHORT_PRESS: u8 = 1 << 1;

// ADC resolution in microvolts per LSB
const BATTERY_UV_PER_LSB: u32 = 1_100;
const VBUS_UV_PER_LSB: u32 = 1_700;

/// LDO2 drives the LCD backlight; 0xC = 3.0 V
const BACKLIGHT_LEVEL: u8 = 0x0C;
/// LDO3 drives the LCD logic; 0xC = 3.0 V
const LCD_LOGIC_LEVEL: u8 = 0x0C;

pub struct Axp192<I> {
    i2c: I,
}

impl<I: I2c> Axp192<I> {
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Bring up the rails and ADCs the device relies on.
    pub async fn init(&mut self) -> Result<(), AppError> {
        // VBUS current limit off, hold IPSOUT from VBUS
        self.write(reg::VBUS_IPSOUT, 0x80).await?;
        // Charge to 4.2 V at 100 mA
        self.write(reg::CHARGE_CONTROL_1, 0xC0).await?;
        // Backup cell for the RTC: 3.0 V, 200 uA
        self.write(reg::BACKUP_CHARGE, 0xA2).await?;
        self.write(reg::TEMP_PROTECTION, 0xFC).await?;
        // Short press 128 ms, long press 1.5 s, power off after 4 s
        self.write(reg::PEK_PARAMS, 0x0C).await?;

        self.write(
            reg::LDO23_VOLTAGE,
            (BACKLIGHT_LEVEL << 4) | (LCD_LOGIC_LEVEL & 0x0F),
        )
        .await?;
        let outputs = self.read(reg::OUTPUT_ENABLE).await?;
        self.write(reg::OUTPUT_ENABLE, outputs | DCDC1 | LDO2 | LDO3 | EXTEN)
            .await?;

        self.write(reg::ADC_ENABLE_1, 0xFF).await?;

        let irq = self.read(reg::IRQ_ENABLE_3).await?;
        self.write(reg::IRQ_ENABLE_3, irq | PEK_SHORT_PRESS).await?;
        self.write(reg::IRQ_STATUS_3, PEK_SHORT_PRESS).await?;

        info!("AXP192 ready");
        Ok(())
    }

    pub async fn battery_millivolts(&mut self) -> Result<u32, AppError> {
        let raw = self.read_adc12(reg::BATTERY_VOLTAGE_H).await?;
        Ok(raw * BATTERY_UV_PER_LSB / 1_000)
    }

    pub async fn battery_level(&mut self) -> Result<u8, AppError> {
        let millivolts = self.battery_millivolts().await?;
        let level = battery_level_from_millivolts(millivolts);
        debug!("Battery at {} mV ({}%)", millivolts, level);
        Ok(level)
    }

    pub async fn is_charging(&mut self) -> Result<bool, AppError> {
        Ok(self.read(reg::CHARGE_STATUS).await? & CHARGING != 0)
    }

    /// USB bus voltage in volts; 0.0 when no cable is attached.
    pub async fn vbus_voltage(&mut self) -> Result<f32, AppError> {
        if self.read(reg::POWER_STATUS).await? & VBUS_PRESENT == 0 {
            return Ok(0.0);
        }
        let raw = self.read_adc12(reg::VBUS_VOLTAGE_H).await?;
        Ok((raw * VBUS_UV_PER_LSB) as f32 / 1_000_000.0)
    }

    /// Whether the power key was short-pressed since the last call.
    ///
    /// Clears the latched interrupt so each press is reported once.
    pub async fn take_power_key_click(&mut self) -> Result<bool, AppError> {
        let status = self.read(reg::IRQ_STATUS_3).await?;
        if status & PEK_SHORT_PRESS == 0 {
            return Ok(false);
        }
        self.write(reg::IRQ_STATUS_3, PEK_SHORT_PRESS).await?;
        Ok(true)
    }

    /// 12-bit ADC value split as 8 high bits then 4 low bits.
    async fn read_adc12(&mut self, high_register: u8) -> Result<u32, AppError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(AXP192_ADDRESS, &[high_register], &mut buf)
            .await
            .map_err(|_| power_error("ADC read failed"))?;
        Ok((u32::from(buf[0]) << 4) | u32::from(buf[1] & 0x0F))
    }

    async fn read(&mut self, register: u8) -> Result<u8, AppError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(AXP192_ADDRESS, &[register], &mut buf)
            .await
            .map_err(|_| power_error("register read failed"))?;
        Ok(buf[0])
    }

    async fn write(&mut self, register: u8, value: u8) -> Result<(), AppError> {
        self.i2c
            .write(AXP192_ADDRESS, &[register, value])
            .await
            .map_err(|_| power_error("register write failed"))
    }
}

fn power_error(context: &str) -> AppError {
    AppError::Power(heapless::String::from_unchecked(context))
}
