//! BM8563 real-time clock over async I2C
//!
//! The chip keeps local time in BCD registers 0x02..=0x08. Bit 7 of the
//! seconds register flags a voltage drop (time no longer trustworthy), bit
//! 7 of the month register selects the 1900s.

use embedded_hal_async::i2c::I2c;
use log::warn;

use thermo_core::app_state::{AppError, FromUnchecked};
use thermo_core::time::{DateTime, RtcClock};

pub const BM8563_ADDRESS: u8 = 0x51;

const CONTROL_1: u8 = 0x00;
const SECONDS: u8 = 0x02;

const VOLTAGE_LOW: u8 = 0x80;
const CENTURY_1900: u8 = 0x80;

/// Time reported when the chip lost power and holds garbage.
const FALLBACK_UNIX: i64 = 1_735_689_600; // 2025-01-01 00:00:00

pub struct Bm8563<I> {
    i2c: I,
}

impl<I: I2c> Bm8563<I> {
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Clear the STOP and TEST bits so the oscillator runs.
    pub async fn init(&mut self) -> Result<(), AppError> {
        self.i2c
            .write(BM8563_ADDRESS, &[CONTROL_1, 0x00])
            .await
            .map_err(|_| rtc_error("control write failed"))
    }
}

impl<I: I2c> RtcClock for Bm8563<I> {
    async fn read_datetime(&mut self) -> Result<DateTime, AppError> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(BM8563_ADDRESS, &[SECONDS], &mut regs)
            .await
            .map_err(|_| rtc_error("time read failed"))?;

        if regs[0] & VOLTAGE_LOW != 0 {
            warn!("RTC reports a voltage drop, time may be wrong");
        }

        let century = if regs[5] & CENTURY_1900 != 0 { 1900 } else { 2000 };
        let decoded = DateTime::new(
            century + u16::from(from_bcd(regs[6])),
            from_bcd(regs[5] & 0x1F),
            from_bcd(regs[3] & 0x3F),
            from_bcd(regs[2] & 0x3F),
            from_bcd(regs[1] & 0x7F),
            from_bcd(regs[0] & 0x7F),
        );

        Ok(decoded.unwrap_or_else(|| {
            warn!("RTC holds an invalid date, falling back");
            DateTime::from_unix(FALLBACK_UNIX)
        }))
    }

    async fn write_datetime(&mut self, datetime: &DateTime) -> Result<(), AppError> {
        let full_year = datetime.year();
        let (century, year) = if full_year >= 2000 {
            (0, full_year - 2000)
        } else {
            (CENTURY_1900, full_year.saturating_sub(1900))
        };

        let frame = [
            SECONDS,
            to_bcd(datetime.second()),
            to_bcd(datetime.minute()),
            to_bcd(datetime.hour()),
            to_bcd(datetime.day()),
            datetime.weekday().number_days_from_sunday(),
            to_bcd(datetime.month()) | century,
            to_bcd((year % 100) as u8),
        ];

        self.i2c
            .write(BM8563_ADDRESS, &frame)
            .await
            .map_err(|_| rtc_error("time write failed"))
    }
}

const fn from_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

const fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

fn rtc_error(context: &str) -> AppError {
    AppError::Rtc(heapless::String::from_unchecked(context))
}
