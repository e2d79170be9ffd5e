//! Mocks shared by the unit tests.

extern crate std;

use std::vec;
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_async::delay::DelayNs;

use crate::app_state::{AppError, FromUnchecked};
use crate::board::{Board, Hardware};
use crate::net::{LinkState, SyncStatus, TimeSyncService};
use crate::power::PowerGauge;
use crate::sensors::{SensorError, TemperatureProbe};
use crate::storage::CorrectionStore;
use crate::time::{DateTime, RtcClock};
use crate::ui::{BLACK, DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

/// In-memory frame buffer the size of the panel.
pub struct RecordingDisplay {
    pixels: Vec<Rgb565>,
    pub clears: usize,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self {
            pixels: vec![BLACK; (DISPLAY_WIDTH_PX * DISPLAY_HEIGHT_PX) as usize],
            clears: 0,
        }
    }
}

impl RecordingDisplay {
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x >= DISPLAY_WIDTH_PX || y >= DISPLAY_HEIGHT_PX {
            return None;
        }
        self.pixels.get((y * DISPLAY_WIDTH_PX + x) as usize).copied()
    }

    pub fn count_color(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }
}

impl OriginDimensions for RecordingDisplay {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
    }
}

impl DrawTarget for RecordingDisplay {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < DISPLAY_WIDTH_PX
                && (point.y as u32) < DISPLAY_HEIGHT_PX
            {
                let index = (point.y as u32 * DISPLAY_WIDTH_PX + point.x as u32) as usize;
                self.pixels[index] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clears += 1;
        self.pixels.fill(color);
        Ok(())
    }
}

#[derive(Default)]
pub struct NoopDelay {
    pub total_ms: u32,
}

impl DelayNs for NoopDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}

pub struct MockProbe {
    pub connected: bool,
    pub celsius: f32,
    pub polls_until_ready: u32,
    pub requests: u32,
    polls: u32,
}

impl MockProbe {
    pub fn connected(celsius: f32) -> Self {
        Self {
            connected: true,
            celsius,
            polls_until_ready: 0,
            requests: 0,
            polls: 0,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::connected(0.0)
        }
    }
}

impl TemperatureProbe for MockProbe {
    async fn is_connected(&mut self) -> bool {
        self.connected
    }

    async fn request_temperatures(&mut self) -> Result<(), SensorError> {
        self.requests += 1;
        self.polls = 0;
        Ok(())
    }

    async fn is_conversion_complete(&mut self) -> Result<bool, SensorError> {
        let ready = self.polls >= self.polls_until_ready;
        self.polls = self.polls.saturating_add(1);
        Ok(ready)
    }

    async fn temperature_celsius(&mut self) -> Result<f32, SensorError> {
        Ok(self.celsius)
    }
}

#[derive(Default)]
pub struct MockPower {
    pub level: u8,
    pub charging: bool,
    pub vbus_volts: f32,
    pub led_writes: Vec<u8>,
    pub reads: u32,
}

impl PowerGauge for MockPower {
    async fn battery_level(&mut self) -> Result<u8, AppError> {
        self.reads += 1;
        Ok(self.level)
    }

    async fn is_charging(&mut self) -> Result<bool, AppError> {
        Ok(self.charging)
    }

    async fn vbus_voltage(&mut self) -> Result<f32, AppError> {
        Ok(self.vbus_volts)
    }

    async fn set_led(&mut self, brightness: u8) -> Result<(), AppError> {
        self.led_writes.push(brightness);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockRtc {
    pub now: Option<DateTime>,
    pub writes: Vec<DateTime>,
}

impl RtcClock for MockRtc {
    async fn read_datetime(&mut self) -> Result<DateTime, AppError> {
        self.now
            .ok_or_else(|| AppError::Rtc(heapless::String::from_unchecked("clock not set")))
    }

    async fn write_datetime(&mut self, datetime: &DateTime) -> Result<(), AppError> {
        self.now = Some(*datetime);
        self.writes.push(*datetime);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockStore {
    pub stored: Option<f32>,
    pub writes: u32,
}

impl CorrectionStore for MockStore {
    async fn read_correction(&mut self) -> Result<Option<f32>, AppError> {
        Ok(self.stored)
    }

    async fn write_correction(&mut self, value: f32) -> Result<(), AppError> {
        self.stored = Some(value);
        self.writes += 1;
        Ok(())
    }
}

/// Network double driven directly by the test.
pub struct MockNet {
    pub link: LinkState,
    pub sync: SyncStatus,
    pub connects: u32,
    pub disconnects: u32,
    pub sync_server: Option<std::string::String>,
}

impl Default for MockNet {
    fn default() -> Self {
        Self {
            link: LinkState::Down,
            sync: SyncStatus::Idle,
            connects: 0,
            disconnects: 0,
            sync_server: None,
        }
    }
}

impl TimeSyncService for MockNet {
    fn connect(&mut self, _ssid: &str, _password: &str) -> Result<(), AppError> {
        self.connects += 1;
        if self.link == LinkState::Down {
            self.link = LinkState::Connecting;
        }
        Ok(())
    }

    fn link_state(&mut self) -> LinkState {
        self.link
    }

    fn start_sync(&mut self, server: &str) -> Result<(), AppError> {
        self.sync_server = Some(server.into());
        if self.sync == SyncStatus::Idle {
            self.sync = SyncStatus::InProgress;
        }
        Ok(())
    }

    fn sync_status(&mut self) -> SyncStatus {
        self.sync
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.link = LinkState::Down;
    }
}

pub struct TestHardware;

impl Hardware for TestHardware {
    type Probe = MockProbe;
    type Power = MockPower;
    type Rtc = MockRtc;
    type Store = MockStore;
    type Net = MockNet;
}

pub fn test_board() -> Board<TestHardware> {
    Board::new(
        MockProbe::connected(22.0),
        MockPower {
            level: 75,
            vbus_volts: 5.0,
            ..Default::default()
        },
        MockRtc {
            now: DateTime::new(2025, 10, 5, 14, 7, 9),
            writes: Vec::new(),
        },
        MockStore::default(),
        MockNet::default(),
    )
}
