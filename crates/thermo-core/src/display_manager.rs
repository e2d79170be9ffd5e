//! Display manager: owns the screen and the board and runs one iteration
//! of the application loop per [`DisplayManager::tick`].
//!
//! Each tick turns the raw button levels into click/hold events and then,
//! depending on the mode, either waits out the boot splash, browses pages
//! (long press starts the page's routine, short click moves to the next
//! page, timed refresh of the active page) or drives the calibration or
//! clock resync routine until it hands control back.

use core::fmt::Debug;

use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_async::delay::DelayNs;
use log::{error, info, warn};

use crate::app_state::{AppError, AppRunState};
use crate::board::{Board, Hardware};
use crate::config::{
    BOOT_LED_BRIGHTNESS_PERCENT, BOOT_LED_FLASHES, BOOT_LED_FREQUENCY_HZ, BOOT_SPLASH_TIMEOUT, Config,
};
use crate::input::{ButtonId, ButtonTracker, InputEvents, RawButtons};
use crate::pages::calibration::{CalibrationSession, CalibrationStep};
use crate::pages::splash::draw_splash;
use crate::pages::time_sync::{SyncStep, TimeSyncSession};
use crate::pages::{PageId, PageManager, RefreshContext};
use crate::power::flash_led;
use crate::storage::{CorrectionStore, load_correction};
use crate::time::tz::TzRule;
use crate::time::{DateTime, RtcClock, SystemClock};
use crate::ui::BLACK;

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Splash on screen; the deadline is set by the first tick
    Booting { until: Option<Instant> },
    Browsing,
    Calibrating(CalibrationSession),
    SyncingClock(TimeSyncSession),
}

pub struct DisplayManager<'a, D, H>
where
    D: DrawTarget<Color = Rgb565>,
    H: Hardware,
{
    display: D,
    board: Board<H>,
    pages: PageManager,
    buttons: ButtonTracker,
    clock: SystemClock,
    timezone: TzRule,
    correction: f32,
    config: Config<'a>,
    mode: Mode,
}

impl<'a, D, H> DisplayManager<'a, D, H>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
    H: Hardware,
{
    pub fn new(display: D, board: Board<H>, config: Config<'a>) -> Result<Self, AppError> {
        let timezone = TzRule::parse(config.time.timezone)?;

        Ok(Self {
            display,
            board,
            pages: PageManager::new(PageId::Thermometer),
            buttons: ButtonTracker::new(),
            clock: SystemClock::new(&DateTime::from_unix(0), Instant::from_ticks(0)),
            timezone,
            correction: 0.0,
            config,
            mode: Mode::Booting { until: None },
        })
    }

    /// Boot sequence up to the splash screen: seed the clock from the RTC,
    /// load the correction, flash the LED and show the splash.
    pub async fn begin<Dl: DelayNs>(&mut self, delay: &mut Dl, now: Instant) -> Result<(), AppError> {
        match self.board.rtc.read_datetime().await {
            Ok(local) => {
                info!("RTC time {} {}", local.format_date(), local.format_time_12h());
                self.clock.seed(&local, now);
            }
            Err(e) => warn!("Could not read RTC, clock starts at the epoch: {}", e),
        }

        self.correction = load_correction(&mut self.board.store).await;

        if let Err(e) = flash_led(
            &mut self.board.power,
            delay,
            BOOT_LED_BRIGHTNESS_PERCENT,
            BOOT_LED_FREQUENCY_HZ,
            BOOT_LED_FLASHES,
        )
        .await
        {
            warn!("Status LED: {}", e);
        }

        self.display.clear(BLACK).map_err(AppError::display)?;
        draw_splash(&mut self.display).map_err(AppError::display)?;
        self.mode = Mode::Booting { until: None };
        Ok(())
    }

    pub fn run_state(&self) -> AppRunState {
        match self.mode {
            Mode::Booting { .. } => AppRunState::Booting,
            Mode::Browsing => AppRunState::Browsing,
            Mode::Calibrating(_) => AppRunState::Calibrating,
            Mode::SyncingClock(_) => AppRunState::SyncingClock,
        }
    }

    pub fn current_page(&self) -> PageId {
        self.pages.current_page_id()
    }

    pub fn correction(&self) -> f32 {
        self.correction
    }

    /// Current local wall-clock time.
    pub fn local_time(&self, now: Instant) -> DateTime {
        self.clock.now(now)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn board(&self) -> &Board<H> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<H> {
        &mut self.board
    }

    /// One loop iteration.
    pub async fn tick(&mut self, now: Instant, raw: RawButtons) -> Result<(), AppError> {
        let events = self.buttons.update(raw, now);

        match self.mode {
            Mode::Booting { until } => {
                let until = until.unwrap_or(now + BOOT_SPLASH_TIMEOUT);
                if events.a.pressed {
                    // The release would otherwise count as a page click
                    self.buttons.suppress_until_release(ButtonId::A);
                    self.enter_browsing(PageId::Thermometer, now)
                } else if now >= until {
                    self.enter_browsing(PageId::Thermometer, now)
                } else {
                    self.mode = Mode::Booting { until: Some(until) };
                    Ok(())
                }
            }
            Mode::Browsing => self.browse(&events, now).await,
            Mode::Calibrating(mut session) => {
                let step = session
                    .poll(&mut self.display, &events, now)
                    .map_err(AppError::display)?;
                self.mode = Mode::Calibrating(session);
                match step {
                    CalibrationStep::Continue => Ok(()),
                    CalibrationStep::Done(offset) => self.finish_calibration(offset, now).await,
                }
            }
            Mode::SyncingClock(mut session) => {
                let step = session
                    .poll(&mut self.display, &mut self.board.net, &self.config, now)
                    .map_err(AppError::display)?;
                match step {
                    SyncStep::Continue => {}
                    SyncStep::TimeReceived(unix_seconds) => {
                        let stored = self.apply_network_time(unix_seconds, now).await;
                        session
                            .complete(&mut self.display, &mut self.board.net, stored, now)
                            .map_err(AppError::display)?;
                    }
                    SyncStep::Done => return self.enter_browsing(PageId::Clock, now),
                }
                self.mode = Mode::SyncingClock(session);
                Ok(())
            }
        }
    }

    async fn browse(&mut self, events: &InputEvents, now: Instant) -> Result<(), AppError> {
        if events.a.hold_started {
            match self.pages.current_page_id() {
                PageId::Clock => {
                    let session =
                        TimeSyncSession::begin(&mut self.display, &mut self.board.net, &self.config, now)
                            .map_err(AppError::display)?;
                    self.mode = Mode::SyncingClock(session);
                    return Ok(());
                }
                PageId::Thermometer => {
                    let session = CalibrationSession::begin(&mut self.display, self.correction)
                        .map_err(AppError::display)?;
                    self.mode = Mode::Calibrating(session);
                    return Ok(());
                }
                PageId::Battery | PageId::Splash => {}
            }
        }

        if events.a.clicked {
            self.display.clear(BLACK).map_err(AppError::display)?;
            self.pages.advance(now);
            self.pages.activate(&mut self.display).map_err(AppError::display)?;
        }

        self.pages
            .expire_indicator(&mut self.display, now)
            .map_err(AppError::display)?;

        let ctx = RefreshContext {
            now,
            local_time: self.clock.now(now),
            correction: self.correction,
        };
        self.pages
            .refresh_due(&mut self.display, &mut self.board, &ctx)
            .await?;
        Ok(())
    }

    fn enter_browsing(&mut self, page: PageId, now: Instant) -> Result<(), AppError> {
        self.display.clear(BLACK).map_err(AppError::display)?;
        self.pages.enter(page, now);
        self.pages.activate(&mut self.display).map_err(AppError::display)?;
        self.mode = Mode::Browsing;
        Ok(())
    }

    async fn finish_calibration(&mut self, offset: f32, now: Instant) -> Result<(), AppError> {
        self.correction = offset;
        let saved = self.board.store.write_correction(offset).await;
        self.enter_browsing(PageId::Thermometer, now)?;

        match saved {
            Ok(()) => {
                info!("Saved temperature correction {:.2}", offset);
                Ok(())
            }
            Err(e) => {
                error!("Saving temperature correction failed: {}", e);
                Err(e)
            }
        }
    }

    /// Store NTP time in the RTC and the system clock. Returns whether the
    /// RTC write succeeded.
    async fn apply_network_time(&mut self, unix_seconds: i64, now: Instant) -> bool {
        let local = self.timezone.to_local(unix_seconds);
        info!("NTP time {} {}", local.format_date(), local.format_time_12h());
        self.clock.seed(&local, now);

        match self.board.rtc.write_datetime(&local).await {
            Ok(()) => true,
            Err(e) => {
                error!("Writing RTC failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{LinkState, SyncStatus};
    use crate::test_support::{NoopDelay, RecordingDisplay, TestHardware, test_board};
    use embassy_futures::block_on;

    type Manager = DisplayManager<'static, RecordingDisplay, TestHardware>;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn booted() -> Manager {
        let mut manager = DisplayManager::new(
            RecordingDisplay::default(),
            test_board(),
            Config::with_credentials("ssid", "secret"),
        )
        .unwrap();
        block_on(manager.begin(&mut NoopDelay::default(), at(0))).unwrap();
        manager
    }

    fn tick(manager: &mut Manager, ms: u64, raw: RawButtons) {
        block_on(manager.tick(at(ms), raw)).unwrap();
    }

    fn idle() -> RawButtons {
        RawButtons::default()
    }

    fn a_down() -> RawButtons {
        RawButtons {
            a_pressed: true,
            ..Default::default()
        }
    }

    fn b_down() -> RawButtons {
        RawButtons {
            b_pressed: true,
            ..Default::default()
        }
    }

    /// Press for three 10 ms ticks, release for three. Returns the next free
    /// time.
    fn click(manager: &mut Manager, start: u64, down: RawButtons) -> u64 {
        for step in 0..3 {
            tick(manager, start + step * 10, down);
        }
        for step in 3..6 {
            tick(manager, start + step * 10, idle());
        }
        start + 60
    }

    /// Hold button A for 600 ms, then release.
    fn hold_a(manager: &mut Manager, start: u64) -> u64 {
        let mut t = start;
        while t <= start + 600 {
            tick(manager, t, a_down());
            t += 10;
        }
        for _ in 0..3 {
            tick(manager, t, idle());
            t += 10;
        }
        t
    }

    fn browsing() -> Manager {
        let mut manager = booted();
        tick(&mut manager, 0, idle());
        tick(&mut manager, 4_100, idle());
        manager
    }

    #[test]
    fn test_boot_times_out_to_thermometer() {
        let mut manager = booted();
        assert_eq!(manager.board().power.led_writes.len(), 4);

        tick(&mut manager, 0, idle());
        tick(&mut manager, 4_099, idle());
        assert_eq!(manager.run_state(), AppRunState::Booting);

        tick(&mut manager, 4_100, idle());
        assert_eq!(manager.run_state(), AppRunState::Browsing);
        assert_eq!(manager.current_page(), PageId::Thermometer);
    }

    #[test]
    fn test_boot_skip_does_not_advance_page() {
        let mut manager = booted();
        let t = click(&mut manager, 100, a_down());
        tick(&mut manager, t, idle());
        assert_eq!(manager.run_state(), AppRunState::Browsing);
        assert_eq!(manager.current_page(), PageId::Thermometer);
    }

    #[test]
    fn test_clicks_cycle_pages() {
        let mut manager = browsing();
        let mut t = 5_000;
        let expected = [PageId::Battery, PageId::Splash, PageId::Clock, PageId::Thermometer];
        for page in expected {
            t = click(&mut manager, t, a_down());
            assert_eq!(manager.current_page(), page);
        }

        // Button B does nothing while browsing
        click(&mut manager, t, b_down());
        assert_eq!(manager.current_page(), PageId::Thermometer);
    }

    #[test]
    fn test_hold_on_battery_page_is_ignored() {
        let mut manager = browsing();
        let t = click(&mut manager, 5_000, a_down());
        assert_eq!(manager.current_page(), PageId::Battery);

        hold_a(&mut manager, t);
        assert_eq!(manager.run_state(), AppRunState::Browsing);
        assert_eq!(manager.current_page(), PageId::Battery);
    }

    #[test]
    fn test_reentering_page_refreshes_immediately() {
        let mut manager = browsing();
        let mut t = click(&mut manager, 5_000, a_down());
        assert_eq!(manager.current_page(), PageId::Battery);
        let first_visit = manager.board().power.reads;
        assert!(first_visit > 0);

        // Round the cycle and back well inside the 5 s battery interval
        for _ in 0..3 {
            t = click(&mut manager, t, a_down());
        }
        assert_eq!(manager.current_page(), PageId::Thermometer);
        assert_eq!(manager.board().power.reads, first_visit);

        t = click(&mut manager, t, a_down());
        assert_eq!(manager.current_page(), PageId::Battery);
        assert!(t < 10_000);
        assert_eq!(manager.board().power.reads, first_visit + 1);
    }

    #[test]
    fn test_calibration_persists_offset() {
        let mut manager = browsing();
        let t = hold_a(&mut manager, 5_000);
        assert_eq!(manager.run_state(), AppRunState::Calibrating);

        // Let the settle time pass
        let t = t + 800;
        tick(&mut manager, t, idle());

        let t = click(&mut manager, t + 100, b_down());
        let t = click(&mut manager, t + 400, b_down());
        let t = click(&mut manager, t + 400, b_down());
        tick(
            &mut manager,
            t + 400,
            RawButtons {
                power_clicked: true,
                ..Default::default()
            },
        );
        let t = click(&mut manager, t + 800, a_down());
        assert_eq!(manager.run_state(), AppRunState::Calibrating);

        tick(&mut manager, t + 1_100, idle());
        assert_eq!(manager.run_state(), AppRunState::Browsing);
        assert_eq!(manager.current_page(), PageId::Thermometer);
        assert!((manager.correction() - 0.4).abs() < 1e-5);
        assert_eq!(manager.board().store.stored, Some(manager.correction()));
        assert_eq!(manager.board().store.writes, 1);
    }

    #[test]
    fn test_clock_resync_writes_rtc() {
        let mut manager = browsing();
        let mut t = 5_000;
        for _ in 0..3 {
            t = click(&mut manager, t, a_down());
        }
        assert_eq!(manager.current_page(), PageId::Clock);

        let t = hold_a(&mut manager, t);
        assert_eq!(manager.run_state(), AppRunState::SyncingClock);
        assert_eq!(manager.board().net.connects, 1);

        manager.board_mut().net.link = LinkState::Up;
        tick(&mut manager, t, idle());
        manager.board_mut().net.sync = SyncStatus::Synced(1_759_673_229);
        tick(&mut manager, t + 10, idle());

        // 2025-10-05 14:07:09 UTC is 00:37:09 ACDT on the 6th
        let writes = &manager.board().rtc.writes;
        assert_eq!(writes.len(), 1);
        assert_eq!((writes[0].day(), writes[0].hour(), writes[0].minute()), (6, 0, 37));
        assert_eq!(manager.local_time(at(t + 10)), writes[0]);

        tick(&mut manager, t + 1_510, idle());
        assert_eq!(manager.run_state(), AppRunState::Browsing);
        assert_eq!(manager.current_page(), PageId::Clock);
        assert_eq!(manager.board().net.disconnects, 1);
    }

    #[test]
    fn test_invalid_timezone_is_rejected() {
        let mut config = Config::with_credentials("ssid", "secret");
        config.time.timezone = "not a zone";
        assert!(matches!(
            DisplayManager::new(RecordingDisplay::default(), test_board(), config),
            Err(AppError::Config(_))
        ));
    }
}
