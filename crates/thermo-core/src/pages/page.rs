// src/pages/page.rs
//! Page abstraction and the enum wrapper the page manager stores.
//!
//! Each screen implements [`Page`]: a one-off draw when it becomes active
//! and a timed [`Page::refresh`] that may read the board's collaborators.
//! [`PageWrapper`] delegates to the concrete page without `dyn`.

use core::fmt::Debug;

use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::battery::BatteryPage;
use super::clock::ClockPage;
use super::page_manager::RefreshPolicy;
use super::splash::SplashPage;
use super::thermometer::ThermometerPage;
use crate::app_state::AppError;
use crate::board::{Board, Hardware};
use crate::config::{BATTERY_REFRESH_INTERVAL, CLOCK_REFRESH_INTERVAL, THERMOMETER_REFRESH_INTERVAL};
use crate::time::DateTime;

pub const PAGE_COUNT: usize = 4;

/// The screens cycled by a short click of button A, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageId {
    Clock,
    Thermometer,
    Battery,
    Splash,
}

impl PageId {
    pub const ALL: [PageId; PAGE_COUNT] = [
        PageId::Clock,
        PageId::Thermometer,
        PageId::Battery,
        PageId::Splash,
    ];

    pub const fn index(self) -> usize {
        match self {
            PageId::Clock => 0,
            PageId::Thermometer => 1,
            PageId::Battery => 2,
            PageId::Splash => 3,
        }
    }

    /// Next page in the cycle, wrapping after the splash page.
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % PAGE_COUNT]
    }

    pub const fn title(self) -> &'static str {
        match self {
            PageId::Clock => "Clock",
            PageId::Thermometer => "Thermometer",
            PageId::Battery => "Battery",
            PageId::Splash => "Splash",
        }
    }

    pub const fn refresh_policy(self) -> RefreshPolicy {
        match self {
            PageId::Clock => RefreshPolicy::Every(CLOCK_REFRESH_INTERVAL),
            PageId::Thermometer => RefreshPolicy::Every(THERMOMETER_REFRESH_INTERVAL),
            PageId::Battery => RefreshPolicy::Every(BATTERY_REFRESH_INTERVAL),
            PageId::Splash => RefreshPolicy::OncePerEntry,
        }
    }
}

/// Inputs shared by every page refresh.
#[derive(Debug, Clone, Copy)]
pub struct RefreshContext {
    pub now: Instant,
    pub local_time: DateTime,
    /// Offset added to raw probe readings
    pub correction: f32,
}

pub trait Page {
    fn id(&self) -> PageId;

    /// Draw whatever stays on screen for the lifetime of the page. Called
    /// on a freshly cleared display.
    fn on_activate<D>(&mut self, _display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        Ok(())
    }

    /// Timed redraw of the page's live content.
    fn refresh<D, H>(
        &mut self,
        display: &mut D,
        board: &mut Board<H>,
        ctx: &RefreshContext,
    ) -> impl Future<Output = Result<(), AppError>>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
        H: Hardware;
}

pub enum PageWrapper {
    Clock(ClockPage),
    Thermometer(ThermometerPage),
    Battery(BatteryPage),
    Splash(SplashPage),
}

impl PageWrapper {
    pub fn for_id(id: PageId) -> Self {
        match id {
            PageId::Clock => PageWrapper::Clock(ClockPage::new()),
            PageId::Thermometer => PageWrapper::Thermometer(ThermometerPage::new()),
            PageId::Battery => PageWrapper::Battery(BatteryPage::new()),
            PageId::Splash => PageWrapper::Splash(SplashPage::new()),
        }
    }
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Clock(page) => page.id(),
            PageWrapper::Thermometer(page) => page.id(),
            PageWrapper::Battery(page) => page.id(),
            PageWrapper::Splash(page) => page.id(),
        }
    }

    fn on_activate<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match self {
            PageWrapper::Clock(page) => page.on_activate(display),
            PageWrapper::Thermometer(page) => page.on_activate(display),
            PageWrapper::Battery(page) => page.on_activate(display),
            PageWrapper::Splash(page) => page.on_activate(display),
        }
    }

    async fn refresh<D, H>(
        &mut self,
        display: &mut D,
        board: &mut Board<H>,
        ctx: &RefreshContext,
    ) -> Result<(), AppError>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
        H: Hardware,
    {
        match self {
            PageWrapper::Clock(page) => page.refresh(display, board, ctx).await,
            PageWrapper::Thermometer(page) => page.refresh(display, board, ctx).await,
            PageWrapper::Battery(page) => page.refresh(display, board, ctx).await,
            PageWrapper::Splash(page) => page.refresh(display, board, ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cycle_wraps() {
        assert_eq!(PageId::Clock.next(), PageId::Thermometer);
        assert_eq!(PageId::Thermometer.next(), PageId::Battery);
        assert_eq!(PageId::Battery.next(), PageId::Splash);
        assert_eq!(PageId::Splash.next(), PageId::Clock);
    }

    #[test]
    fn test_four_clicks_return_to_start() {
        for start in PageId::ALL {
            let mut page = start;
            for _ in 0..PAGE_COUNT {
                page = page.next();
            }
            assert_eq!(page, start);
        }
    }

    #[test]
    fn test_wrapper_reports_its_page() {
        for id in PageId::ALL {
            assert_eq!(PageWrapper::for_id(id).id(), id);
        }
    }
}
