//! Time of day page: weekday, date and 12-hour time between two dividers.

use core::fmt::Debug;

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::constants::{
    CENTER_X, CLOCK_BOTTOM_DIVIDER_Y, CLOCK_DATE_Y, CLOCK_TEXT_PADDING, CLOCK_TIME_Y,
    CLOCK_TOP_DIVIDER_Y, CLOCK_WEEKDAY_Y,
};
use super::page::{Page, PageId, RefreshContext};
use crate::app_state::AppError;
use crate::board::{Board, Hardware};
use crate::ui::widgets::draw_divider;
use crate::ui::{CYAN, LIGHT_GRAY, TextStyle, draw_text};

const WEEKDAY_STYLE: TextStyle = TextStyle::new(&FONT_10X20, LIGHT_GRAY)
    .centered()
    .padded(CLOCK_TEXT_PADDING);
const DATE_STYLE: TextStyle = TextStyle::new(&FONT_10X20, CYAN)
    .centered()
    .padded(CLOCK_TEXT_PADDING);

#[derive(Debug, Default)]
pub struct ClockPage;

impl ClockPage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for ClockPage {
    fn id(&self) -> PageId {
        PageId::Clock
    }

    fn on_activate<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        draw_divider(display, CLOCK_TOP_DIVIDER_Y)?;
        draw_divider(display, CLOCK_BOTTOM_DIVIDER_Y)
    }

    async fn refresh<D, H>(
        &mut self,
        display: &mut D,
        _board: &mut Board<H>,
        ctx: &RefreshContext,
    ) -> Result<(), AppError>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
        H: Hardware,
    {
        let now = &ctx.local_time;

        draw_text(display, now.weekday_name(), Point::new(CENTER_X, CLOCK_WEEKDAY_Y), WEEKDAY_STYLE)
            .map_err(AppError::display)?;
        draw_text(display, &now.format_date(), Point::new(CENTER_X, CLOCK_DATE_Y), DATE_STYLE)
            .map_err(AppError::display)?;
        draw_text(display, &now.format_time_12h(), Point::new(CENTER_X, CLOCK_TIME_Y), DATE_STYLE)
            .map_err(AppError::display)?;

        Ok(())
    }
}
