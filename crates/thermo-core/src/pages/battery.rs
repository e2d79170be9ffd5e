//! Battery level, charge state and USB voltage with a battery icon.

use core::fmt::{Debug, Write};

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::debug;

use super::constants::{
    BATTERY_ICON_CENTER, BATTERY_LABEL_X, BATTERY_VALUE_PADDING, BATTERY_VALUE_X, LINE_HEIGHT_PX,
};
use super::page::{Page, PageId, RefreshContext};
use crate::app_state::AppError;
use crate::board::{Board, Hardware};
use crate::power::{BatteryStatus, read_battery_status};
use crate::ui::widgets::draw_battery_icon;
use crate::ui::{CYAN, DARK_GRAY, ORANGE, TextStyle, battery_color, draw_text};

const LABEL_STYLE: TextStyle = TextStyle::new(&FONT_10X20, ORANGE);

fn value_style(color: Rgb565) -> TextStyle {
    TextStyle::new(&FONT_10X20, color).padded(BATTERY_VALUE_PADDING)
}

#[derive(Debug, Default)]
pub struct BatteryPage;

impl BatteryPage {
    pub fn new() -> Self {
        Self
    }

    fn draw_status<D>(&self, display: &mut D, status: &BatteryStatus) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let mut level = heapless::String::<8>::new();
        let _ = write!(level, "{}%", status.level);
        let mut vbus = heapless::String::<12>::new();
        let _ = write!(vbus, "{:.1} V", status.vbus_volts);

        let rows = [
            ("Level:", level.as_str(), battery_color(i32::from(status.level))),
            ("State:", status.charge_state().label(), DARK_GRAY),
            ("USB:", vbus.as_str(), CYAN),
        ];

        for (row, (label, value, color)) in rows.into_iter().enumerate() {
            let y = LINE_HEIGHT_PX * (row as i32 + 1);
            draw_text(display, label, Point::new(BATTERY_LABEL_X, y), LABEL_STYLE)?;
            draw_text(display, value, Point::new(BATTERY_VALUE_X, y), value_style(color))?;
        }

        draw_battery_icon(display, BATTERY_ICON_CENTER, status.level, status.charging)
    }
}

impl Page for BatteryPage {
    fn id(&self) -> PageId {
        PageId::Battery
    }

    async fn refresh<D, H>(
        &mut self,
        display: &mut D,
        board: &mut Board<H>,
        _ctx: &RefreshContext,
    ) -> Result<(), AppError>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
        H: Hardware,
    {
        let status = read_battery_status(&mut board.power).await?;
        debug!(
            "Battery {}% {} VBUS {:.2} V",
            status.level,
            status.charge_state().label(),
            status.vbus_volts
        );
        self.draw_status(display, &status).map_err(AppError::display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingDisplay, test_board};
    use crate::time::DateTime;
    use crate::ui::{DARK_GREEN, RED};
    use embassy_futures::block_on;
    use embassy_time::Instant;

    fn ctx() -> RefreshContext {
        RefreshContext {
            now: Instant::from_millis(0),
            local_time: DateTime::from_unix(0),
            correction: 0.0,
        }
    }

    #[test]
    fn test_level_colour_follows_charge() {
        let mut page = BatteryPage::new();
        let mut board = test_board();

        let mut display = RecordingDisplay::default();
        board.power.level = 75;
        block_on(page.refresh(&mut display, &mut board, &ctx())).unwrap();
        assert!(display.count_color(DARK_GREEN) > 0);
        assert_eq!(display.count_color(RED), 0);

        let mut display = RecordingDisplay::default();
        board.power.level = 10;
        block_on(page.refresh(&mut display, &mut board, &ctx())).unwrap();
        assert!(display.count_color(RED) > 0);
        assert_eq!(display.count_color(DARK_GREEN), 0);
    }

    #[test]
    fn test_rows_use_label_colours() {
        let mut page = BatteryPage::new();
        let mut board = test_board();
        let mut display = RecordingDisplay::default();

        block_on(page.refresh(&mut display, &mut board, &ctx())).unwrap();
        assert!(display.count_color(ORANGE) > 0);
        assert!(display.count_color(CYAN) > 0);
        assert!(display.count_color(DARK_GRAY) > 0);
    }
}
