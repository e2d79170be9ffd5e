//! Shared page layout values

use embedded_graphics::prelude::Point;

use crate::ui::DISPLAY_WIDTH_PX;

/// Horizontal centre used by every centred line of text.
pub const CENTER_X: i32 = DISPLAY_WIDTH_PX as i32 / 2;

/// Vertical pitch of stacked text rows.
pub const LINE_HEIGHT_PX: i32 = 30;

// Clock page
pub const CLOCK_TOP_DIVIDER_Y: i32 = 10;
pub const CLOCK_WEEKDAY_Y: i32 = CLOCK_TOP_DIVIDER_Y + LINE_HEIGHT_PX - 14;
pub const CLOCK_DATE_Y: i32 = CLOCK_WEEKDAY_Y + LINE_HEIGHT_PX;
pub const CLOCK_TIME_Y: i32 = CLOCK_DATE_Y + LINE_HEIGHT_PX;
pub const CLOCK_BOTTOM_DIVIDER_Y: i32 = CLOCK_TIME_Y + LINE_HEIGHT_PX + 5;
pub const CLOCK_TEXT_PADDING: u32 = 100;

// Thermometer page
pub const READOUT_Y: i32 = 60;
pub const READOUT_PADDING: u32 = 120;
pub const PROBE_ERROR_Y: i32 = 20;
pub const PROBE_ERROR_LINE_PX: i32 = 25;

// Battery page
pub const BATTERY_LABEL_X: i32 = 15;
pub const BATTERY_VALUE_X: i32 = 90;
pub const BATTERY_VALUE_PADDING: u32 = 140;
pub const BATTERY_ICON_CENTER: Point = Point::new(DISPLAY_WIDTH_PX as i32 - 22, 67);

// Splash page
pub const SPLASH_TOP_Y: i32 = 20;
pub const SPLASH_LINE_PX: i32 = 35;

// Calibration routine
pub const CALIBRATION_TITLE_Y: i32 = 5;
pub const CALIBRATION_OFFSET_Y: i32 = 40;
pub const CALIBRATION_LABEL_X: i32 = 20;
pub const CALIBRATION_VALUE_X: i32 = 110;
pub const CALIBRATION_VALUE_PADDING: u32 = 80;

// Clock resync routine
pub const SYNC_PROGRESS_X: i32 = 40;
pub const SYNC_PROGRESS_STEP_PX: i32 = 15;
