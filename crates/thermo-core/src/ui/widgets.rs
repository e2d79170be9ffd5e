//! Reusable screen elements: update indicator, dividers, the thermometer
//! bar with its scale, and the battery icon.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle,
};

use super::colors::{BLACK, DARK_GRAY, INDICATOR_OFF, INDICATOR_ON, LIGHT_GRAY, ORANGE, WHITE};
use super::text::{TextStyle, draw_text};
use super::thresholds::{BAR_MAX_CELSIUS, BAR_MIN_CELSIUS, bar_celsius, bar_fill_width, battery_color, temperature_color};
use super::DISPLAY_WIDTH_PX;

// ---------------------------------------------------------------------------
// Update indicator
// ---------------------------------------------------------------------------

pub const INDICATOR_RADIUS: u32 = 8;
pub const INDICATOR_CENTER: Point = Point::new(DISPLAY_WIDTH_PX as i32 - 12, 13);

pub fn draw_update_indicator<D>(display: &mut D, lit: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = if lit { INDICATOR_ON } else { INDICATOR_OFF };
    Circle::with_center(INDICATOR_CENTER, INDICATOR_RADIUS * 2 + 1)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
}

// ---------------------------------------------------------------------------
// Dividers
// ---------------------------------------------------------------------------

/// Horizontal inset of the clock page dividers.
pub const DIVIDER_MARGIN: i32 = 40;

pub fn draw_divider<D>(display: &mut D, y: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Line::new(
        Point::new(DIVIDER_MARGIN, y),
        Point::new(DISPLAY_WIDTH_PX as i32 - DIVIDER_MARGIN, y),
    )
    .into_styled(PrimitiveStyle::with_stroke(DARK_GRAY, 1))
    .draw(display)
}

// ---------------------------------------------------------------------------
// Thermometer bar
// ---------------------------------------------------------------------------

pub const BAR_WIDTH: u32 = 200;
pub const BAR_HEIGHT: u32 = 25;
const BAR_CORNER_RADIUS: u32 = 5;
pub const BAR_ORIGIN: Point = Point::new(DISPLAY_WIDTH_PX as i32 / 2 - BAR_WIDTH as i32 / 2 - 5, 2);

const SCALE_LEFT: i32 = 16;
const SCALE_MINOR_TICKS: i32 = 18;
const SCALE_MAJOR_TICKS: i32 = 6;
const SCALE_MINOR_BASE: i32 = 30;
const SCALE_MAJOR_BASE: i32 = 36;
const _: () = assert!((BAR_MAX_CELSIUS - BAR_MIN_CELSIUS) % SCALE_MAJOR_TICKS == 0);

/// Tick marks and degree labels under the bar. Drawn once when the
/// thermometer page is entered.
pub fn draw_bargraph_scale<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let span = BAR_WIDTH as i32;

    for i in 0..=SCALE_MINOR_TICKS {
        let x = SCALE_LEFT + i * span / SCALE_MINOR_TICKS;
        Line::new(Point::new(x, SCALE_MINOR_BASE - 4), Point::new(x, SCALE_MINOR_BASE))
            .into_styled(PrimitiveStyle::with_stroke(DARK_GRAY, 1))
            .draw(display)?;
    }

    let label_style = TextStyle::new(&FONT_6X10, WHITE).centered();
    let degrees_per_tick = (BAR_MAX_CELSIUS - BAR_MIN_CELSIUS) / SCALE_MAJOR_TICKS;
    for i in 0..=SCALE_MAJOR_TICKS {
        let x = SCALE_LEFT + i * span / SCALE_MAJOR_TICKS;
        Line::new(Point::new(x, SCALE_MAJOR_BASE - 10), Point::new(x, SCALE_MAJOR_BASE))
            .into_styled(PrimitiveStyle::with_stroke(WHITE, 1))
            .draw(display)?;

        let mut label = heapless::String::<4>::new();
        let _ = write!(label, "{}", BAR_MIN_CELSIUS + i * degrees_per_tick);
        draw_text(display, &label, Point::new(x, SCALE_MAJOR_BASE + 2), label_style)?;
    }

    Ok(())
}

/// Outline plus a fill proportional to `celsius` on the 10-40 °C scale.
pub fn draw_temperature_bar<D>(display: &mut D, celsius: f32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let frame = Rectangle::new(BAR_ORIGIN, Size::new(BAR_WIDTH, BAR_HEIGHT));
    let corners = Size::new(BAR_CORNER_RADIUS, BAR_CORNER_RADIUS);

    frame
        .into_styled(PrimitiveStyle::with_fill(BLACK))
        .draw(display)?;
    RoundedRectangle::with_equal_corners(frame, corners)
        .into_styled(PrimitiveStyle::with_stroke(LIGHT_GRAY, 1))
        .draw(display)?;

    let fill_width = bar_fill_width(celsius, BAR_WIDTH).saturating_sub(2);
    if fill_width > 0 {
        let fill = Rectangle::new(BAR_ORIGIN + Point::new(1, 1), Size::new(fill_width, BAR_HEIGHT - 2));
        RoundedRectangle::with_equal_corners(fill, corners)
            .into_styled(PrimitiveStyle::with_fill(temperature_color(bar_celsius(celsius))))
            .draw(display)?;
    }

    Ok(())
}

/// Ring used as a degree sign.
pub fn draw_degree_mark<D>(display: &mut D, center: Point, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for radius in [7u32, 6] {
        Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(display)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Battery icon
// ---------------------------------------------------------------------------

// Upright battery: terminal on top, fill rising from the bottom.
const BATTERY_BODY: Size = Size::new(18, 39);
const BATTERY_TERMINAL: Size = Size::new(8, 5);
const BATTERY_TERMINAL_GAP: u32 = 1;
const BATTERY_INNER_HEIGHT: u32 = BATTERY_BODY.height - 2;

/// Filled height in pixels of the battery body for `percent` charge.
pub fn battery_fill_height(percent: u8) -> u32 {
    u32::from(percent.min(100)) * BATTERY_INNER_HEIGHT / 100
}

/// Battery icon centred on `center`; the lightning bolt marks charging.
pub fn draw_battery_icon<D>(display: &mut D, center: Point, percent: u8, charging: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let total_height = (BATTERY_TERMINAL.height + BATTERY_TERMINAL_GAP + BATTERY_BODY.height) as i32;
    let top = center.y - total_height / 2;

    let terminal = Rectangle::new(
        Point::new(center.x - BATTERY_TERMINAL.width as i32 / 2, top),
        BATTERY_TERMINAL,
    );
    let body_top = top + (BATTERY_TERMINAL.height + BATTERY_TERMINAL_GAP) as i32;
    let body = Rectangle::new(
        Point::new(center.x - BATTERY_BODY.width as i32 / 2, body_top),
        BATTERY_BODY,
    );

    // Clear the whole icon area before redrawing
    Rectangle::new(
        Point::new(body.top_left.x, top),
        Size::new(BATTERY_BODY.width, total_height as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(BLACK))
    .draw(display)?;

    terminal
        .into_styled(PrimitiveStyle::with_fill(LIGHT_GRAY))
        .draw(display)?;
    body.into_styled(PrimitiveStyle::with_stroke(LIGHT_GRAY, 1))
        .draw(display)?;

    let fill_height = battery_fill_height(percent);
    if fill_height > 0 {
        let body_bottom = body_top + BATTERY_BODY.height as i32 - 1;
        Rectangle::new(
            Point::new(body.top_left.x + 1, body_bottom - fill_height as i32),
            Size::new(BATTERY_BODY.width - 2, fill_height),
        )
        .into_styled(PrimitiveStyle::with_fill(battery_color(i32::from(percent))))
        .draw(display)?;
    }

    if charging {
        let bolt_center = body.center();
        let bolt = PrimitiveStyle::with_fill(ORANGE);
        Triangle::new(
            bolt_center + Point::new(-3, 20),
            bolt_center,
            bolt_center + Point::new(8, -3),
        )
        .into_styled(bolt)
        .draw(display)?;
        Triangle::new(
            bolt_center + Point::new(3, -20),
            bolt_center,
            bolt_center + Point::new(-8, 3),
        )
        .into_styled(bolt)
        .draw(display)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingDisplay;

    #[test]
    fn test_battery_fill_height() {
        assert_eq!(battery_fill_height(0), 0);
        assert_eq!(battery_fill_height(50), 18);
        assert_eq!(battery_fill_height(100), BATTERY_INNER_HEIGHT);
        assert_eq!(battery_fill_height(250), BATTERY_INNER_HEIGHT);
    }

    #[test]
    fn test_bar_origin_matches_layout() {
        assert_eq!(BAR_ORIGIN, Point::new(15, 2));
    }

    #[test]
    fn test_empty_bar_draws_only_frame() {
        let mut display = RecordingDisplay::default();
        draw_temperature_bar(&mut display, 5.0).unwrap();
        assert_eq!(display.count_color(temperature_color(10)), 0);

        let mut display = RecordingDisplay::default();
        draw_temperature_bar(&mut display, 40.0).unwrap();
        assert!(display.count_color(temperature_color(40)) > 0);
    }

    #[test]
    fn test_indicator_lit_and_erased() {
        let mut display = RecordingDisplay::default();
        draw_update_indicator(&mut display, true).unwrap();
        assert!(display.count_color(INDICATOR_ON) > 0);
        assert_eq!(display.pixel(INDICATOR_CENTER), Some(INDICATOR_ON));

        draw_update_indicator(&mut display, false).unwrap();
        assert_eq!(display.pixel(INDICATOR_CENTER), Some(INDICATOR_OFF));
    }
}
