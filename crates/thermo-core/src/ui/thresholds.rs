//! Colour thresholds and the thermometer bar scale
//!
//! Thresholds are ordered tables of inclusive integer bands rather than
//! if-chains, so the boundaries can be read (and tested) as data.

use embedded_graphics::pixelcolor::Rgb565;

use super::colors::{BLUE, DARK_GRAY, DARK_GREEN, LIGHT_ORANGE, ORANGE, RED, SKY_BLUE, WHITE};

/// Inclusive band `min..=max` mapping to `value`.
#[derive(Debug, Clone, Copy)]
pub struct Band<T> {
    pub min: i32,
    pub max: i32,
    pub value: T,
}

impl<T> Band<T> {
    pub const fn new(min: i32, max: i32, value: T) -> Self {
        Self { min, max, value }
    }

    const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// First matching band wins; `fallback` covers everything else.
#[derive(Debug, Clone, Copy)]
pub struct RangeTable<T: Copy, const N: usize> {
    bands: [Band<T>; N],
    fallback: T,
}

impl<T: Copy, const N: usize> RangeTable<T, N> {
    pub const fn new(bands: [Band<T>; N], fallback: T) -> Self {
        Self { bands, fallback }
    }

    pub fn lookup(&self, value: i32) -> T {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map_or(self.fallback, |band| band.value)
    }
}

/// Temperature (whole °C) to colour. Anything colder than the blue band's
/// nominal -50 °C floor is still blue; anything above 150 °C is dark grey.
pub const TEMPERATURE_COLORS: RangeTable<Rgb565, 5> = RangeTable::new(
    [
        Band::new(i32::MIN, 15, BLUE),
        Band::new(16, 19, SKY_BLUE),
        Band::new(20, 22, LIGHT_ORANGE),
        Band::new(23, 25, ORANGE),
        Band::new(26, 150, RED),
    ],
    DARK_GRAY,
);

/// Battery percentage to colour.
pub const BATTERY_COLORS: RangeTable<Rgb565, 3> = RangeTable::new(
    [
        Band::new(i32::MIN, 19, RED),
        Band::new(20, 49, ORANGE),
        Band::new(50, i32::MAX, DARK_GREEN),
    ],
    WHITE,
);

// Thermometer bar spans 10..=40 °C
pub const BAR_MIN_CELSIUS: i32 = 10;
pub const BAR_MAX_CELSIUS: i32 = 40;
const _: () = assert!(BAR_MIN_CELSIUS < BAR_MAX_CELSIUS);

pub fn temperature_color(celsius: i32) -> Rgb565 {
    TEMPERATURE_COLORS.lookup(celsius)
}

pub fn battery_color(percent: i32) -> Rgb565 {
    BATTERY_COLORS.lookup(percent)
}

/// Nearest whole degree.
pub fn round_celsius(celsius: f32) -> i32 {
    // `f32::round` is inherent once std is linked, as under the test harness
    #[cfg_attr(test, allow(unused_imports))]
    use micromath::F32Ext;

    celsius.round() as i32
}

/// Whole degree shown on the bar, clamped to the bar's scale.
pub fn bar_celsius(celsius: f32) -> i32 {
    round_celsius(celsius).clamp(BAR_MIN_CELSIUS, BAR_MAX_CELSIUS)
}

/// Filled length of a bar `full_width` pixels long for `celsius`.
pub fn bar_fill_width(celsius: f32, full_width: u32) -> u32 {
    let span = (BAR_MAX_CELSIUS - BAR_MIN_CELSIUS) as u32;
    (bar_celsius(celsius) - BAR_MIN_CELSIUS) as u32 * full_width / span
}
