//! RGB565 palette
//!
//! The panel speaks RGB565 natively. Values match the classic TFT library
//! palette so the screens keep their familiar look; where an 8-bit colour
//! is the source it is converted with R>>3, G>>2, B>>3.

use embedded_graphics::pixelcolor::Rgb565;

pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
pub const RED: Rgb565 = Rgb565::new(31, 0, 0);
pub const GREEN: Rgb565 = Rgb565::new(0, 63, 0);
pub const BLUE: Rgb565 = Rgb565::new(0, 0, 31);
pub const CYAN: Rgb565 = Rgb565::new(0, 63, 31);
pub const ORANGE: Rgb565 = Rgb565::new(31, 45, 0);
pub const SKY_BLUE: Rgb565 = Rgb565::new(16, 51, 29);
pub const DARK_GREEN: Rgb565 = Rgb565::new(0, 31, 0);
pub const DARK_GRAY: Rgb565 = Rgb565::new(15, 31, 15);
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(26, 52, 26);

/// #FF944D, between sky blue and orange on the temperature scale
pub const LIGHT_ORANGE: Rgb565 = Rgb565::new(0xFF >> 3, 0x94 >> 2, 0x4D >> 3);

/// Update indicator while lit, rgb(100, 100, 100)
pub const INDICATOR_ON: Rgb565 = Rgb565::new(100 >> 3, 100 >> 2, 100 >> 3);
pub const INDICATOR_OFF: Rgb565 = BLACK;
