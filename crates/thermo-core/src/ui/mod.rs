//! Drawing helpers shared by the pages

pub mod colors;
pub mod text;
pub mod thresholds;
pub mod widgets;

/// Landscape panel width.
pub const DISPLAY_WIDTH_PX: u32 = 240;
/// Landscape panel height.
pub const DISPLAY_HEIGHT_PX: u32 = 135;

pub use colors::*;
pub use text::{TextStyle, draw_text, text_width};
pub use thresholds::{battery_color, bar_fill_width, round_celsius, temperature_color};
