//! Anchored, padded text
//!
//! Text is positioned by its top edge and an alignment anchor. A padding
//! width erases at least that many pixels behind the string before it is
//! drawn, so a shorter value fully replaces a longer one drawn earlier.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use super::colors::BLACK;

#[derive(Clone, Copy)]
pub struct TextStyle {
    pub font: &'static MonoFont<'static>,
    pub color: Rgb565,
    pub alignment: Alignment,
    pub padding: u32,
}

impl TextStyle {
    pub const fn new(font: &'static MonoFont<'static>, color: Rgb565) -> Self {
        Self {
            font,
            color,
            alignment: Alignment::Left,
            padding: 0,
        }
    }

    pub const fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    pub const fn padded(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub const fn line_height(&self) -> u32 {
        self.font.character_size.height
    }
}

/// Pixel width of `text` rendered in `font`.
pub fn text_width(text: &str, font: &MonoFont<'_>) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * font.character_size.width + (chars - 1) * font.character_spacing
}

/// Left edge of a run `width` pixels wide anchored at `x`.
pub fn aligned_left(x: i32, width: u32, alignment: Alignment) -> i32 {
    match alignment {
        Alignment::Left => x,
        Alignment::Center => x - (width / 2) as i32,
        Alignment::Right => x - width as i32,
    }
}

/// Draw `text` with its top edge at `anchor.y`.
pub fn draw_text<D>(display: &mut D, text: &str, anchor: Point, style: TextStyle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if style.padding > 0 {
        let erase_width = text_width(text, style.font).max(style.padding);
        Rectangle::new(
            Point::new(aligned_left(anchor.x, erase_width, style.alignment), anchor.y),
            Size::new(erase_width, style.line_height()),
        )
        .into_styled(PrimitiveStyle::with_fill(BLACK))
        .draw(display)?;
    }

    let character_style = MonoTextStyleBuilder::new()
        .font(style.font)
        .text_color(style.color)
        .background_color(BLACK)
        .build();
    let text_style = TextStyleBuilder::new()
        .alignment(style.alignment)
        .baseline(Baseline::Top)
        .build();

    Text::with_text_style(text, anchor, character_style, text_style).draw(display)?;
    Ok(())
}
