//! Large corrected temperature readout and colour-coded bar.

use core::fmt::{Debug, Write};

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, warn};
use profont::PROFONT_24_POINT;

use super::constants::{CENTER_X, PROBE_ERROR_LINE_PX, PROBE_ERROR_Y, READOUT_PADDING, READOUT_Y};
use super::page::{Page, PageId, RefreshContext};
use crate::app_state::AppError;
use crate::board::{Board, Hardware};
use crate::sensors::{PROBE_NAME, SensorError, read_temperature};
use crate::ui::text::aligned_left;
use crate::ui::widgets::{draw_bargraph_scale, draw_degree_mark, draw_temperature_bar};
use crate::ui::{BLACK, RED, TextStyle, draw_text, round_celsius, temperature_color, text_width};

/// Colour is replaced per reading from the temperature table.
const READOUT_STYLE: TextStyle = TextStyle::new(&PROFONT_24_POINT, RED)
    .centered()
    .padded(READOUT_PADDING);
const ERROR_STYLE: TextStyle = TextStyle::new(&FONT_10X20, RED).centered();

#[derive(Debug, Default)]
pub struct ThermometerPage {
    /// The error screen replaced the scale and must be cleared away.
    probe_missing: bool,
}

impl ThermometerPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe_missing(&self) -> bool {
        self.probe_missing
    }

    fn draw_reading<D>(&mut self, display: &mut D, celsius: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if self.probe_missing {
            display.clear(BLACK)?;
            draw_bargraph_scale(display)?;
            self.probe_missing = false;
        }

        let color = temperature_color(round_celsius(celsius));
        let style = TextStyle {
            color,
            ..READOUT_STYLE
        };

        let mut text = heapless::String::<16>::new();
        let _ = write!(text, "{:.1} C", celsius);
        draw_text(display, &text, Point::new(CENTER_X, READOUT_Y), style)?;

        // Degree ring sits over the space before the unit
        let font = style.font;
        let left = aligned_left(CENTER_X, text_width(&text, font), style.alignment);
        let glyph_pitch = (font.character_size.width + font.character_spacing) as i32;
        let space_index = text.chars().count() as i32 - 2;
        let ring_center = Point::new(
            left + space_index * glyph_pitch + font.character_size.width as i32 / 2,
            READOUT_Y + 8,
        );
        draw_degree_mark(display, ring_center, color)?;

        draw_temperature_bar(display, celsius)
    }

    fn draw_probe_error<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        display.clear(BLACK)?;
        draw_text(display, PROBE_NAME, Point::new(CENTER_X, PROBE_ERROR_Y), ERROR_STYLE)?;
        draw_text(
            display,
            "Not connected",
            Point::new(CENTER_X, PROBE_ERROR_Y + PROBE_ERROR_LINE_PX),
            ERROR_STYLE,
        )?;
        self.probe_missing = true;
        Ok(())
    }
}

impl Page for ThermometerPage {
    fn id(&self) -> PageId {
        PageId::Thermometer
    }

    fn on_activate<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.probe_missing = false;
        draw_bargraph_scale(display)
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
        match read_temperature(&mut board.probe).await {
            Ok(raw) => {
                let celsius = raw + ctx.correction;
                debug!("{} temperature {:.1} C (raw {:.2})", PROBE_NAME, celsius, raw);
                self.draw_reading(display, celsius).map_err(AppError::display)
            }
            Err(SensorError::NotConnected { sensor }) => {
                warn!("{} not connected", sensor);
                self.draw_probe_error(display).map_err(AppError::display)
            }
            Err(err) => Err(err.into()),
        }
    }
}
