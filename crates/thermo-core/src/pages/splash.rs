//! Title, author and firmware version.

use core::fmt::{Debug, Write};

use embedded_graphics::mono_font::ascii::{FONT_9X15, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::constants::{CENTER_X, SPLASH_LINE_PX, SPLASH_TOP_Y};
use super::page::{Page, PageId, RefreshContext};
use crate::app_state::AppError;
use crate::board::{Board, Hardware};
use crate::ui::{CYAN, GREEN, LIGHT_GRAY, TextStyle, draw_text};

pub const TITLE: &str = "Thermometer LCD";
pub const AUTHOR: &str = "by Patrick Felstead";

#[derive(Debug, Default)]
pub struct SplashPage;

impl SplashPage {
    pub fn new() -> Self {
        Self
    }
}

/// Draw the splash text. Also used on its own during boot.
pub fn draw_splash<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut version = heapless::String::<24>::new();
    let _ = write!(version, "v{}", env!("CARGO_PKG_VERSION"));

    let lines = [
        (TITLE, TextStyle::new(&FONT_10X20, GREEN)),
        (AUTHOR, TextStyle::new(&FONT_10X20, CYAN)),
        (version.as_str(), TextStyle::new(&FONT_9X15, LIGHT_GRAY)),
    ];

    for (row, (text, style)) in lines.into_iter().enumerate() {
        let y = SPLASH_TOP_Y + SPLASH_LINE_PX * row as i32;
        draw_text(display, text, Point::new(CENTER_X, y), style.centered())?;
    }
    Ok(())
}

impl Page for SplashPage {
    fn id(&self) -> PageId {
        PageId::Splash
    }

    async fn refresh<D, H>(
        &mut self,
        display: &mut D,
        _board: &mut Board<H>,
        _ctx: &RefreshContext,
    ) -> Result<(), AppError>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
        H: Hardware,
    {
        draw_splash(display).map_err(AppError::display)
    }
}
