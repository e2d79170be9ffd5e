//! Interactive temperature offset adjustment.
//!
//! Entered by holding button A on the thermometer page. Button B raises the
//! offset, the power key lowers it and a click of A finishes. The session
//! only tracks the offset and the screen; saving it is left to the caller.

use core::fmt::Write;

use embassy_time::Instant;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, info};

use super::constants::{
    CALIBRATION_LABEL_X, CALIBRATION_OFFSET_Y, CALIBRATION_TITLE_Y, CALIBRATION_VALUE_PADDING,
    CALIBRATION_VALUE_X, CENTER_X, LINE_HEIGHT_PX,
};
use crate::config::{
    CALIBRATION_FINISHED_HOLD, CALIBRATION_SETTLE_TIME, CALIBRATION_STEP, CALIBRATION_STEP_DEBOUNCE,
};
use crate::input::InputEvents;
use crate::ui::{BLACK, CYAN, GREEN, ORANGE, TextStyle, draw_text};

const TITLE_STYLE: TextStyle = TextStyle::new(&FONT_10X20, GREEN).centered();
const LABEL_STYLE: TextStyle = TextStyle::new(&FONT_10X20, ORANGE);
const VALUE_STYLE: TextStyle = TextStyle::new(&FONT_10X20, CYAN).padded(CALIBRATION_VALUE_PADDING);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    /// Button A is still down from the hold that started the session
    AwaitRelease,
    Settling { until: Instant },
    /// Input is ignored until `ignore_until` after each step
    Adjusting { ignore_until: Option<Instant> },
    Confirming { until: Instant },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    Continue,
    /// The session is over; carries the final offset
    Done(f32),
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationSession {
    phase: CalibrationPhase,
    offset: f32,
}

impl CalibrationSession {
    /// Clear the screen and show the current offset.
    pub fn begin<D>(display: &mut D, offset: f32) -> Result<Self, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        info!("Calibration started, offset {:.2}", offset);
        display.clear(BLACK)?;
        draw_text(display, "Calibrate Temp.", Point::new(CENTER_X, CALIBRATION_TITLE_Y), TITLE_STYLE)?;
        draw_text(
            display,
            "Offset:",
            Point::new(CALIBRATION_LABEL_X, CALIBRATION_OFFSET_Y),
            LABEL_STYLE,
        )?;

        let session = Self {
            phase: CalibrationPhase::AwaitRelease,
            offset,
        };
        session.draw_offset(display)?;
        Ok(session)
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    fn draw_offset<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let mut text = heapless::String::<16>::new();
        let _ = write!(text, "{:.2}", self.offset);
        draw_text(
            display,
            &text,
            Point::new(CALIBRATION_VALUE_X, CALIBRATION_OFFSET_Y),
            VALUE_STYLE,
        )
    }

    fn step<D>(&mut self, display: &mut D, delta: f32, now: Instant) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.offset += delta;
        debug!("Calibration offset {:.2}", self.offset);
        self.draw_offset(display)?;
        self.phase = CalibrationPhase::Adjusting {
            ignore_until: Some(now + CALIBRATION_STEP_DEBOUNCE),
        };
        Ok(())
    }

    /// Advance the session by one loop iteration.
    pub fn poll<D>(&mut self, display: &mut D, events: &InputEvents, now: Instant) -> Result<CalibrationStep, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match self.phase {
            CalibrationPhase::AwaitRelease => {
                if !events.a.pressed {
                    self.phase = CalibrationPhase::Settling {
                        until: now + CALIBRATION_SETTLE_TIME,
                    };
                }
            }
            CalibrationPhase::Settling { until } => {
                if now >= until {
                    self.phase = CalibrationPhase::Adjusting { ignore_until: None };
                }
            }
            CalibrationPhase::Adjusting { ignore_until } => {
                if ignore_until.is_some_and(|t| now < t) {
                    return Ok(CalibrationStep::Continue);
                }

                if events.b.clicked {
                    self.step(display, CALIBRATION_STEP, now)?;
                } else if events.power.clicked {
                    self.step(display, -CALIBRATION_STEP, now)?;
                } else if events.a.clicked {
                    draw_text(
                        display,
                        "Finished!",
                        Point::new(CENTER_X, CALIBRATION_OFFSET_Y + LINE_HEIGHT_PX),
                        TITLE_STYLE,
                    )?;
                    self.phase = CalibrationPhase::Confirming {
                        until: now + CALIBRATION_FINISHED_HOLD,
                    };
                }
            }
            CalibrationPhase::Confirming { until } => {
                if now >= until {
                    info!("Calibration finished, offset {:.2}", self.offset);
                    self.phase = CalibrationPhase::Finished;
                    return Ok(CalibrationStep::Done(self.offset));
                }
            }
            CalibrationPhase::Finished => return Ok(CalibrationStep::Done(self.offset)),
        }

        Ok(CalibrationStep::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonEvents;
    use crate::test_support::RecordingDisplay;

    fn idle() -> InputEvents {
        InputEvents::default()
    }

    fn held_a() -> InputEvents {
        InputEvents {
            a: ButtonEvents {
                pressed: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn click_b() -> InputEvents {
        InputEvents {
            b: ButtonEvents {
                clicked: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn click_power() -> InputEvents {
        InputEvents {
            power: ButtonEvents {
                clicked: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn click_a() -> InputEvents {
        InputEvents {
            a: ButtonEvents {
                clicked: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    /// Run the session from a fresh start to the adjusting phase at 1000 ms.
    fn started(display: &mut RecordingDisplay, offset: f32) -> CalibrationSession {
        let mut session = CalibrationSession::begin(display, offset).unwrap();
        assert_eq!(session.poll(display, &held_a(), at(0)).unwrap(), CalibrationStep::Continue);
        assert_eq!(session.phase(), CalibrationPhase::AwaitRelease);
        session.poll(display, &idle(), at(100)).unwrap();
        session.poll(display, &idle(), at(800)).unwrap();
        assert_eq!(session.phase(), CalibrationPhase::Adjusting { ignore_until: None });
        session
    }

    #[test]
    fn test_three_up_one_down() {
        let mut display = RecordingDisplay::default();
        let mut session = started(&mut display, 0.0);

        session.poll(&mut display, &click_b(), at(1_000)).unwrap();
        session.poll(&mut display, &click_b(), at(1_400)).unwrap();
        session.poll(&mut display, &click_b(), at(1_800)).unwrap();
        session.poll(&mut display, &click_power(), at(2_200)).unwrap();
        assert!((session.offset() - 0.4).abs() < 1e-5);

        session.poll(&mut display, &click_a(), at(2_600)).unwrap();
        assert_eq!(
            session.poll(&mut display, &idle(), at(3_000)).unwrap(),
            CalibrationStep::Continue
        );
        match session.poll(&mut display, &idle(), at(3_600)).unwrap() {
            CalibrationStep::Done(offset) => assert_eq!(offset, session.offset()),
            CalibrationStep::Continue => panic!("session should have finished"),
        }
    }

    #[test]
    fn test_clicks_inside_debounce_are_ignored() {
        let mut display = RecordingDisplay::default();
        let mut session = started(&mut display, 1.0);

        session.poll(&mut display, &click_b(), at(1_000)).unwrap();
        session.poll(&mut display, &click_b(), at(1_100)).unwrap();
        session.poll(&mut display, &click_a(), at(1_200)).unwrap();
        assert!((session.offset() - 1.2).abs() < 1e-5);
        assert!(matches!(session.phase(), CalibrationPhase::Adjusting { .. }));
    }

    #[test]
    fn test_settling_ignores_input() {
        let mut display = RecordingDisplay::default();
        let mut session = CalibrationSession::begin(&mut display, 0.0).unwrap();
        session.poll(&mut display, &idle(), at(0)).unwrap();
        session.poll(&mut display, &click_b(), at(300)).unwrap();
        assert_eq!(session.offset(), 0.0);
        assert!(matches!(session.phase(), CalibrationPhase::Settling { .. }));
    }

    #[test]
    fn test_begin_draws_offset_screen() {
        let mut display = RecordingDisplay::default();
        CalibrationSession::begin(&mut display, -0.6).unwrap();
        assert_eq!(display.clears, 1);
        assert!(display.count_color(GREEN) > 0);
        assert!(display.count_color(ORANGE) > 0);
        assert!(display.count_color(CYAN) > 0);
    }
}
