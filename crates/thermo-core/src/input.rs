//! Button click / hold detection
//!
//! Buttons A and B are sampled as raw levels every loop iteration. A level
//! change is accepted once it has been stable for [`BUTTON_DEBOUNCE`]. A
//! press released before [`BUTTON_HOLD_THRESHOLD`] is a click; a press that
//! crosses the threshold reports `hold_started` once and never produces a
//! click. The power key arrives from the power chip as a ready-made click.

use embassy_time::Instant;

use crate::config::{BUTTON_DEBOUNCE, BUTTON_HOLD_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    /// Front button
    A,
    /// Side button
    B,
    /// Power key on the power management chip
    Power,
}

/// Raw input sampled by the hardware layer for one loop iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawButtons {
    pub a_pressed: bool,
    pub b_pressed: bool,
    /// Power key short press reported since the last sample
    pub power_clicked: bool,
}

/// Events for one button produced by one tracker update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEvents {
    /// Debounced level
    pub pressed: bool,
    pub clicked: bool,
    pub hold_started: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvents {
    pub a: ButtonEvents,
    pub b: ButtonEvents,
    pub power: ButtonEvents,
}

#[derive(Debug, Clone, Copy)]
struct ButtonState {
    stable: bool,
    raw: bool,
    raw_changed_at: Instant,
    pressed_at: Option<Instant>,
    hold_reported: bool,
    suppressed: bool,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            stable: false,
            raw: false,
            raw_changed_at: Instant::from_ticks(0),
            pressed_at: None,
            hold_reported: false,
            suppressed: false,
        }
    }

    fn update(&mut self, raw: bool, now: Instant) -> ButtonEvents {
        let mut events = ButtonEvents::default();

        if raw != self.raw {
            self.raw = raw;
            self.raw_changed_at = now;
        }

        if raw != self.stable && now.saturating_duration_since(self.raw_changed_at) >= BUTTON_DEBOUNCE {
            self.stable = raw;
            if raw {
                self.pressed_at = Some(now);
                self.hold_reported = false;
            } else {
                events.clicked = !self.hold_reported && !self.suppressed;
                self.pressed_at = None;
                self.suppressed = false;
            }
        }

        if let Some(pressed_at) = self.pressed_at {
            if !self.hold_reported && now.saturating_duration_since(pressed_at) >= BUTTON_HOLD_THRESHOLD {
                self.hold_reported = true;
                events.hold_started = !self.suppressed;
            }
        }

        events.pressed = self.stable;
        events
    }
}

pub struct ButtonTracker {
    a: ButtonState,
    b: ButtonState,
    power_suppressed: bool,
}

impl Default for ButtonTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonTracker {
    pub const fn new() -> Self {
        Self {
            a: ButtonState::new(),
            b: ButtonState::new(),
            power_suppressed: false,
        }
    }

    pub fn update(&mut self, raw: RawButtons, now: Instant) -> InputEvents {
        let power_clicked = raw.power_clicked && !self.power_suppressed;
        self.power_suppressed = false;

        InputEvents {
            a: self.a.update(raw.a_pressed, now),
            b: self.b.update(raw.b_pressed, now),
            power: ButtonEvents {
                pressed: false,
                clicked: power_clicked,
                hold_started: false,
            },
        }
    }

    /// Swallow whatever the current press of `id` would still report.
    ///
    /// Has no effect on a button that is not pressed; for the power key it
    /// drops the next reported click.
    pub fn suppress_until_release(&mut self, id: ButtonId) {
        match id {
            ButtonId::A => Self::suppress(&mut self.a),
            ButtonId::B => Self::suppress(&mut self.b),
            ButtonId::Power => self.power_suppressed = true,
        }
    }

    fn suppress(state: &mut ButtonState) {
        if state.stable || state.raw {
            state.suppressed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(pressed: bool) -> RawButtons {
        RawButtons {
            a_pressed: pressed,
            ..Default::default()
        }
    }

    /// Feed `raw` every 10 ms over `[from, to)` and collect A events.
    fn run(tracker: &mut ButtonTracker, raw: RawButtons, from: u64, to: u64) -> (u32, u32) {
        let mut clicks = 0;
        let mut holds = 0;
        let mut t = from;
        while t < to {
            let events = tracker.update(raw, Instant::from_millis(t));
            clicks += u32::from(events.a.clicked);
            holds += u32::from(events.a.hold_started);
            t += 10;
        }
        (clicks, holds)
    }

    #[test]
    fn test_short_press_is_one_click_on_release() {
        let mut tracker = ButtonTracker::new();
        assert_eq!(run(&mut tracker, a(true), 0, 200), (0, 0));
        assert_eq!(run(&mut tracker, a(false), 200, 400), (1, 0));
    }

    #[test]
    fn test_long_press_is_one_hold_and_no_click() {
        let mut tracker = ButtonTracker::new();
        assert_eq!(run(&mut tracker, a(true), 0, 2_000), (0, 1));
        assert_eq!(run(&mut tracker, a(false), 2_000, 2_200), (0, 0));
    }

    #[test]
    fn test_bounce_shorter_than_debounce_is_ignored() {
        let mut tracker = ButtonTracker::new();
        tracker.update(a(true), Instant::from_millis(0));
        tracker.update(a(false), Instant::from_millis(10));
        assert_eq!(run(&mut tracker, a(false), 20, 300), (0, 0));
    }

    #[test]
    fn test_suppressed_press_reports_nothing() {
        let mut tracker = ButtonTracker::new();
        run(&mut tracker, a(true), 0, 100);
        tracker.suppress_until_release(ButtonId::A);
        assert_eq!(run(&mut tracker, a(true), 100, 1_000), (0, 0));
        assert_eq!(run(&mut tracker, a(false), 1_000, 1_100), (0, 0));

        // The next press is reported normally again
        run(&mut tracker, a(true), 1_100, 1_200);
        assert_eq!(run(&mut tracker, a(false), 1_200, 1_300), (1, 0));
    }

    #[test]
    fn test_suppress_without_press_is_noop() {
        let mut tracker = ButtonTracker::new();
        tracker.suppress_until_release(ButtonId::A);
        run(&mut tracker, a(true), 0, 100);
        assert_eq!(run(&mut tracker, a(false), 100, 200), (1, 0));
    }

    #[test]
    fn test_power_click_passes_through() {
        let mut tracker = ButtonTracker::new();
        let raw = RawButtons {
            power_clicked: true,
            ..Default::default()
        };
        assert!(tracker.update(raw, Instant::from_millis(0)).power.clicked);
        assert!(!tracker.update(RawButtons::default(), Instant::from_millis(10)).power.clicked);

        tracker.suppress_until_release(ButtonId::Power);
        assert!(!tracker.update(raw, Instant::from_millis(20)).power.clicked);
    }
}
