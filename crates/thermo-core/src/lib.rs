//! Hardware-independent core library for thermo-lcd
//!
//! This crate contains all platform-agnostic logic for the handheld
//! thermometer/clock: page navigation and refresh timing, page rendering,
//! button click/hold detection, the calibration and clock-resync routines,
//! calendar and timezone arithmetic, SNTP framing, and the traits the
//! hardware adapters implement.
//!
//! It is `#![no_std]` so it compiles on both the ESP32 target and desktop
//! hosts (for the simulator and tests).

#![no_std]

pub mod app_state;
pub mod board;
pub mod config;
pub mod display_manager;
pub mod input;
pub mod net;
pub mod pages;
pub mod power;
pub mod sensors;
pub mod storage;
pub mod time;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;
