//! Device-side application state for thermo-lcd
//!
//! The run state and error type come from `thermo-core`; this module adds
//! the concrete M5StickC Plus collaborators and the bring-up helpers used
//! by the binary.

mod hardware;

pub use hardware::*;

pub use thermo_core::app_state::{AppError, AppRunState};

use thermo_core::display_manager::DisplayManager;

/// The application loop as it runs on the device.
pub type StickDisplayManager<D> = DisplayManager<'static, D, StickHardware>;
