//! Desktop simulator for the thermo-lcd handheld thermometer and clock.
//!
//! Runs the same `DisplayManager` loop as the firmware, drawing into an SDL2
//! window via `embedded-graphics-simulator` and backed by mock hardware.
//!
//! # Key bindings
//!
//! | Key | Action                                   |
//! |-----|------------------------------------------|
//! | A   | Button A (front), hold for long press    |
//! | B   | Button B (side), hold for long press     |
//! | P   | Power key short press                    |
//! | D   | Connect / disconnect the probe           |
//! | R   | Make WiFi association fail / succeed     |
//! | Q   | Quit (also Esc)                          |

mod mock_hardware;

use std::time::Duration;

use embassy_futures::block_on;
use embassy_time::{Delay, Instant};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use thermo_core::board::Board;
use thermo_core::config::Config;
use thermo_core::display_manager::DisplayManager;
use thermo_core::input::RawButtons;
use thermo_core::storage::MemoryCorrectionStore;
use thermo_core::time::TzRule;
use thermo_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

use mock_hardware::{SimHardware, SimNet, SimPower, SimProbe, SimRtc};

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 3;

/// Same loop period as the device.
const TICK: Duration = Duration::from_millis(20);

/// Keys that drive the application, after SDL decoding.
enum SimKey {
    ButtonA,
    ButtonB,
    PowerKey,
    ToggleProbe,
    ToggleWifiReject,
    Quit,
}

fn decode_key(keycode: Keycode) -> Option<SimKey> {
    match keycode {
        Keycode::A => Some(SimKey::ButtonA),
        Keycode::B => Some(SimKey::ButtonB),
        Keycode::P => Some(SimKey::PowerKey),
        Keycode::D => Some(SimKey::ToggleProbe),
        Keycode::R => Some(SimKey::ToggleWifiReject),
        Keycode::Q | Keycode::Escape => Some(SimKey::Quit),
        _ => None,
    }
}

fn main() {
    env_logger::init();
    info!("Starting thermo-lcd simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: A/B=buttons (hold for long press)  P=power  D=probe  R=WiFi reject  Q=Quit");

    let display = SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("thermo-lcd", &output_settings);

    let config = Config::with_credentials("simulated-ap", "password");
    let timezone = match TzRule::parse(config.time.timezone) {
        Ok(rule) => rule,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let board: Board<SimHardware> = Board::new(
        SimProbe::new(),
        SimPower::new(),
        SimRtc::new(timezone),
        MemoryCorrectionStore::default(),
        SimNet::default(),
    );

    let mut manager = match DisplayManager::new(display, board, config) {
        Ok(manager) => manager,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    if let Err(e) = block_on(manager.begin(&mut Delay, Instant::now())) {
        error!("Boot sequence incomplete: {}", e);
    }

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(manager.display());

    let mut raw = RawButtons::default();

    'running: loop {
        let frame_start = std::time::Instant::now();
        raw.power_clicked = false;

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown {
                    keycode, repeat, ..
                } => match decode_key(keycode) {
                    Some(SimKey::ButtonA) => raw.a_pressed = true,
                    Some(SimKey::ButtonB) => raw.b_pressed = true,
                    Some(SimKey::PowerKey) if !repeat => raw.power_clicked = true,
                    Some(SimKey::ToggleProbe) if !repeat => {
                        let probe = &mut manager.board_mut().probe;
                        probe.connected = !probe.connected;
                        info!("Probe {}", if probe.connected { "connected" } else { "removed" });
                    }
                    Some(SimKey::ToggleWifiReject) if !repeat => {
                        let net = &mut manager.board_mut().net;
                        net.reject = !net.reject;
                        info!("WiFi association will {}", if net.reject { "fail" } else { "succeed" });
                    }
                    Some(SimKey::Quit) => break 'running,
                    _ => {}
                },

                SimulatorEvent::KeyUp { keycode, .. } => match decode_key(keycode) {
                    Some(SimKey::ButtonA) => raw.a_pressed = false,
                    Some(SimKey::ButtonB) => raw.b_pressed = false,
                    _ => {}
                },

                _ => {}
            }
        }

        if let Err(e) = block_on(manager.tick(Instant::now(), raw)) {
            error!("{}", e);
        }

        window.update(manager.display());

        let elapsed = frame_start.elapsed();
        if elapsed < TICK {
            std::thread::sleep(TICK - elapsed);
        }
    }

    info!("Simulator exiting");
}
