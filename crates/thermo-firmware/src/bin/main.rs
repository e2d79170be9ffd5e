#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_time::{Delay, Duration, Instant, Ticker};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Flex, Input, InputConfig, Level, Output, OutputConfig};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_storage::FlashStorage;
use log::{error, info, warn};
use static_cell::StaticCell;

// Display-LCD panel specific imports
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::spi::master::{Config, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::options::{ColorInversion, Orientation, Rotation};
use mipidsi::{Builder as MipidsiBuilder, models::ST7789};

use thermo_core::board::Board;
use thermo_core::config::Config as AppConfig;
use thermo_core::input::RawButtons;
use thermo_firmware::app_state::{
    StickDisplayManager, StickHardware, StickPower, create_i2c_bus, init_i2c_hardware,
};
use thermo_firmware::ds18b20::Ds18b20Probe;
use thermo_firmware::flash_store::FlashCorrectionStore;
use thermo_firmware::wifi::{WifiTimeSync, net_runner_task, sntp_task, wifi_connection_task};
use thermo_firmware::wifi_secrets::{WIFI_PASSWORD, WIFI_SSID};

// Native panel geometry; drawn in landscape after the 90 degree rotation
const PANEL_WIDTH: u16 = 135;
const PANEL_HEIGHT: u16 = 240;
const PANEL_OFFSET_X: u16 = 52;
const PANEL_OFFSET_Y: u16 = 40;

const LOOP_TICK: Duration = Duration::from_millis(20);

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::_80MHz);
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    // Power chip first: it switches on the LCD rails
    let i2c0 = create_i2c_bus(peripherals.I2C0, peripherals.GPIO21, peripherals.GPIO22)
        .expect("Failed to create I2C bus");
    let (axp, rtc) = init_i2c_hardware(i2c0).await;
    let led = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let power = StickPower::new(axp, led);

    // Configure and initialize the display

    // 1. Configure SPI bus
    let spi_bus = Spi::new(peripherals.SPI2, Config::default())
        .unwrap()
        .with_sck(peripherals.GPIO13)
        .with_mosi(peripherals.GPIO15);

    // 2. Chip select, data/command and reset lines
    let cs = Output::new(peripherals.GPIO5, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO23, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO18, Level::High, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device = ExclusiveDevice::new_no_delay(spi_bus, cs).unwrap();

    // 4. Create a buffer for SPI batching (larger = faster, uses more RAM)
    let mut spi_buffer = [0u8; 64];
    let di = SpiInterface::new(spi_device, dc, &mut spi_buffer);

    // 5. Build and initialize the display driver
    let display = MipidsiBuilder::new(ST7789, di)
        .display_size(PANEL_WIDTH, PANEL_HEIGHT)
        .display_offset(PANEL_OFFSET_X, PANEL_OFFSET_Y)
        .invert_colors(ColorInversion::Inverted)
        .orientation(Orientation::new().rotate(Rotation::Deg90))
        .reset_pin(rst)
        .init(&mut Delay)
        .expect("Failed to initialize display");

    info!("Display initialized!");

    // Buttons A (front) and B (side) are input-only pins with external pull-ups
    let button_a = Input::new(peripherals.GPIO37, InputConfig::default());
    let button_b = Input::new(peripherals.GPIO39, InputConfig::default());

    let probe = Ds18b20Probe::new(Flex::new(peripherals.GPIO33));
    let store = FlashCorrectionStore::new(FlashStorage::new(peripherals.FLASH));

    // Radio and network stack; the tasks idle until a clock resync asks for them
    static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    let radio: &'static esp_radio::Controller<'static> =
        RADIO.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner
        .spawn(net_runner_task(runner))
        .expect("Failed to spawn network runner");
    spawner
        .spawn(wifi_connection_task(wifi_controller, stack))
        .expect("Failed to spawn WiFi task");
    spawner
        .spawn(sntp_task(stack))
        .expect("Failed to spawn SNTP task");

    if WIFI_SSID.is_empty() {
        warn!("No WiFi credentials built in; clock resync will fail");
    }

    let board: Board<StickHardware> = Board::new(probe, power, rtc, store, WifiTimeSync::new());
    let mut manager: StickDisplayManager<_> =
        StickDisplayManager::new(display, board, AppConfig::with_credentials(WIFI_SSID, WIFI_PASSWORD))
            .expect("Invalid application configuration");

    if let Err(e) = manager.begin(&mut Delay, Instant::now()).await {
        error!("Boot sequence incomplete: {}", e);
    }

    let mut ticker = Ticker::every(LOOP_TICK);
    loop {
        let power_clicked = match manager.board_mut().power.take_power_key_click().await {
            Ok(clicked) => clicked,
            Err(e) => {
                error!("Power key read failed: {}", e);
                false
            }
        };

        let raw = RawButtons {
            a_pressed: button_a.is_low(),
            b_pressed: button_b.is_low(),
            power_clicked,
        };

        if let Err(e) = manager.tick(Instant::now(), raw).await {
            error!("{}", e);
        }

        ticker.next().await;
    }
}
