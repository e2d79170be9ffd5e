//! WiFi association and SNTP on embassy tasks
//!
//! The application loop never awaits the network. [`WifiTimeSync`] queues
//! commands on [`WIFI_COMMANDS`] and reads progress back from atomics that
//! the tasks below keep up to date:
//!
//! - [`wifi_connection_task`] owns the radio controller and handles
//!   connect/disconnect, reporting the link state once DHCP has finished.
//! - [`net_runner_task`] drives the embassy-net stack.
//! - [`sntp_task`] resolves the server and performs the UDP exchange when
//!   [`SNTP_REQUEST`] is signalled.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, Runner, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};
use log::{debug, error, info, warn};

use thermo_core::app_state::{AppError, FromUnchecked};
use thermo_core::config::{NTP_SYNC_TIMEOUT, WIFI_CONNECT_TIMEOUT};
use thermo_core::net::ntp::{NTP_PACKET_LEN, NTP_PORT, build_request, parse_response};
use thermo_core::net::{LinkState, SyncStatus, TimeSyncService};

/// Per-attempt wait for the server's reply.
const SNTP_REPLY_TIMEOUT: Duration = Duration::from_secs(5);
const SNTP_ATTEMPTS: usize = 3;

const COMMAND_QUEUE_DEPTH: usize = 4;

pub enum WifiCommand {
    Connect {
        ssid: heapless::String<32>,
        password: heapless::String<64>,
    },
    Disconnect,
}

pub static WIFI_COMMANDS: Channel<CriticalSectionRawMutex, WifiCommand, COMMAND_QUEUE_DEPTH> =
    Channel::new();

/// Server hostname for the next SNTP exchange.
pub static SNTP_REQUEST: Signal<CriticalSectionRawMutex, heapless::String<64>> = Signal::new();

static LINK_STATE: AtomicU8 = AtomicU8::new(LINK_DOWN);
static SYNC_STATE: AtomicU8 = AtomicU8::new(SYNC_IDLE);
/// Unix seconds of the last successful exchange (u32 is good until 2106)
static SYNCED_UNIX: AtomicU32 = AtomicU32::new(0);

const LINK_DOWN: u8 = 0;
const LINK_CONNECTING: u8 = 1;
const LINK_UP: u8 = 2;
const LINK_FAILED: u8 = 3;

const SYNC_IDLE: u8 = 0;
const SYNC_IN_PROGRESS: u8 = 1;
const SYNC_DONE: u8 = 2;
const SYNC_FAILED: u8 = 3;

fn set_link(state: LinkState) {
    let raw = match state {
        LinkState::Down => LINK_DOWN,
        LinkState::Connecting => LINK_CONNECTING,
        LinkState::Up => LINK_UP,
        LinkState::Failed => LINK_FAILED,
    };
    LINK_STATE.store(raw, Ordering::Release);
}

fn link() -> LinkState {
    match LINK_STATE.load(Ordering::Acquire) {
        LINK_CONNECTING => LinkState::Connecting,
        LINK_UP => LinkState::Up,
        LINK_FAILED => LinkState::Failed,
        _ => LinkState::Down,
    }
}

fn set_sync(raw: u8) {
    SYNC_STATE.store(raw, Ordering::Release);
}

#[embassy_executor::task]
pub async fn net_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

#[embassy_executor::task]
pub async fn wifi_connection_task(mut controller: WifiController<'static>, stack: Stack<'static>) {
    loop {
        match WIFI_COMMANDS.receive().await {
            WifiCommand::Connect { ssid, password } => {
                set_link(LinkState::Connecting);
                let connected =
                    with_timeout(WIFI_CONNECT_TIMEOUT, associate(&mut controller, stack, &ssid, &password))
                        .await;

                match connected {
                    Ok(Ok(())) => {
                        if let Some(config) = stack.config_v4() {
                            info!("WiFi up, address {}", config.address);
                        }
                        set_link(LinkState::Up);
                    }
                    Ok(Err(e)) => {
                        warn!("WiFi association with {} failed: {}", ssid.as_str(), e);
                        set_link(LinkState::Failed);
                    }
                    Err(_) => {
                        warn!("WiFi association with {} timed out", ssid.as_str());
                        set_link(LinkState::Failed);
                    }
                }
            }
            WifiCommand::Disconnect => {
                shut_down(&mut controller).await;
                set_link(LinkState::Down);
                set_sync(SYNC_IDLE);
            }
        }
    }
}

async fn associate(
    controller: &mut WifiController<'static>,
    stack: Stack<'static>,
    ssid: &str,
    password: &str,
) -> Result<(), AppError> {
    let client = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(ssid.into())
            .with_password(password.into()),
    );
    controller
        .set_config(&client)
        .map_err(|_| AppError::Wifi(heapless::String::from_unchecked("invalid client config")))?;

    if !matches!(controller.is_started(), Ok(true)) {
        info!("Starting WiFi");
        controller
            .start_async()
            .await
            .map_err(|_| AppError::Wifi(heapless::String::from_unchecked("radio start failed")))?;
    }

    info!("Connecting to {}", ssid);
    controller
        .connect_async()
        .await
        .map_err(|_| AppError::Wifi(heapless::String::from_unchecked("access point rejected")))?;

    debug!("Associated, waiting for DHCP");
    stack.wait_config_up().await;
    Ok(())
}

async fn shut_down(controller: &mut WifiController<'static>) {
    if let Err(e) = controller.disconnect_async().await {
        debug!("WiFi disconnect: {:?}", e);
    }
    if let Err(e) = controller.stop_async().await {
        warn!("WiFi stop failed: {:?}", e);
    }
    info!("WiFi off");
}

#[embassy_executor::task]
pub async fn sntp_task(stack: Stack<'static>) {
    loop {
        let server = SNTP_REQUEST.wait().await;
        set_sync(SYNC_IN_PROGRESS);

        match with_timeout(NTP_SYNC_TIMEOUT, query_server(stack, &server)).await {
            Ok(Ok(unix)) => {
                info!("SNTP time from {}: {}", server.as_str(), unix);
                SYNCED_UNIX.store(unix.clamp(0, i64::from(u32::MAX)) as u32, Ordering::Release);
                set_sync(SYNC_DONE);
            }
            Ok(Err(e)) => {
                error!("SNTP exchange with {} failed: {}", server.as_str(), e);
                set_sync(SYNC_FAILED);
            }
            Err(_) => {
                warn!("SNTP exchange with {} timed out", server.as_str());
                set_sync(SYNC_FAILED);
            }
        }
    }
}

async fn query_server(stack: Stack<'static>, server: &str) -> Result<i64, AppError> {
    let addresses = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(|_| AppError::TimeSync(heapless::String::from_unchecked("DNS lookup failed")))?;
    let address: IpAddress = *addresses
        .first()
        .ok_or_else(|| AppError::TimeSync(heapless::String::from_unchecked("no address for server")))?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket
        .bind(0)
        .map_err(|_| AppError::TimeSync(heapless::String::from_unchecked("UDP bind failed")))?;

    for attempt in 1..=SNTP_ATTEMPTS {
        debug!("SNTP request {} to {}", attempt, address);
        if socket.send_to(&build_request(), (address, NTP_PORT)).await.is_err() {
            warn!("SNTP send failed");
            continue;
        }

        let mut reply = [0u8; NTP_PACKET_LEN];
        match with_timeout(SNTP_REPLY_TIMEOUT, socket.recv_from(&mut reply)).await {
            Ok(Ok((len, _))) => match parse_response(&reply[..len]) {
                Ok(unix) => return Ok(unix),
                Err(e) => warn!("Bad SNTP reply: {}", e),
            },
            Ok(Err(_)) => warn!("SNTP receive error"),
            Err(_) => warn!("No SNTP reply within {} s", SNTP_REPLY_TIMEOUT.as_secs()),
        }
    }

    Err(AppError::TimeSync(heapless::String::from_unchecked(
        "no valid reply from server",
    )))
}

/// Loop-side handle onto the network tasks.
#[derive(Debug, Default)]
pub struct WifiTimeSync;

impl WifiTimeSync {
    pub const fn new() -> Self {
        Self
    }
}

impl TimeSyncService for WifiTimeSync {
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), AppError> {
        if ssid.is_empty() {
            return Err(AppError::Config(heapless::String::from_unchecked(
                "WIFI_SSID was empty at build time",
            )));
        }

        WIFI_COMMANDS
            .try_send(WifiCommand::Connect {
                ssid: heapless::String::from_unchecked(ssid),
                password: heapless::String::from_unchecked(password),
            })
            .map_err(|_| AppError::Wifi(heapless::String::from_unchecked("command queue full")))?;
        set_link(LinkState::Connecting);
        Ok(())
    }

    fn link_state(&mut self) -> LinkState {
        link()
    }

    fn start_sync(&mut self, server: &str) -> Result<(), AppError> {
        if link() != LinkState::Up {
            return Err(AppError::TimeSync(heapless::String::from_unchecked(
                "network is not up",
            )));
        }
        set_sync(SYNC_IN_PROGRESS);
        SNTP_REQUEST.signal(heapless::String::from_unchecked(server));
        Ok(())
    }

    fn sync_status(&mut self) -> SyncStatus {
        match SYNC_STATE.load(Ordering::Acquire) {
            SYNC_IN_PROGRESS => SyncStatus::InProgress,
            SYNC_DONE => SyncStatus::Synced(i64::from(SYNCED_UNIX.load(Ordering::Acquire))),
            SYNC_FAILED => SyncStatus::Failed,
            _ => SyncStatus::Idle,
        }
    }

    fn disconnect(&mut self) {
        if WIFI_COMMANDS.try_send(WifiCommand::Disconnect).is_err() {
            warn!("WiFi command queue full, radio left on");
        }
        set_sync(SYNC_IDLE);
    }
}
