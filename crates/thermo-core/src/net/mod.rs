//! WiFi association and network time, as polled by the clock resync
//! routine. Implementations do the actual work elsewhere (an async task on
//! the device, a timer in the simulator) and only report progress here, so
//! every call returns immediately.

pub mod ntp;

use crate::app_state::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Down,
    Connecting,
    /// Associated and holding an IP address
    Up,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    InProgress,
    /// Seconds since the Unix epoch, UTC
    Synced(i64),
    Failed,
}

pub trait TimeSyncService {
    /// Begin associating with the access point.
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), AppError>;

    fn link_state(&mut self) -> LinkState;

    /// Begin an SNTP exchange with `server`; requires [`LinkState::Up`].
    fn start_sync(&mut self, server: &str) -> Result<(), AppError>;

    fn sync_status(&mut self) -> SyncStatus;

    /// Drop the association and power the radio down.
    fn disconnect(&mut self);
}
