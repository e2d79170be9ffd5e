//! The set of collaborators a device provides to the application loop.

use crate::net::TimeSyncService;
use crate::power::PowerGauge;
use crate::sensors::TemperatureProbe;
use crate::storage::CorrectionStore;
use crate::time::RtcClock;

/// Type family naming the concrete collaborator types of one device
/// (the ESP32 firmware, the desktop simulator, the test mocks).
pub trait Hardware {
    type Probe: TemperatureProbe;
    type Power: PowerGauge;
    type Rtc: RtcClock;
    type Store: CorrectionStore;
    type Net: TimeSyncService;
}

/// Owned collaborators. Fields are public so pages can borrow several at
/// once.
pub struct Board<H: Hardware> {
    pub probe: H::Probe,
    pub power: H::Power,
    pub rtc: H::Rtc,
    pub store: H::Store,
    pub net: H::Net,
}

impl<H: Hardware> Board<H> {
    pub fn new(probe: H::Probe, power: H::Power, rtc: H::Rtc, store: H::Store, net: H::Net) -> Self {
        Self {
            probe,
            power,
            rtc,
            store,
            net,
        }
    }
}
