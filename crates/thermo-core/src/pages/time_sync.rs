//! WiFi + NTP clock resync, entered by holding button A on the clock page.
//!
//! The network work happens elsewhere; the session starts it, polls its
//! progress once per loop iteration and keeps the screen up to date. Both
//! waits are bounded, so a missing access point or a silent NTP server ends
//! in a failure message instead of a hang.

use embassy_time::Instant;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{error, info, warn};

use super::constants::{CENTER_X, LINE_HEIGHT_PX, SYNC_PROGRESS_STEP_PX, SYNC_PROGRESS_X};
use crate::config::{
    Config, NTP_SYNC_TIMEOUT, SYNC_FAILURE_HOLD, SYNC_PROGRESS_INTERVAL, SYNC_SUCCESS_HOLD,
    WIFI_CONNECT_TIMEOUT,
};
use crate::net::{LinkState, SyncStatus, TimeSyncService};
use crate::ui::{BLACK, DISPLAY_WIDTH_PX, RED, TextStyle, WHITE, draw_text};

const STATUS_STYLE: TextStyle = TextStyle::new(&FONT_10X20, WHITE).centered();
const PROGRESS_STYLE: TextStyle = TextStyle::new(&FONT_10X20, WHITE);
const FAILURE_STYLE: TextStyle = TextStyle::new(&FONT_10X20, RED).centered();

const PROGRESS_Y: i32 = LINE_HEIGHT_PX * 3;
const RESULT_Y: i32 = PROGRESS_Y + 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFailure {
    WifiRejected,
    WifiTimeout,
    NtpFailed,
    NtpTimeout,
    RtcWrite,
}

impl SyncFailure {
    pub const fn message(self) -> &'static str {
        match self {
            SyncFailure::WifiRejected => "WiFi failed",
            SyncFailure::WifiTimeout => "WiFi timeout",
            SyncFailure::NtpFailed => "Sync failed",
            SyncFailure::NtpTimeout => "Sync timeout",
            SyncFailure::RtcWrite => "RTC write failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Connecting {
        deadline: Instant,
    },
    Syncing {
        deadline: Instant,
        next_mark: Instant,
        marks: u8,
    },
    /// Time delivered to the caller, waiting for [`TimeSyncSession::complete`]
    Received,
    Succeeded {
        until: Instant,
    },
    Failed {
        failure: SyncFailure,
        until: Instant,
    },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Continue,
    /// NTP answered; seconds since the Unix epoch, UTC
    TimeReceived(i64),
    /// The session is over and the clock page can be shown again
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeSyncSession {
    phase: SyncPhase,
}

impl TimeSyncSession {
    /// Clear the screen and start associating with the access point.
    pub fn begin<D, N>(display: &mut D, net: &mut N, config: &Config<'_>, now: Instant) -> Result<Self, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
        N: TimeSyncService,
    {
        info!("Clock sync: connecting to {}", config.internet.ssid);
        display.clear(BLACK)?;
        draw_text(display, "WiFi:", Point::new(CENTER_X, 0), STATUS_STYLE)?;

        let mut session = Self {
            phase: SyncPhase::Connecting {
                deadline: now + WIFI_CONNECT_TIMEOUT,
            },
        };

        if let Err(err) = net.connect(config.internet.ssid, config.internet.password) {
            error!("Clock sync: {}", err);
            session.fail(display, net, SyncFailure::WifiRejected, now)?;
        }
        Ok(session)
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Advance the session by one loop iteration.
    pub fn poll<D, N>(&mut self, display: &mut D, net: &mut N, config: &Config<'_>, now: Instant) -> Result<SyncStep, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
        N: TimeSyncService,
    {
        match self.phase {
            SyncPhase::Connecting { deadline } => match net.link_state() {
                LinkState::Up => {
                    info!("Clock sync: connected, querying {}", config.time.ntp_server);
                    draw_text(display, "Connected.", Point::new(CENTER_X, LINE_HEIGHT_PX), STATUS_STYLE)?;
                    draw_text(
                        display,
                        "Syncing clock",
                        Point::new(CENTER_X, LINE_HEIGHT_PX * 2),
                        STATUS_STYLE,
                    )?;

                    match net.start_sync(config.time.ntp_server) {
                        Ok(()) => {
                            self.phase = SyncPhase::Syncing {
                                deadline: now + NTP_SYNC_TIMEOUT,
                                next_mark: now,
                                marks: 0,
                            };
                        }
                        Err(err) => {
                            error!("Clock sync: {}", err);
                            self.fail(display, net, SyncFailure::NtpFailed, now)?;
                        }
                    }
                }
                LinkState::Failed => self.fail(display, net, SyncFailure::WifiRejected, now)?,
                LinkState::Down | LinkState::Connecting if now >= deadline => {
                    self.fail(display, net, SyncFailure::WifiTimeout, now)?
                }
                LinkState::Down | LinkState::Connecting => {}
            },
            SyncPhase::Syncing {
                deadline,
                next_mark,
                marks,
            } => match net.sync_status() {
                SyncStatus::Synced(unix_seconds) => {
                    self.phase = SyncPhase::Received;
                    return Ok(SyncStep::TimeReceived(unix_seconds));
                }
                SyncStatus::Failed => self.fail(display, net, SyncFailure::NtpFailed, now)?,
                SyncStatus::Idle | SyncStatus::InProgress if now >= deadline => {
                    self.fail(display, net, SyncFailure::NtpTimeout, now)?
                }
                SyncStatus::Idle | SyncStatus::InProgress => {
                    if now >= next_mark {
                        let x = SYNC_PROGRESS_X + i32::from(marks) * SYNC_PROGRESS_STEP_PX;
                        if x < DISPLAY_WIDTH_PX as i32 {
                            draw_text(display, "*", Point::new(x, PROGRESS_Y), PROGRESS_STYLE)?;
                        }
                        self.phase = SyncPhase::Syncing {
                            deadline,
                            next_mark: next_mark + SYNC_PROGRESS_INTERVAL,
                            marks: marks.saturating_add(1),
                        };
                    }
                }
            },
            SyncPhase::Received => {}
            SyncPhase::Succeeded { until } | SyncPhase::Failed { until, .. } => {
                if now >= until {
                    self.phase = SyncPhase::Finished;
                    return Ok(SyncStep::Done);
                }
            }
            SyncPhase::Finished => return Ok(SyncStep::Done),
        }

        Ok(SyncStep::Continue)
    }

    /// Report the outcome of storing the received time.
    pub fn complete<D, N>(&mut self, display: &mut D, net: &mut N, stored: bool, now: Instant) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
        N: TimeSyncService,
    {
        if !stored {
            return self.fail(display, net, SyncFailure::RtcWrite, now);
        }

        info!("Clock sync'd");
        draw_text(display, "Clock sync'd", Point::new(CENTER_X, RESULT_Y), STATUS_STYLE)?;
        net.disconnect();
        self.phase = SyncPhase::Succeeded {
            until: now + SYNC_SUCCESS_HOLD,
        };
        Ok(())
    }

    fn fail<D, N>(&mut self, display: &mut D, net: &mut N, failure: SyncFailure, now: Instant) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
        N: TimeSyncService,
    {
        warn!("Clock sync failed: {}", failure.message());
        net.disconnect();
        self.phase = SyncPhase::Failed {
            failure,
            until: now + SYNC_FAILURE_HOLD,
        };
        draw_text(display, failure.message(), Point::new(CENTER_X, RESULT_Y), FAILURE_STYLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockNet, RecordingDisplay};

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn config() -> Config<'static> {
        Config::with_credentials("ssid", "secret")
    }

    #[test]
    fn test_success_path() {
        let mut display = RecordingDisplay::default();
        let mut net = MockNet::default();
        let config = config();

        let mut session = TimeSyncSession::begin(&mut display, &mut net, &config, at(0)).unwrap();
        assert_eq!(net.connects, 1);
        assert_eq!(session.poll(&mut display, &mut net, &config, at(20)).unwrap(), SyncStep::Continue);

        net.link = LinkState::Up;
        session.poll(&mut display, &mut net, &config, at(1_000)).unwrap();
        assert_eq!(net.sync_server.as_deref(), Some(config.time.ntp_server));
        assert!(matches!(session.phase(), SyncPhase::Syncing { .. }));

        session.poll(&mut display, &mut net, &config, at(1_020)).unwrap();
        session.poll(&mut display, &mut net, &config, at(2_020)).unwrap();
        assert!(matches!(session.phase(), SyncPhase::Syncing { marks: 2, .. }));

        net.sync = SyncStatus::Synced(1_759_673_229);
        assert_eq!(
            session.poll(&mut display, &mut net, &config, at(2_500)).unwrap(),
            SyncStep::TimeReceived(1_759_673_229)
        );

        session.complete(&mut display, &mut net, true, at(2_500)).unwrap();
        assert_eq!(net.disconnects, 1);
        assert_eq!(session.poll(&mut display, &mut net, &config, at(3_999)).unwrap(), SyncStep::Continue);
        assert_eq!(session.poll(&mut display, &mut net, &config, at(4_000)).unwrap(), SyncStep::Done);
        assert_eq!(display.count_color(RED), 0);
    }

    #[test]
    fn test_association_timeout() {
        let mut display = RecordingDisplay::default();
        let mut net = MockNet::default();
        let config = config();

        let mut session = TimeSyncSession::begin(&mut display, &mut net, &config, at(0)).unwrap();
        session.poll(&mut display, &mut net, &config, at(29_999)).unwrap();
        assert!(matches!(session.phase(), SyncPhase::Connecting { .. }));

        session.poll(&mut display, &mut net, &config, at(30_000)).unwrap();
        assert_eq!(
            session.phase(),
            SyncPhase::Failed {
                failure: SyncFailure::WifiTimeout,
                until: at(33_000)
            }
        );
        assert_eq!(net.disconnects, 1);
        assert!(display.count_color(RED) > 0);

        assert_eq!(session.poll(&mut display, &mut net, &config, at(33_000)).unwrap(), SyncStep::Done);
    }

    #[test]
    fn test_ntp_timeout() {
        let mut display = RecordingDisplay::default();
        let mut net = MockNet::default();
        let config = config();

        let mut session = TimeSyncSession::begin(&mut display, &mut net, &config, at(0)).unwrap();
        net.link = LinkState::Up;
        session.poll(&mut display, &mut net, &config, at(100)).unwrap();
        session.poll(&mut display, &mut net, &config, at(30_100)).unwrap();
        assert!(matches!(
            session.phase(),
            SyncPhase::Failed {
                failure: SyncFailure::NtpTimeout,
                ..
            }
        ));
    }

    #[test]
    fn test_rtc_failure_is_reported() {
        let mut display = RecordingDisplay::default();
        let mut net = MockNet::default();
        let config = config();

        let mut session = TimeSyncSession::begin(&mut display, &mut net, &config, at(0)).unwrap();
        net.link = LinkState::Up;
        net.sync = SyncStatus::Synced(0);
        session.poll(&mut display, &mut net, &config, at(10)).unwrap();
        session.poll(&mut display, &mut net, &config, at(20)).unwrap();
        session.complete(&mut display, &mut net, false, at(20)).unwrap();
        assert!(matches!(
            session.phase(),
            SyncPhase::Failed {
                failure: SyncFailure::RtcWrite,
                ..
            }
        ));
    }
}
