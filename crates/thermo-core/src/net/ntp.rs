//! SNTP v3 client framing (RFC 4330)

use thiserror_no_std::Error;

pub const NTP_PORT: u16 = 123;
pub const NTP_PACKET_LEN: usize = 48;

/// Seconds from 1900-01-01 (NTP era 0) to 1970-01-01.
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const LI_VN_MODE_CLIENT: u8 = 0x1B; // LI=0, VN=3, Mode=3
const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;
const TRANSMIT_TIMESTAMP: usize = 40;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtpError {
    #[error("response too short ({0} bytes)")]
    TooShort(usize),
    #[error("unexpected mode {0}")]
    NotServer(u8),
    #[error("kiss-o'-death from server")]
    KissOfDeath,
    #[error("transmit timestamp before 1970")]
    BeforeUnixEpoch,
}

pub fn build_request() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = LI_VN_MODE_CLIENT;
    packet
}

/// Server transmit time as Unix seconds (UTC), rounded to the nearest second.
pub fn parse_response(packet: &[u8]) -> Result<i64, NtpError> {
    if packet.len() < NTP_PACKET_LEN {
        return Err(NtpError::TooShort(packet.len()));
    }

    let mode = packet[0] & 0x07;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(NtpError::NotServer(mode));
    }
    if packet[1] == 0 {
        return Err(NtpError::KissOfDeath);
    }

    let field = |offset: usize| {
        u32::from_be_bytes([
            packet[offset],
            packet[offset + 1],
            packet[offset + 2],
            packet[offset + 3],
        ])
    };
    let seconds = u64::from(field(TRANSMIT_TIMESTAMP));
    let fraction = field(TRANSMIT_TIMESTAMP + 4);

    let unix = seconds
        .checked_sub(NTP_UNIX_OFFSET)
        .ok_or(NtpError::BeforeUnixEpoch)?;
    let round_up = u64::from(fraction >= 0x8000_0000);

    Ok((unix + round_up) as i64)
}
