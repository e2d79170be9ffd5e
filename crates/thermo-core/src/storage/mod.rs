//! Persistent temperature correction
//!
//! The correction lives in namespace `"correction"` under key
//! `"correction"`, serialized with postcard into a small fixed record. An
//! absent, erased or foreign record reads as the default of 0.0.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_state::{AppError, FromUnchecked};

pub const CORRECTION_NAMESPACE: &str = "correction";
pub const CORRECTION_KEY: &str = "correction";
pub const DEFAULT_CORRECTION: f32 = 0.0;

/// Upper bound on an encoded record.
pub const RECORD_CAPACITY: usize = 64;

const RECORD_MAGIC: u32 = 0x5448_4D31; // "THM1"

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
struct StoredSetting<'a> {
    magic: u32,
    namespace: &'a str,
    key: &'a str,
    value: f32,
}

/// Encode the correction record into `buf`, returning the used prefix.
pub fn encode_correction(value: f32, buf: &mut [u8]) -> Result<&mut [u8], AppError> {
    let record = StoredSetting {
        magic: RECORD_MAGIC,
        namespace: CORRECTION_NAMESPACE,
        key: CORRECTION_KEY,
        value,
    };
    postcard::to_slice(&record, buf)
        .map_err(|_| AppError::Storage(heapless::String::from_unchecked("record encode failed")))
}

/// Decode a correction record; `None` for anything that is not one.
pub fn decode_correction(bytes: &[u8]) -> Option<f32> {
    let record: StoredSetting<'_> = postcard::from_bytes(bytes).ok()?;
    let matches = record.magic == RECORD_MAGIC
        && record.namespace == CORRECTION_NAMESPACE
        && record.key == CORRECTION_KEY
        && record.value.is_finite();
    matches.then_some(record.value)
}

/// Non-volatile home of the temperature correction.
pub trait CorrectionStore {
    /// Stored correction, or `None` when nothing valid has been saved.
    fn read_correction(&mut self) -> impl Future<Output = Result<Option<f32>, AppError>>;

    fn write_correction(&mut self, value: f32) -> impl Future<Output = Result<(), AppError>>;
}

/// Correction at boot: the stored value, or 0.0 if absent or unreadable.
pub async fn load_correction<S: CorrectionStore>(store: &mut S) -> f32 {
    match store.read_correction().await {
        Ok(Some(value)) => {
            info!("Temperature correction is {:.2}", value);
            value
        }
        Ok(None) => {
            info!("No stored temperature correction, using {:.2}", DEFAULT_CORRECTION);
            DEFAULT_CORRECTION
        }
        Err(e) => {
            warn!("Reading temperature correction failed: {}", e);
            DEFAULT_CORRECTION
        }
    }
}

/// RAM-backed store used by the simulator.
#[derive(Debug, Default)]
pub struct MemoryCorrectionStore {
    bytes: heapless::Vec<u8, RECORD_CAPACITY>,
}

impl CorrectionStore for MemoryCorrectionStore {
    async fn read_correction(&mut self) -> Result<Option<f32>, AppError> {
        Ok(decode_correction(&self.bytes))
    }

    async fn write_correction(&mut self, value: f32) -> Result<(), AppError> {
        let mut buf = [0u8; RECORD_CAPACITY];
        let encoded = encode_correction(value, &mut buf)?;
        self.bytes.clear();
        self.bytes
            .extend_from_slice(encoded)
            .map_err(|_| AppError::Storage(heapless::String::from_unchecked("record too large")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_record_round_trip() {
        let mut buf = [0u8; RECORD_CAPACITY];
        let encoded = encode_correction(-1.4, &mut buf).unwrap();
        assert_eq!(decode_correction(encoded), Some(-1.4));
    }

    #[test]
    fn test_erased_flash_is_absent() {
        assert_eq!(decode_correction(&[0xFF; RECORD_CAPACITY]), None);
        assert_eq!(decode_correction(&[]), None);
    }

    #[test]
    fn test_foreign_record_is_absent() {
        let record = StoredSetting {
            magic: RECORD_MAGIC,
            namespace: "wifi",
            key: CORRECTION_KEY,
            value: 2.0,
        };
        let mut buf = [0u8; RECORD_CAPACITY];
        let encoded = postcard::to_slice(&record, &mut buf).unwrap();
        assert_eq!(decode_correction(encoded), None);
    }

    #[test]
    fn test_memory_store_defaults_then_persists() {
        let mut store = MemoryCorrectionStore::default();
        assert_eq!(block_on(load_correction(&mut store)), DEFAULT_CORRECTION);

        block_on(store.write_correction(0.6)).unwrap();
        assert_eq!(block_on(load_correction(&mut store)), 0.6);
    }
}
