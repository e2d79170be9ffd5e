//! Temperature correction persisted in on-chip flash
//!
//! The record sits at the start of the default NVS sector. It is written
//! whole on each save; erased or foreign bytes decode as "nothing stored".

use embedded_storage::{ReadStorage, Storage};
use esp_storage::FlashStorage;
use log::info;

use thermo_core::app_state::{AppError, FromUnchecked};
use thermo_core::storage::{
    CORRECTION_KEY, CORRECTION_NAMESPACE, CorrectionStore, RECORD_CAPACITY, decode_correction,
    encode_correction,
};

/// Offset of the default `nvs` partition in the ESP-IDF partition table.
pub const CORRECTION_RECORD_OFFSET: u32 = 0x9000;

pub struct FlashCorrectionStore {
    flash: FlashStorage<'static>,
    offset: u32,
}

impl FlashCorrectionStore {
    pub fn new(flash: FlashStorage<'static>) -> Self {
        Self::at_offset(flash, CORRECTION_RECORD_OFFSET)
    }

    pub fn at_offset(flash: FlashStorage<'static>, offset: u32) -> Self {
        Self { flash, offset }
    }
}

impl CorrectionStore for FlashCorrectionStore {
    async fn read_correction(&mut self) -> Result<Option<f32>, AppError> {
        let mut buf = [0u8; RECORD_CAPACITY];
        self.flash
            .read(self.offset, &mut buf)
            .map_err(|_| AppError::Storage(heapless::String::from_unchecked("flash read failed")))?;
        Ok(decode_correction(&buf))
    }

    async fn write_correction(&mut self, value: f32) -> Result<(), AppError> {
        let mut buf = [0xFFu8; RECORD_CAPACITY];
        encode_correction(value, &mut buf)?;

        self.flash
            .write(self.offset, &buf)
            .map_err(|_| AppError::Storage(heapless::String::from_unchecked("flash write failed")))?;

        info!(
            "Saved {}/{} = {:.2} at {:#x}",
            CORRECTION_NAMESPACE, CORRECTION_KEY, value, self.offset
        );
        Ok(())
    }
}
