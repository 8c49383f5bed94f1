//! Persistent storage for button macros.
//!
//! The four macro strings are packed into one record and stored on the
//! nRF52840's internal flash via the `sequential-storage` crate, which
//! handles wear levelling and GC. The record codec is pure and
//! host-testable; only the flash I/O is embedded-gated.
//!
//! Record layout:
//!   - Byte 0: slot count.
//!   - Per slot: u16 little-endian text length, then the text bytes.
//!
//! A corrupt or absent record yields `None` and the firmware boots with
//! empty slots; it never panics over flash contents.

use heapless::String;

use crate::config::{BUTTON_COUNT, MACRO_STORAGE_BUDGET, MACRO_TEXT_MAX};

#[cfg(feature = "embedded")]
use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};

/// Key for the macro-slot record in the map storage.
#[cfg(feature = "embedded")]
const KEY_MACRO_SLOTS: u8 = 0x01;

/// Maximum serialized size: header + four length prefixes + the whole
/// text budget.
pub const MAX_RECORD_SIZE: usize = 1 + BUTTON_COUNT * 2 + MACRO_STORAGE_BUDGET;

/// Pack the four slot texts into `buf`. Returns the number of bytes
/// written, or 0 if `buf` is too small.
pub fn serialize_slots(texts: &[&str; BUTTON_COUNT], buf: &mut [u8]) -> usize {
    let total = 1 + texts.iter().map(|t| 2 + t.len()).sum::<usize>();
    if buf.len() < total {
        return 0;
    }

    buf[0] = BUTTON_COUNT as u8;
    let mut offset = 1;
    for text in texts {
        let bytes = text.as_bytes();
        buf[offset..offset + 2].copy_from_slice(&(bytes.len() as u16).to_le_bytes());
        offset += 2;
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        offset += bytes.len();
    }
    offset
}

/// Unpack a record. `None` on any structural damage: short data, wrong
/// slot count, over-long text, or invalid UTF-8.
pub fn deserialize_slots(data: &[u8]) -> Option<[String<MACRO_TEXT_MAX>; BUTTON_COUNT]> {
    if data.is_empty() || data[0] as usize != BUTTON_COUNT {
        return None;
    }

    let mut texts: [String<MACRO_TEXT_MAX>; BUTTON_COUNT] = Default::default();
    let mut offset = 1;
    for slot in texts.iter_mut() {
        let len_bytes = data.get(offset..offset + 2)?;
        let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        offset += 2;
        if len > MACRO_TEXT_MAX {
            return None;
        }
        let raw = data.get(offset..offset + len)?;
        let text = core::str::from_utf8(raw).ok()?;
        *slot = String::try_from(text).ok()?;
        offset += len;
    }
    Some(texts)
}

#[cfg(feature = "embedded")]
mod flash {
    use super::*;

    /// Flash page size for nRF52840 (4 KB).
    const FLASH_PAGE_SIZE: u32 = 4096;

    const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;
    const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

    /// Load the stored macro slots, or `None` on first boot / damage.
    pub async fn load_slots(
        flash: &mut impl embedded_storage_async::nor_flash::NorFlash,
    ) -> Option<[String<MACRO_TEXT_MAX>; BUTTON_COUNT]> {
        let mut buf = [0u8; MAX_RECORD_SIZE];

        match sequential_storage::map::fetch_item::<u8, &[u8], _>(
            flash,
            STORAGE_START..STORAGE_END,
            &mut sequential_storage::cache::NoCache::new(),
            &mut buf,
            &KEY_MACRO_SLOTS,
        )
        .await
        {
            Ok(Some(data)) => {
                let slots = deserialize_slots(data);
                if slots.is_some() {
                    info!("loaded macro slots from flash");
                } else {
                    warn!("stored macro record is damaged, using defaults");
                }
                slots
            }
            Ok(None) => {
                info!("no macro slots in flash");
                None
            }
            Err(_) => {
                error!("flash read error while loading macro slots");
                None
            }
        }
    }

    /// Persist the current macro slots.
    pub async fn save_slots(
        flash: &mut impl embedded_storage_async::nor_flash::NorFlash,
        texts: &[&str; BUTTON_COUNT],
    ) {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let mut data_buf = [0u8; MAX_RECORD_SIZE];

        let len = serialize_slots(texts, &mut data_buf);
        if len == 0 {
            error!("macro record does not fit its buffer, not saved");
            return;
        }
        let item = &data_buf[..len];

        match sequential_storage::map::store_item::<u8, &[u8], _>(
            flash,
            STORAGE_START..STORAGE_END,
            &mut sequential_storage::cache::NoCache::new(),
            &mut buf,
            &KEY_MACRO_SLOTS,
            &item,
        )
        .await
        {
            Ok(_) => info!("saved macro slots to flash"),
            Err(_) => error!("flash write error while saving macro slots"),
        }
    }
}

#[cfg(feature = "embedded")]
pub use flash::{load_slots, save_slots};
