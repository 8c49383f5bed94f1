//! Bluetooth Low Energy surface.
//!
//! The remote is a **Peripheral**: it advertises as a HID-over-GATT
//! keyboard and notifies key events to the bonded host. Connection
//! management and report encoding live in the SoftDevice HID service
//! task; the macro core only sees the [`HidChannel`] trait.
//!
//! Communication with the control loop is done via Embassy channels and
//! signals defined here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::error::Error;
use crate::hid::{HidChannel, KeyEvent};

/// Key events queued for the SoftDevice HID service task.
pub static KEY_EVENT_CHANNEL: Channel<CriticalSectionRawMutex, KeyEvent, 16> = Channel::new();

/// Raised when a long press asks for pairing mode; consumed by the BLE task.
pub static PAIRING_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Raised when a long press asks the host to open the configuration page;
/// consumed by the web-config collaborator.
pub static OPEN_BROWSER_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Status changes the BLE task publishes for the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleEvent {
    /// Advertising (re)started, connectable.
    Advertising,
    /// A host connected and subscribed to HID notifications.
    Connected,
    /// Connection lost or intentionally closed.
    Disconnected,
}

/// `HidChannel` backed by the key-event queue.
///
/// The queue decouples the poll-driven sequencer from the async GATT
/// notify path. A full queue means the link is not draining - reported as
/// a transient link failure so the sequencer aborts cleanly instead of
/// piling up stale keystrokes.
pub struct QueuedHid;

impl HidChannel for QueuedHid {
    fn send(&mut self, event: KeyEvent) -> Result<(), Error> {
        KEY_EVENT_CHANNEL
            .try_send(event)
            .map_err(|_| Error::TransientLinkError)
    }
}

/// Build the advertising payload: flags, the HID service UUID and the
/// complete local name. Returns the payload length, or 0 if `buf` is too
/// small for the name.
pub fn advertising_payload(name: &str, buf: &mut [u8]) -> usize {
    let name_bytes = name.as_bytes();
    let total = 3 + 4 + 2 + name_bytes.len();
    if buf.len() < total {
        return 0;
    }

    // Flags: LE General Discoverable, BR/EDR unsupported.
    buf[0] = 0x02;
    buf[1] = 0x01;
    buf[2] = 0x06;
    // Complete list of 16-bit service UUIDs: 0x1812 (HID).
    buf[3] = 0x03;
    buf[4] = 0x03;
    buf[5] = 0x12;
    buf[6] = 0x18;
    // Complete local name.
    buf[7] = (name_bytes.len() + 1) as u8;
    buf[8] = 0x09;
    buf[9..9 + name_bytes.len()].copy_from_slice(name_bytes);
    total
}
