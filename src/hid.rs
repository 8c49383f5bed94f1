//! Logical keystroke events handed to the BLE HID channel.
//!
//! The macro engine works in terms of key-down/key-up events on logical
//! keys; translating those into HID report bytes is the transport's job.
//! Modifier bit positions follow the boot-protocol keyboard report
//! (byte 0: bit 0 = Left Ctrl, bit 1 = Left Shift, bit 2 = Left Alt,
//! bit 3 = Left GUI) so a transport can build the modifier byte by OR-ing
//! `Modifier::bit` values.

use crate::error::Error;

/// Modifier keys the token language can press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modifier {
    /// Left Control.
    Ctrl,
    /// Left Shift.
    Shift,
    /// Left Alt.
    Alt,
    /// Left GUI - the Windows / "super" key.
    Windows,
}

impl Modifier {
    /// All modifiers in bitfield order. Iteration order of
    /// [`ModifierSet`] follows this.
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Shift, Modifier::Alt, Modifier::Windows];

    /// Boot-protocol modifier bit for this key.
    pub const fn bit(self) -> u8 {
        match self {
            Modifier::Ctrl => 0x01,
            Modifier::Shift => 0x02,
            Modifier::Alt => 0x04,
            Modifier::Windows => 0x08,
        }
    }
}

/// Set of currently-held modifiers, stored as a boot-protocol bitfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModifierSet(u8);

impl ModifierSet {
    /// Empty set.
    pub const fn new() -> Self {
        ModifierSet(0)
    }

    pub fn insert(&mut self, m: Modifier) {
        self.0 |= m.bit();
    }

    pub fn remove(&mut self, m: Modifier) {
        self.0 &= !m.bit();
    }

    pub fn contains(&self, m: Modifier) -> bool {
        self.0 & m.bit() != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw boot-protocol modifier byte.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Held modifiers in bitfield order (Ctrl, Shift, Alt, Windows).
    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

/// A logical key: a printable character or a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// A literal character keystroke, case-sensitive.
    Char(char),
    /// A modifier key.
    Modifier(Modifier),
}

/// A key transition handed to the HID transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// The Bluetooth HID channel the sequencer emits into.
///
/// The channel is an ordered, reliable collaborator: a returned `Ok` means
/// the event was accepted for transmission in order. The sequencer does not
/// retry failed sends - a failure aborts the remainder of the current macro
/// with [`Error::TransientLinkError`].
pub trait HidChannel {
    fn send(&mut self, event: KeyEvent) -> Result<(), Error>;
}
