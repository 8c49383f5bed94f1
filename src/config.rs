//! Application-wide constants and compile-time configuration.
//!
//! Everything a user would tune lives here: button labels, the four
//! `{MACRO_n}` substitution values, OS-alias selection, and all timing
//! parameters. The `RemoteConfig` struct snapshots these constants into a
//! validated structure built once at startup.

use crate::error::Error;

// Buttons

/// Number of physical macro buttons.
pub const BUTTON_COUNT: usize = 4;

/// Web-interface button labels. Display-only, never parsed.
pub const BUTTON_LABELS: [&str; BUTTON_COUNT] = ["Button A", "Button B", "Button C", "Button D"];

/// Button (0-based) that enters pairing mode when held.
pub const PAIRING_BUTTON: usize = 0;

/// Button (0-based) that opens the configuration web page when held.
pub const BROWSER_BUTTON: usize = 3;

/// Hold duration before the pairing button triggers pairing mode (ms).
pub const PAIRING_HOLD_MS: u64 = 5000;

/// Hold duration before button 4 triggers the web-browser action (ms).
pub const BROWSER_HOLD_MS: u64 = 5000;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Period of the control loop that samples hold durations and advances
/// macro emission (ms). Must be well under `KEYSTROKE_SPACING_MS`.
pub const POLL_PERIOD_MS: u64 = 5;

// Macro language

/// Key values used in place of `{MACRO_1}`..`{MACRO_4}`.
///
/// Changing these requires a rebuild, but referencing a constant costs
/// only the token's bytes against the storage budget - "{MACRO_1}" is
/// 9 bytes of storage no matter how long its value is.
pub const MACRO_CONSTANTS: [&str; BUTTON_COUNT] = [
    "Button 1 macro",
    "Button 2 macro",
    "Button 3 macro",
    "Button 4 macro",
];

/// Set when the paired host is a Windows 10 PC; selects the alias table
/// used for `{LOCK}`, `{SLEEP}`, `{SIGNOUT}`, `{RESTART}`, `{SHUTDOWN}`.
pub const TARGET_WINDOWS10: bool = true;

/// Aggregate byte budget for all four stored macro strings.
/// Matches the usable EEPROM of the original remote hardware.
pub const MACRO_STORAGE_BUDGET: usize = 509;

/// Capacity of a single macro slot. Equal to the whole budget so the
/// aggregate check alone bounds every write.
pub const MACRO_TEXT_MAX: usize = MACRO_STORAGE_BUDGET;

/// Capacity of a macro string after `{MACRO_n}` substitution.
pub const EXPANDED_TEXT_MAX: usize = 1024;

// Timing

/// Spacing enforced between consecutive keystrokes (ms). Accommodates
/// hosts with slow input buffers.
pub const KEYSTROKE_SPACING_MS: u32 = 20;

/// Milliseconds per `{!N}` delay unit. The stock alias macros use `{!1}`
/// to wait for the Win+X menu to open.
pub const DELAY_UNIT_MS: u32 = 1000;

// Bluetooth

/// Name advertised to hosts. Passed through to the BLE stack, not parsed.
pub const DEVICE_NAME: &str = "Blue Key Remote";

// Macro-slot storage (embedded)

/// Flash page index where macro-slot storage starts (4 KB pages).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for macro-slot storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;

/// Snapshot of the tunables above, validated once at startup.
///
/// Keeping the running firmware on a struct instead of raw constants means
/// every bound is checked in one place and the test suite can exercise
/// non-default layouts.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteConfig {
    /// Display labels, one per button.
    pub labels: [&'static str; BUTTON_COUNT],
    /// `{MACRO_1}`..`{MACRO_4}` substitution values.
    pub macro_constants: [&'static str; BUTTON_COUNT],
    /// Selects the Windows-10 alias table when set.
    pub windows10_aliases: bool,
    /// Inter-keystroke spacing (ms).
    pub keystroke_spacing_ms: u32,
    /// Milliseconds per `{!N}` unit.
    pub delay_unit_ms: u32,
    /// Pairing-button hold threshold (ms).
    pub pairing_hold_ms: u64,
    /// Browser-button hold threshold (ms).
    pub browser_hold_ms: u64,
    /// Button that triggers pairing when held.
    pub pairing_button: usize,
    /// Button that triggers the web browser when held.
    pub browser_button: usize,
    /// Advertised BLE device name.
    pub device_name: &'static str,
    /// Aggregate byte budget across all macro slots.
    pub storage_budget: usize,
}

impl RemoteConfig {
    /// The configuration baked into this firmware build.
    pub const fn firmware_defaults() -> Self {
        Self {
            labels: BUTTON_LABELS,
            macro_constants: MACRO_CONSTANTS,
            windows10_aliases: TARGET_WINDOWS10,
            keystroke_spacing_ms: KEYSTROKE_SPACING_MS,
            delay_unit_ms: DELAY_UNIT_MS,
            pairing_hold_ms: PAIRING_HOLD_MS,
            browser_hold_ms: BROWSER_HOLD_MS,
            pairing_button: PAIRING_BUTTON,
            browser_button: BROWSER_BUTTON,
            device_name: DEVICE_NAME,
            storage_budget: MACRO_STORAGE_BUDGET,
        }
    }

    /// Check every bound the original firmware only enforced textually.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pairing_button >= BUTTON_COUNT || self.browser_button >= BUTTON_COUNT {
            return Err(Error::InvalidConfig);
        }
        if self.pairing_hold_ms == 0 || self.browser_hold_ms == 0 {
            return Err(Error::InvalidConfig);
        }
        if self.delay_unit_ms == 0 {
            return Err(Error::InvalidConfig);
        }
        if self.storage_budget > MACRO_TEXT_MAX {
            return Err(Error::InvalidConfig);
        }
        if self.device_name.is_empty() {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::firmware_defaults()
    }
}
