//! Unified error type for bluekey.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Maximum length of a directive name carried inside an error.
/// Longest valid directive is `RELEASE_ALL`; anything that does not fit
/// this buffer is rejected as malformed before it can become "unknown".
pub const TOKEN_NAME_MAX: usize = 24;

/// Top-level error type used across the application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Configuration
    /// A macro write would push the aggregate slot size past the storage
    /// budget. The previous value is retained unchanged.
    ConfigCapacityExceeded,

    /// Startup configuration failed validation.
    InvalidConfig,

    // Macro language
    /// Ill-formed macro text: unterminated `{`, empty or nested directive,
    /// bad `!N` count, over-long identifier, or expansion depth exceeded.
    /// Execution is aborted before any keystroke is sent.
    MalformedMacro,

    /// A well-formed `{IDENTIFIER}` directive that names nothing we know.
    UnknownToken(heapless::String<TOKEN_NAME_MAX>),

    // Emission
    /// The HID channel failed to accept a report. Aborts the remainder of
    /// the current macro only; held modifiers are force-released.
    TransientLinkError,

    /// A macro is already being emitted; the new request was dropped.
    MacroInFlight,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,

    // Storage
    /// Flash read/write/erase failed.
    Storage,
}

impl Error {
    /// Build an `UnknownToken` error, truncating the name to capacity.
    pub fn unknown_token(name: &str) -> Self {
        let mut n: heapless::String<TOKEN_NAME_MAX> = heapless::String::new();
        for c in name.chars() {
            if n.push(c).is_err() {
                break;
            }
        }
        Error::UnknownToken(n)
    }
}
