//! Test-only library interface for bluekey.
//!
//! Re-exports the pure logic - macro registry, token parser, keystroke
//! sequencer and button hold monitor - so it can be tested on the host
//! (no embedded hardware required).
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and is built with `--features embedded`.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod buttons;
pub mod config;
pub mod error;
pub mod hid;
pub mod macros;
pub mod storage;

#[cfg(feature = "embedded")]
pub mod ble;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
