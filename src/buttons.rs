//! Button hold monitor.
//!
//! Classifies each debounced press as a short tap (fire the button's
//! macro on release) or a long hold (fire a special device action while
//! still held). Durations are sampled from the control loop, so the
//! monitor needs only press/release edges plus a periodic `poll`.
//!
//! Special actions take precedence: once a hold has fired one, the
//! eventual release does not additionally fire the macro.

use crate::config::{RemoteConfig, BUTTON_COUNT};

/// What a classified button transition asks the device to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// Run the macro bound to this button.
    ExecuteMacro(usize),
    /// Put the BLE stack into pairing/advertising mode.
    EnterPairingMode,
    /// Ask the host to open the configuration web page.
    OpenWebBrowser,
}

/// Per-button lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Idle,
    Pressed,
    /// A special action fired during this press; release is a no-op.
    Actioned,
}

#[derive(Clone, Copy, Debug)]
struct ButtonState {
    phase: Phase,
    /// Valid while `phase != Idle` (ms).
    pressed_at: u64,
    fired_special: bool,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pressed_at: 0,
            fired_special: false,
        }
    }
}

/// Independent per-button state machines, polled from the control loop.
pub struct HoldMonitor {
    states: [ButtonState; BUTTON_COUNT],
    pairing_button: usize,
    browser_button: usize,
    pairing_hold_ms: u64,
    browser_hold_ms: u64,
}

impl HoldMonitor {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            states: [ButtonState::new(); BUTTON_COUNT],
            pairing_button: cfg.pairing_button,
            browser_button: cfg.browser_button,
            pairing_hold_ms: cfg.pairing_hold_ms,
            browser_hold_ms: cfg.browser_hold_ms,
        }
    }

    /// Record a press edge. Repeated press edges while already down are
    /// ignored (debouncer glitch).
    pub fn on_press(&mut self, button: usize, now: u64) {
        let Some(state) = self.states.get_mut(button) else {
            return;
        };
        if state.phase != Phase::Idle {
            return;
        }
        state.phase = Phase::Pressed;
        state.pressed_at = now;
        state.fired_special = false;
    }

    /// Record a release edge, returning the macro trigger if this press
    /// stayed short. A release after a special action fired returns
    /// nothing; release while idle is ignored.
    pub fn on_release(&mut self, button: usize) -> Option<ButtonAction> {
        let state = self.states.get_mut(button)?;
        let fired = match state.phase {
            Phase::Pressed => Some(ButtonAction::ExecuteMacro(button)),
            Phase::Actioned | Phase::Idle => None,
        };
        state.phase = Phase::Idle;
        fired
    }

    /// Evaluate hold durations. Fires a special action at most once per
    /// press, latching the button until release. Checked in button order,
    /// pairing before browser, so at most one action per call; a second
    /// eligible button fires on the next tick.
    pub fn poll(&mut self, now: u64) -> Option<ButtonAction> {
        for button in 0..BUTTON_COUNT {
            let state = &mut self.states[button];
            if state.phase != Phase::Pressed || state.fired_special {
                continue;
            }
            let held_for = now.saturating_sub(state.pressed_at);

            if button == self.pairing_button && held_for >= self.pairing_hold_ms {
                state.fired_special = true;
                state.phase = Phase::Actioned;
                info!("button {} held {} ms, entering pairing mode", button, held_for);
                return Some(ButtonAction::EnterPairingMode);
            }
            if button == self.browser_button && held_for >= self.browser_hold_ms {
                state.fired_special = true;
                state.phase = Phase::Actioned;
                info!("button {} held {} ms, opening web browser", button, held_for);
                return Some(ButtonAction::OpenWebBrowser);
            }
        }
        None
    }
}
