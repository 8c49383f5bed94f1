//! Macro subsystem - storage, token language and timed emission.
//!
//! A button activation flows through here in a fixed order:
//!
//! 1. **Registry** - fetch the button's stored macro string and substitute
//!    `{MACRO_n}` constants (single pass, non-recursive).
//! 2. **Parser** - resolve the token language against the platform's alias
//!    table into an ordered [`TokenStream`].
//! 3. **Sequencer** - emit timed key-down/key-up events over the HID
//!    channel, tracking held modifiers.
//!
//! [`MacroEngine`] owns all three and enforces the device-wide invariant
//! that exactly one macro execution is in flight at a time.

pub mod alias;
pub mod parser;
pub mod registry;
pub mod sequencer;

pub use parser::{parse, Token, TokenStream};
pub use registry::MacroRegistry;
pub use sequencer::{Sequencer, Step};

use crate::config::RemoteConfig;
use crate::error::Error;
use crate::hid::HidChannel;
use crate::macros::alias::AliasTable;

/// Ties the registry, parser and sequencer together behind the policy
/// decisions: one run in flight, overlapping requests dropped.
pub struct MacroEngine {
    registry: MacroRegistry,
    aliases: &'static AliasTable,
    sequencer: Sequencer,
}

impl MacroEngine {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            registry: MacroRegistry::new(cfg),
            aliases: AliasTable::select(cfg.windows10_aliases),
            sequencer: Sequencer::new(cfg),
        }
    }

    /// The macro store, for the configuration interface and persistence.
    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MacroRegistry {
        &mut self.registry
    }

    /// True while a macro run owns the HID channel.
    pub fn is_in_flight(&self) -> bool {
        self.sequencer.is_in_flight()
    }

    /// Resolve and launch the macro bound to `button`.
    ///
    /// A press that lands while another macro is emitting is dropped with
    /// no side effect ([`Error::MacroInFlight`]); queuing stale keystrokes
    /// to replay seconds later would be worse than losing the press. Parse
    /// failures abort before any keystroke reaches the channel.
    pub fn execute_button(&mut self, button: usize, now: u64) -> Result<(), Error> {
        if self.sequencer.is_in_flight() {
            warn!("button {} pressed while a macro is emitting, dropped", button);
            return Err(Error::MacroInFlight);
        }
        let expanded = self.registry.substitute_constants(self.registry.get(button))?;
        let stream = parser::parse(&expanded, self.aliases)?;
        debug!("button {} macro resolved to {} tokens", button, stream.len());
        self.sequencer.start(stream, now)
    }

    /// Advance the in-flight run by one poll tick.
    pub fn poll<C: HidChannel>(&mut self, now: u64, hid: &mut C) -> Result<Step, Error> {
        self.sequencer.poll(now, hid)
    }

    /// Preempt the in-flight run (used before entering pairing mode).
    pub fn cancel<C: HidChannel>(&mut self, hid: &mut C) {
        self.sequencer.cancel(hid);
    }
}
