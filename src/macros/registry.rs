//! Button → macro-string bindings and `{MACRO_n}` constant substitution.
//!
//! Four slots, one per button, sharing a single aggregate byte budget that
//! mirrors the usable EEPROM of the original remote. The web configuration
//! interface is the only writer; writes that would blow the budget are
//! rejected whole, never truncated.

use heapless::String;

use crate::config::{RemoteConfig, BUTTON_COUNT, EXPANDED_TEXT_MAX, MACRO_TEXT_MAX};
use crate::error::Error;

/// The `{MACRO_n}` token spellings, index-aligned with the constant table.
const CONSTANT_TOKENS: [&str; BUTTON_COUNT] = ["{MACRO_1}", "{MACRO_2}", "{MACRO_3}", "{MACRO_4}"];

/// One button binding.
#[derive(Clone, Debug)]
pub struct MacroSlot {
    /// Display label, never parsed.
    pub label: &'static str,
    /// Stored macro text, literal or token language.
    pub text: String<MACRO_TEXT_MAX>,
}

/// Stores the four button bindings and the macro-constant values.
pub struct MacroRegistry {
    slots: [MacroSlot; BUTTON_COUNT],
    constants: [&'static str; BUTTON_COUNT],
    budget: usize,
}

impl MacroRegistry {
    /// Empty registry with the build's labels, constants and budget.
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            slots: core::array::from_fn(|i| MacroSlot {
                label: cfg.labels[i],
                text: String::new(),
            }),
            constants: cfg.macro_constants,
            budget: cfg.storage_budget,
        }
    }

    /// Stored macro text for a button. Out-of-range indices read as empty.
    pub fn get(&self, button: usize) -> &str {
        self.slots.get(button).map(|s| s.text.as_str()).unwrap_or("")
    }

    /// Display label for a button.
    pub fn label(&self, button: usize) -> &str {
        self.slots.get(button).map(|s| s.label).unwrap_or("")
    }

    /// Aggregate stored size across all slots (bytes).
    pub fn total_len(&self) -> usize {
        self.slots.iter().map(|s| s.text.len()).sum()
    }

    /// Bind `text` to a button.
    ///
    /// Fails with [`Error::ConfigCapacityExceeded`] if the new aggregate
    /// size would exceed the storage budget; the previous value is retained
    /// unchanged on failure.
    pub fn set(&mut self, button: usize, text: &str) -> Result<(), Error> {
        if button >= BUTTON_COUNT {
            return Err(Error::InvalidConfig);
        }
        let others: usize = self
            .slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != button)
            .map(|(_, s)| s.text.len())
            .sum();
        if others + text.len() > self.budget {
            warn!(
                "macro write rejected: {} + {} bytes exceeds {}-byte budget",
                others,
                text.len(),
                self.budget
            );
            return Err(Error::ConfigCapacityExceeded);
        }
        self.slots[button].text = String::try_from(text).map_err(|_| Error::BufferOverflow)?;
        Ok(())
    }

    /// Stored texts in slot order, for persistence.
    pub fn texts(&self) -> [&str; BUTTON_COUNT] {
        core::array::from_fn(|i| self.slots[i].text.as_str())
    }

    /// Replace every well-formed `{MACRO_1}`..`{MACRO_4}` occurrence with
    /// its constant value.
    ///
    /// Single pass, left to right; inserted text is never re-scanned, so a
    /// constant whose value itself contains `{MACRO_n}` cannot loop.
    /// Unrecognized `{MACRO_n}`-shaped tokens pass through untouched for
    /// the parser to classify.
    pub fn substitute_constants(&self, text: &str) -> Result<String<EXPANDED_TEXT_MAX>, Error> {
        let mut out: String<EXPANDED_TEXT_MAX> = String::new();
        let mut rest = text;
        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]).map_err(|_| Error::BufferOverflow)?;
            rest = &rest[pos..];
            match CONSTANT_TOKENS.iter().position(|t| rest.starts_with(t)) {
                Some(i) => {
                    out.push_str(self.constants[i]).map_err(|_| Error::BufferOverflow)?;
                    rest = &rest[CONSTANT_TOKENS[i].len()..];
                }
                None => {
                    out.push('{').map_err(|_| Error::BufferOverflow)?;
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest).map_err(|_| Error::BufferOverflow)?;
        Ok(out)
    }
}
