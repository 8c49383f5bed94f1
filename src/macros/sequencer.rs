//! Timed keystroke emission.
//!
//! Consumes a [`TokenStream`] and drives key-down/key-up traffic on the
//! HID channel, tracking held modifiers and enforcing inter-keystroke
//! spacing. All waits are expressed as a resume deadline checked on each
//! poll - never a blocking sleep - so button sampling stays live while a
//! `{!N}` pause or keystroke gap elapses.
//!
//! At most one stream is in flight at a time; the in-flight flag here is
//! the device-wide macro execution lock.

use crate::config::RemoteConfig;
use crate::error::Error;
use crate::hid::{HidChannel, Key, KeyEvent, Modifier, ModifierSet};
use crate::macros::parser::{Token, TokenStream};

/// Outcome of one poll tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// No macro in flight.
    Idle,
    /// In flight, waiting out a delay or keystroke gap.
    Waiting,
    /// Processed a token this tick.
    Emitted,
    /// Stream exhausted; run complete and lock released.
    Finished,
}

/// Poll-driven keystroke emitter. One per device.
pub struct Sequencer {
    stream: TokenStream,
    cursor: usize,
    held: ModifierSet,
    /// No emission before this instant (ms).
    resume_at: u64,
    in_flight: bool,
    spacing_ms: u32,
    delay_unit_ms: u32,
}

impl Sequencer {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            stream: TokenStream::new(),
            cursor: 0,
            held: ModifierSet::new(),
            resume_at: 0,
            in_flight: false,
            spacing_ms: cfg.keystroke_spacing_ms,
            delay_unit_ms: cfg.delay_unit_ms,
        }
    }

    /// True while a macro run owns the HID channel.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Modifiers currently held by the in-flight run.
    pub fn held_modifiers(&self) -> ModifierSet {
        self.held
    }

    /// Begin emitting a stream. Fails with [`Error::MacroInFlight`] if a
    /// run is already in progress; the new stream is dropped untouched.
    pub fn start(&mut self, stream: TokenStream, now: u64) -> Result<(), Error> {
        if self.in_flight {
            return Err(Error::MacroInFlight);
        }
        debug_assert!(self.held.is_empty());
        self.stream = stream;
        self.cursor = 0;
        self.resume_at = now;
        self.in_flight = true;
        Ok(())
    }

    /// Advance emission by at most one token.
    ///
    /// Called from the control loop every poll tick with the current time
    /// in milliseconds. Returns [`Step::Waiting`] without touching the
    /// channel while a deadline is pending. A channel failure aborts the
    /// remainder of the run, force-releases held modifiers and surfaces
    /// [`Error::TransientLinkError`]; the next run starts from a clean set.
    pub fn poll<C: HidChannel>(&mut self, now: u64, hid: &mut C) -> Result<Step, Error> {
        if !self.in_flight {
            return Ok(Step::Idle);
        }
        if now < self.resume_at {
            return Ok(Step::Waiting);
        }

        let Some(&token) = self.stream.get(self.cursor) else {
            return self.finish(hid);
        };
        self.cursor += 1;

        match token {
            Token::Literal(c) => {
                let key = Key::Char(c);
                self.send(hid, KeyEvent::Down(key))?;
                self.send(hid, KeyEvent::Up(key))?;
                self.resume_at = now + self.spacing_ms as u64;
                Ok(Step::Emitted)
            }
            Token::Press(m) => {
                // A second press of an already-held modifier is a no-op;
                // the host would ignore a repeated down anyway.
                if !self.held.contains(m) {
                    self.send(hid, KeyEvent::Down(Key::Modifier(m)))?;
                    self.held.insert(m);
                    self.resume_at = now + self.spacing_ms as u64;
                }
                Ok(Step::Emitted)
            }
            Token::ReleaseAll => {
                let released = !self.held.is_empty();
                if self.release_held(hid).is_err() {
                    self.in_flight = false;
                    self.cursor = self.stream.len();
                    return Err(Error::TransientLinkError);
                }
                if released {
                    self.resume_at = now + self.spacing_ms as u64;
                }
                Ok(Step::Emitted)
            }
            Token::Delay(n) => {
                self.resume_at = now + n as u64 * self.delay_unit_ms as u64;
                Ok(Step::Waiting)
            }
        }
    }

    /// Preempt the in-flight run, force-releasing held modifiers so no
    /// key leaks into the next run. No-op when idle.
    pub fn cancel<C: HidChannel>(&mut self, hid: &mut C) {
        if !self.in_flight {
            return;
        }
        warn!("cancelling in-flight macro at token {}", self.cursor);
        self.abort(hid);
    }

    /// Send one event, aborting the run on channel failure.
    fn send<C: HidChannel>(&mut self, hid: &mut C, event: KeyEvent) -> Result<(), Error> {
        if hid.send(event).is_err() {
            warn!("HID send failed, aborting macro at token {}", self.cursor);
            self.abort(hid);
            return Err(Error::TransientLinkError);
        }
        Ok(())
    }

    /// Stream exhausted: force-release anything still held, then drop the
    /// in-flight lock.
    fn finish<C: HidChannel>(&mut self, hid: &mut C) -> Result<Step, Error> {
        if !self.held.is_empty() {
            debug!("run ended with modifiers held, force-releasing");
        }
        let result = self.release_held(hid);
        self.in_flight = false;
        result.map(|_| Step::Finished)
    }

    /// Key-up every held modifier in bitfield order and empty the set.
    /// The set is emptied even when a send fails.
    fn release_held<C: HidChannel>(&mut self, hid: &mut C) -> Result<(), Error> {
        let mut failed = false;
        for m in Modifier::ALL {
            if self.held.contains(m) {
                failed |= hid.send(KeyEvent::Up(Key::Modifier(m))).is_err();
            }
        }
        self.held.clear();
        if failed {
            Err(Error::TransientLinkError)
        } else {
            Ok(())
        }
    }

    /// Tear down after a failure or cancellation: best-effort key-ups for
    /// held modifiers, clean set, lock released.
    fn abort<C: HidChannel>(&mut self, hid: &mut C) {
        let _ = self.release_held(hid);
        self.in_flight = false;
        self.cursor = self.stream.len();
    }
}
