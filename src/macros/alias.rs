//! OS-action aliases - `{LOCK}`, `{SLEEP}`, `{SIGNOUT}`, `{RESTART}`,
//! `{SHUTDOWN}`.
//!
//! Each alias names a host-OS action and expands to a raw token string
//! that drives it. Two immutable tables exist; the platform flag in
//! `config` picks one at startup. The Windows-10 expansions walk the
//! Win+X quick-link menu, so their trailing letters must stay lower case.

/// A named OS-level action the token language can invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OsAction {
    Lock,
    Sleep,
    SignOut,
    Restart,
    ShutDown,
}

impl OsAction {
    /// Directive name → action. Names are case-sensitive, upper case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LOCK" => Some(OsAction::Lock),
            "SLEEP" => Some(OsAction::Sleep),
            "SIGNOUT" => Some(OsAction::SignOut),
            "RESTART" => Some(OsAction::Restart),
            "SHUTDOWN" => Some(OsAction::ShutDown),
            _ => None,
        }
    }
}

/// Alias → raw token string, fixed at compile time.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AliasTable {
    pub lock: &'static str,
    pub sleep: &'static str,
    pub sign_out: &'static str,
    pub restart: &'static str,
    pub shut_down: &'static str,
}

/// Expansions for a Windows 10 host.
pub const WINDOWS10: AliasTable = AliasTable {
    lock: "{WINDOWS}l{RELEASE_ALL}",
    sleep: "{WINDOWS}x{RELEASE_ALL}{!1}us",
    sign_out: "{WINDOWS}x{RELEASE_ALL}{!1}ui",
    restart: "{WINDOWS}x{RELEASE_ALL}{!1}ur",
    shut_down: "{WINDOWS}x{RELEASE_ALL}{!1}uu",
};

/// Expansions when no target OS is configured. There is no portable key
/// sequence for these actions, so every alias is a no-op rather than a
/// chord that would type stray characters at an unknown host.
pub const GENERIC: AliasTable = AliasTable {
    lock: "",
    sleep: "",
    sign_out: "",
    restart: "",
    shut_down: "",
};

impl AliasTable {
    /// Table selected by the platform flag.
    pub const fn select(windows10: bool) -> &'static AliasTable {
        if windows10 {
            &WINDOWS10
        } else {
            &GENERIC
        }
    }

    /// Raw expansion for an action.
    pub fn expansion(&self, action: OsAction) -> &'static str {
        match action {
            OsAction::Lock => self.lock,
            OsAction::Sleep => self.sleep,
            OsAction::SignOut => self.sign_out,
            OsAction::Restart => self.restart,
            OsAction::ShutDown => self.shut_down,
        }
    }
}
