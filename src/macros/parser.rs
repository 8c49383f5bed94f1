//! Macro token parser.
//!
//! Turns a macro string (after constant substitution) into an ordered
//! [`TokenStream`]. Text outside `{...}` is literal, one character per
//! token. A `{IDENTIFIER}` block is a directive: a modifier press, a
//! release-all, a timed pause `{!N}`, or an OS-action alias whose
//! expansion is parsed by this same grammar exactly once more.
//!
//! Parsing is deterministic and total: identical input always yields an
//! identical stream or an identical failure, and nothing is emitted to the
//! host until the whole string has parsed.

use heapless::{String, Vec};

use crate::error::{Error, TOKEN_NAME_MAX};
use crate::hid::Modifier;
use crate::macros::alias::{AliasTable, OsAction};

/// Upper bound on tokens in one macro run. An expanded macro string is at
/// most `EXPANDED_TEXT_MAX` bytes and multi-byte directives collapse to
/// single tokens, so this only trips on pathological alias nesting.
pub const MAX_TOKENS: usize = 1024;

/// Alias expansions may nest this many levels beyond the initial text.
const MAX_ALIAS_DEPTH: u8 = 1;

/// One resolved unit of a macro.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Token {
    /// A single literal character: key-down then key-up.
    Literal(char),
    /// Press a modifier and hold it until released.
    Press(Modifier),
    /// Release every currently-held modifier.
    ReleaseAll,
    /// Suspend emission for N delay units.
    Delay(u16),
}

/// An ordered, finite token sequence. Created per button activation and
/// discarded after emission.
pub type TokenStream = Vec<Token, MAX_TOKENS>;

/// Parse a substituted macro string against the given alias table.
pub fn parse(text: &str, aliases: &AliasTable) -> Result<TokenStream, Error> {
    let mut stream = TokenStream::new();
    parse_into(text, aliases, 0, &mut stream)?;
    Ok(stream)
}

fn parse_into(
    text: &str,
    aliases: &AliasTable,
    depth: u8,
    stream: &mut TokenStream,
) -> Result<(), Error> {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            push(stream, Token::Literal(c))?;
            continue;
        }

        // Scan the directive body up to the matching brace. Anything after
        // the closing brace - lower-case letters included - is ordinary
        // literal text again.
        let mut name: String<TOKEN_NAME_MAX> = String::new();
        let mut closed = false;
        for d in chars.by_ref() {
            match d {
                '}' => {
                    closed = true;
                    break;
                }
                // A nested brace can never start a valid identifier.
                '{' => return Err(Error::MalformedMacro),
                _ => name.push(d).map_err(|_| Error::MalformedMacro)?,
            }
        }
        if !closed || name.is_empty() {
            return Err(Error::MalformedMacro);
        }

        dispatch(&name, aliases, depth, stream)?;
    }
    Ok(())
}

/// Resolve one `{IDENTIFIER}` directive.
fn dispatch(
    name: &str,
    aliases: &AliasTable,
    depth: u8,
    stream: &mut TokenStream,
) -> Result<(), Error> {
    // `{!N}`: a pure timing token, N a positive decimal integer.
    if let Some(count) = name.strip_prefix('!') {
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedMacro);
        }
        let n: u16 = count.parse().map_err(|_| Error::MalformedMacro)?;
        if n == 0 {
            return Err(Error::MalformedMacro);
        }
        return push(stream, Token::Delay(n));
    }

    match name {
        "WINDOWS" => push(stream, Token::Press(Modifier::Windows)),
        "CTRL" => push(stream, Token::Press(Modifier::Ctrl)),
        "ALT" => push(stream, Token::Press(Modifier::Alt)),
        "SHIFT" => push(stream, Token::Press(Modifier::Shift)),
        "RELEASE_ALL" => push(stream, Token::ReleaseAll),
        _ => match OsAction::from_name(name) {
            Some(action) => {
                if depth >= MAX_ALIAS_DEPTH {
                    return Err(Error::MalformedMacro);
                }
                parse_into(aliases.expansion(action), aliases, depth + 1, stream)
            }
            None => Err(Error::unknown_token(name)),
        },
    }
}

fn push(stream: &mut TokenStream, token: Token) -> Result<(), Error> {
    stream.push(token).map_err(|_| Error::BufferOverflow)
}
