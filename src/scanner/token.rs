//! External token kinds and the valid-symbol set handed in by the host.
//!
//! The order of the variants is the order the grammar declares its external tokens in, and
//! therefore the order of the host's `valid_symbols` array.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token kinds shared between the grammar and the scanner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalToken {
    Indent,
    Dedent,
    Newline,
    /// Marked valid by the host only while it is recovering from a syntax error. Never
    /// produced; its presence makes the scanner stand aside.
    ErrorSentinel,
}

impl ExternalToken {
    pub const ALL: [ExternalToken; 4] = [
        ExternalToken::Indent,
        ExternalToken::Dedent,
        ExternalToken::Newline,
        ExternalToken::ErrorSentinel,
    ];

    /// Position of this kind in the host's symbol array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ExternalToken::Indent => "INDENT",
            ExternalToken::Dedent => "DEDENT",
            ExternalToken::Newline => "NEWLINE",
            ExternalToken::ErrorSentinel => "ERROR_SENTINEL",
        }
    }
}

impl fmt::Display for ExternalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which external tokens the grammar accepts at the current position.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidSymbols([bool; 4]);

impl ValidSymbols {
    /// Nothing valid.
    pub fn none() -> Self {
        ValidSymbols([false; 4])
    }

    /// INDENT, DEDENT and NEWLINE valid; not in error recovery.
    pub fn all() -> Self {
        Self::none()
            .with(ExternalToken::Indent)
            .with(ExternalToken::Dedent)
            .with(ExternalToken::Newline)
    }

    /// Every kind valid, which is how hosts signal error recovery.
    pub fn error_recovery() -> Self {
        ValidSymbols([true; 4])
    }

    /// Build from a host array laid out in [ExternalToken::ALL] order. Missing trailing
    /// entries count as not valid, extra entries are ignored.
    pub fn from_slice(flags: &[bool]) -> Self {
        let mut symbols = Self::none();
        for (slot, flag) in symbols.0.iter_mut().zip(flags) {
            *slot = *flag;
        }
        symbols
    }

    pub fn with(mut self, kind: ExternalToken) -> Self {
        self.0[kind.index()] = true;
        self
    }

    pub fn without(mut self, kind: ExternalToken) -> Self {
        self.0[kind.index()] = false;
        self
    }

    pub fn contains(&self, kind: ExternalToken) -> bool {
        self.0[kind.index()]
    }

    pub fn in_error_recovery(&self) -> bool {
        self.contains(ExternalToken::ErrorSentinel)
    }
}

impl fmt::Display for ValidSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = ExternalToken::ALL
            .iter()
            .filter(|kind| self.contains(**kind))
            .map(|kind| kind.name())
            .collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
