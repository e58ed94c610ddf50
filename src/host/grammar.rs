//! Valid-symbol policies.
//!
//! A real parsing engine derives the valid set from its parse table. The reference host only
//! needs something close enough to exercise the scanner, so it looks at the last significant
//! token it emitted.

use super::tokens::Token;
use crate::scanner::{ExternalToken, ValidSymbols};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrammarPolicy {
    /// INDENT, DEDENT and NEWLINE are always valid.
    #[default]
    Permissive,
    /// Blocks open only after a `:`; NEWLINE is not valid at the very start or right after
    /// another NEWLINE.
    ColonBlocks,
}

impl GrammarPolicy {
    /// `previous` is the last emitted token that is not a comment.
    pub fn valid_symbols(&self, previous: Option<&Token>) -> ValidSymbols {
        match self {
            GrammarPolicy::Permissive => ValidSymbols::all(),
            GrammarPolicy::ColonBlocks => {
                let mut valid = ValidSymbols::none().with(ExternalToken::Dedent);
                if matches!(previous, Some(Token::Punct(':'))) {
                    valid = valid.with(ExternalToken::Indent);
                }
                if !matches!(previous, None | Some(Token::Newline)) {
                    valid = valid.with(ExternalToken::Newline);
                }
                valid
            }
        }
    }
}
