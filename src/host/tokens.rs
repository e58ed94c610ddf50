//! Token definitions for the reference host
//!
//! The host lexes everything the indentation scanner declines with a plain logos lexer. These
//! raw tokens stand in for the grammar's ordinary token rules; they know nothing about
//! indentation. Comments are not lexed here because the comment introducer is configurable;
//! the host recognizes them itself before falling back to logos.
use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scanner::ExternalToken;

/// Raw tokens produced by the logos lexer.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
pub enum RawToken {
    // Horizontal whitespace between tokens
    #[regex(r"[ \t\r\f]+")]
    Whitespace,

    // Newlines the scanner did not claim (blank lines, or NEWLINE not valid)
    #[token("\n")]
    Newline,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Word(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| lex.slice().to_string())]
    Str(String),

    // Any other single character that is not whitespace or a quote
    #[regex(r#"[^\sA-Za-z0-9_"']"#, |lex| lex.slice().chars().next())]
    Punct(char),
}

/// Tokens as the host emits them: the scanner's synthetic tokens interleaved with ordinary ones.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Indent,
    Dedent,
    Newline,
    Word(String),
    Number(String),
    Str(String),
    Punct(char),
    Comment(String),
    /// Text no ordinary rule matched, such as an unterminated string.
    Error(String),
}

impl Token {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Token::Indent | Token::Dedent | Token::Newline)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    /// Convert a raw token, dropping extras.
    pub fn from_raw(raw: RawToken) -> Option<Token> {
        Some(match raw {
            RawToken::Whitespace | RawToken::Newline => return None,
            RawToken::Word(s) => Token::Word(s),
            RawToken::Number(s) => Token::Number(s),
            RawToken::Str(s) => Token::Str(s),
            RawToken::Punct(c) => Token::Punct(c),
        })
    }
}

impl From<ExternalToken> for Token {
    fn from(kind: ExternalToken) -> Self {
        match kind {
            ExternalToken::Indent => Token::Indent,
            ExternalToken::Dedent => Token::Dedent,
            ExternalToken::Newline => Token::Newline,
            // never produced by the scanner
            ExternalToken::ErrorSentinel => Token::Error(kind.name().to_string()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Indent => f.write_str("INDENT"),
            Token::Dedent => f.write_str("DEDENT"),
            Token::Newline => f.write_str("NEWLINE"),
            Token::Word(s) => write!(f, "word {s}"),
            Token::Number(s) => write!(f, "number {s}"),
            Token::Str(s) => write!(f, "string {s}"),
            Token::Punct(c) => write!(f, "punct {c}"),
            Token::Comment(s) => write!(f, "comment {s}"),
            Token::Error(s) => write!(f, "error {s:?}"),
        }
    }
}
