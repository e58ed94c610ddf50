//! Reference Host
//!
//!     The scanner is meant to be called by a parsing engine. This module is a small stand-in
//!     for that engine so the scanner can be run over whole files, in tests and from the
//!     command line.
//!
//! The Host Loop
//!
//!     Before every token the host asks its [GrammarPolicy] which external tokens are valid
//!     and offers the current position to the scanner:
//!         1. The scanner produces a token: the host takes the cursor's token span as is and
//!            continues from its end. Only DEDENT may be zero width (queued dedents and the
//!            end-of-input unwinding consume nothing).
//!         2. The scanner declines: the host throws away whatever the cursor moved over and
//!            lexes one ordinary token from the same position. Comments are recognized by the
//!            configured comment character, everything else goes through the logos lexer in
//!            [tokens]. Whitespace and stray newlines are consumed silently.
//!     The loop ends when the scanner declines at end of input.
//!
//!     Tokens are returned as `(Token, Range<usize>)` pairs, byte ranges into the source.

pub mod grammar;
pub mod tokens;

pub use grammar::GrammarPolicy;
pub use tokens::{RawToken, Token};

use logos::Logos;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

use crate::scanner::{
    ExternalToken, IndentScanner, ScanError, ScannerConfig, StateError, StrCursor, ValidSymbols,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("scan failed at byte {offset}: {source}")]
    Scan {
        offset: usize,
        #[source]
        source: ScanError,
    },
    #[error("scanner produced an empty token at byte {offset}")]
    Stalled { offset: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostOptions {
    pub scanner: ScannerConfig,
    pub grammar: GrammarPolicy,
    /// Keep a record of every scanner invocation.
    pub trace: bool,
}

/// One scanner invocation as seen by the host.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub offset: usize,
    pub valid: ValidSymbols,
    pub token: Option<ExternalToken>,
    pub span: Range<usize>,
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} {} -> ", self.offset, self.valid)?;
        match self.token {
            Some(token) => write!(f, "{} {}..{}", token, self.span.start, self.span.end),
            None => f.write_str("decline"),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct HostOutput {
    pub tokens: Vec<(Token, Range<usize>)>,
    pub trace: Vec<ScanRecord>,
    pub scanner: IndentScanner,
}

pub struct Host<'a> {
    source: &'a str,
    scanner: IndentScanner,
    options: HostOptions,
    position: usize,
    tokens: Vec<(Token, Range<usize>)>,
    trace: Vec<ScanRecord>,
}

impl<'a> Host<'a> {
    pub fn new(source: &'a str, options: HostOptions) -> Self {
        Self {
            source,
            scanner: IndentScanner::with_config(options.scanner),
            options,
            position: 0,
            tokens: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Pick up at `offset` with the scanner restored from a snapshot taken there, the way an
    /// engine resumes lexing after an edit. Offsets inside a character move back to its start.
    pub fn resume(
        source: &'a str,
        options: HostOptions,
        offset: usize,
        snapshot: &[u8],
    ) -> Result<Self, StateError> {
        let mut host = Self::new(source, options);
        host.scanner.deserialize(snapshot)?;
        host.position = StrCursor::at(source, offset).position();
        Ok(host)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn scanner(&self) -> &IndentScanner {
        &self.scanner
    }

    pub fn tokens(&self) -> &[(Token, Range<usize>)] {
        &self.tokens
    }

    pub fn trace(&self) -> &[ScanRecord] {
        &self.trace
    }

    /// Produce the next token (or consume the next extra). Returns `false` once the input is
    /// exhausted and the scanner has nothing left to emit.
    pub fn step(&mut self) -> Result<bool, HostError> {
        let offset = self.position;
        let valid = self.options.grammar.valid_symbols(self.previous_significant());
        let mut cursor = StrCursor::at(self.source, offset);
        let produced = self
            .scanner
            .scan(&mut cursor, valid)
            .map_err(|source| HostError::Scan { offset, source })?;

        if self.options.trace {
            self.trace.push(ScanRecord {
                offset,
                valid,
                token: produced,
                span: cursor.token_span(),
            });
        }

        if let Some(kind) = produced {
            let span = cursor.token_span();
            if span.is_empty() && kind != ExternalToken::Dedent {
                return Err(HostError::Stalled { offset });
            }
            self.position = span.end;
            self.tokens.push((Token::from(kind), span));
            return Ok(true);
        }

        if offset >= self.source.len() {
            return Ok(false);
        }
        self.lex_ordinary();
        Ok(true)
    }

    /// Step until the input is exhausted.
    pub fn run(mut self) -> Result<HostOutput, HostError> {
        while self.step()? {}
        Ok(self.into_output())
    }

    /// Step until the host has moved to or past `offset` (or the input ends). Queued dedents
    /// at that point stay queued in the scanner state.
    pub fn run_to(&mut self, offset: usize) -> Result<(), HostError> {
        while self.position < offset {
            if !self.step()? {
                break;
            }
        }
        Ok(())
    }

    pub fn into_output(self) -> HostOutput {
        HostOutput {
            tokens: self.tokens,
            trace: self.trace,
            scanner: self.scanner,
        }
    }

    fn previous_significant(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .rev()
            .map(|(token, _)| token)
            .find(|token| !token.is_comment())
    }

    fn lex_ordinary(&mut self) {
        let start = self.position;
        let rest = &self.source[start..];

        if rest.starts_with(self.options.scanner.comment_char()) {
            let len = rest.find('\n').unwrap_or(rest.len());
            self.tokens
                .push((Token::Comment(rest[..len].to_string()), start..start + len));
            self.position = start + len;
            return;
        }

        let mut lexer = RawToken::lexer(rest);
        match lexer.next() {
            Some(Ok(raw)) => {
                let span = lexer.span();
                self.position = start + span.end;
                if let Some(token) = Token::from_raw(raw) {
                    self.tokens
                        .push((token, start + span.start..start + span.end));
                }
            }
            Some(Err(())) => {
                let span = lexer.span();
                let first_char = rest.chars().next().map_or(0, char::len_utf8);
                let end = start + span.end.max(first_char);
                self.tokens.push((
                    Token::Error(self.source[start..end].to_string()),
                    start..end,
                ));
                self.position = end;
            }
            None => self.position = self.source.len(),
        }
    }
}

/// Run the reference host over `source` and return the token stream.
pub fn tokenize(
    source: &str,
    options: &HostOptions,
) -> Result<Vec<(Token, Range<usize>)>, HostError> {
    Ok(Host::new(source, *options).run()?.tokens)
}

/// Render a token stream one token per line.
pub fn render_tokens(tokens: &[(Token, Range<usize>)], show_spans: bool) -> String {
    let mut out = String::new();
    for (token, span) in tokens {
        if show_spans {
            out.push_str(&format!("{}..{} {}\n", span.start, span.end, token));
        } else {
            out.push_str(&format!("{}\n", token));
        }
    }
    out
}
