//! Character cursor the scanner reads through.
//!
//! The host owns the input; the scanner only peeks at one character and moves forward. Two
//! kinds of forward motion exist: [Cursor::skip] drops the character from the token (the token
//! start moves along with it), [Cursor::advance] keeps it. Independently of how far the cursor
//! has moved, [Cursor::mark_end] commits the token end at the current position, which lets the
//! scanner look past the end of the token it is about to produce.

use std::ops::Range;

pub trait Cursor {
    /// Next character, `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Consume the lookahead character as part of the token.
    fn advance(&mut self);

    /// Consume the lookahead character as insignificant whitespace before the token.
    fn skip(&mut self);

    /// Commit the token end at the current position.
    fn mark_end(&mut self);

    fn is_eof(&self) -> bool {
        self.lookahead().is_none()
    }
}

/// In-memory cursor over a source string. Offsets are byte offsets into the full source.
#[derive(Debug, Clone)]
pub struct StrCursor<'a> {
    source: &'a str,
    /// Start of the token being scanned (moves with `skip`).
    start: usize,
    /// Provisional position; everything before it has been looked at.
    position: usize,
    /// Committed token end, if `mark_end` was called.
    end: Option<usize>,
}

impl<'a> StrCursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::at(source, 0)
    }

    /// A cursor positioned at `offset`. Offsets past the end clamp to the end; offsets that
    /// fall inside a multi-byte character move back to its first byte.
    pub fn at(source: &'a str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        Self {
            source,
            start: offset,
            position: offset,
            end: None,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn token_start(&self) -> usize {
        self.start
    }

    /// Committed end, or the provisional position if nothing was committed.
    pub fn token_end(&self) -> usize {
        self.end.unwrap_or(self.position)
    }

    pub fn token_span(&self) -> Range<usize> {
        self.start..self.token_end()
    }

    pub fn token_text(&self) -> &'a str {
        &self.source[self.token_span()]
    }

    /// Start a fresh token at `offset`, forgetting any committed end.
    pub fn reset(&mut self, offset: usize) {
        *self = Self::at(self.source, offset);
    }

    fn bump(&mut self) {
        if let Some(c) = self.lookahead() {
            self.position += c.len_utf8();
        }
    }
}

impl Cursor for StrCursor<'_> {
    fn lookahead(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn advance(&mut self) {
        self.bump();
    }

    fn skip(&mut self) {
        self.bump();
        self.start = self.position;
    }

    fn mark_end(&mut self) {
        self.end = Some(self.position);
    }
}
