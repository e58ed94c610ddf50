//! The scanning algorithm.
//!
//! Each call makes at most one decision, in this order:
//!
//!     1. The host is in error recovery: decline.
//!     2. Dedents are queued and DEDENT is valid: hand one out (zero width).
//!     3. Skip spaces, tabs and carriage returns. They never form a token of their own.
//!     4. At end of input: close one open block per call while DEDENT is valid.
//!     5. At a newline: consume it, commit the token end there, then look ahead to measure the
//!        indentation of the next line that carries code, and compare it with the innermost
//!        open block:
//!            - deeper and INDENT valid: open a block, extend the token over the indentation
//!            - shallower and DEDENT valid: close every block wider than the new line, emit one
//!              DEDENT now and queue the rest
//!            - otherwise NEWLINE, if valid
//!     6. Anything else: decline.
//!
//! Measuring indentation
//!
//!     Spaces count one column, tabs four regardless of where they sit. A blank line resets the
//!     count, a comment runs to the end of its line and is not counted. Carriage returns count
//!     nothing and do not stop the measurement. Running into the end of input keeps the width
//!     counted so far; the block that opens is closed again by the end-of-input path.
//!
//! The scanner never mutates its state when it declines or fails, so re-running a call with the
//! same state, position and valid set always reaches the same decision.

use super::cursor::Cursor;
use super::error::{ScanError, StateError};
use super::state::{ScannerState, DEFAULT_MAX_DEPTH};
use super::token::{ExternalToken, ValidSymbols};

/// Columns a tab contributes to an indentation width.
pub const TAB_WIDTH: u32 = 4;

/// Default comment introducer.
pub const COMMENT_CHAR: char = '#';

/// Options that shape scanning but are not part of the serialized state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    max_depth: usize,
    comment_char: char,
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            comment_char: COMMENT_CHAR,
        }
    }

    /// Limit nesting depth. Values above [DEFAULT_MAX_DEPTH] are clamped to it.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(DEFAULT_MAX_DEPTH);
        self
    }

    pub fn with_comment_char(mut self, comment_char: char) -> Self {
        self.comment_char = comment_char;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn comment_char(&self) -> char {
        self.comment_char
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One scanner instance per parse session (or per speculative branch).
#[derive(Debug, Clone, Default)]
pub struct IndentScanner {
    state: ScannerState,
    config: ScannerConfig,
}

impl IndentScanner {
    /// A scanner in the start-of-input state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        Self {
            state: ScannerState::new(),
            config,
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.state.serialize()
    }

    pub fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, StateError> {
        self.state.serialize_into(buffer)
    }

    /// Restore a snapshot. An empty buffer resets; on error the current state is kept.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let state = ScannerState::deserialize(bytes)?;
        if state.depth() > self.config.max_depth {
            return Err(StateError::TooDeep {
                depth: state.depth(),
                max_depth: self.config.max_depth,
            });
        }
        self.state = state;
        Ok(())
    }

    /// Try to produce one synthetic token at the cursor.
    ///
    /// `Ok(None)` means the grammar's own token rules should handle this position; the host
    /// discards whatever the cursor moved over. On `Ok(Some(_))` the token spans from the
    /// cursor's token start to its committed end.
    pub fn scan<C>(
        &mut self,
        cursor: &mut C,
        valid: ValidSymbols,
    ) -> Result<Option<ExternalToken>, ScanError>
    where
        C: Cursor + ?Sized,
    {
        if valid.in_error_recovery() {
            return Ok(None);
        }

        if valid.contains(ExternalToken::Dedent) && self.state.take_pending_dedent() {
            cursor.mark_end();
            return Ok(Some(ExternalToken::Dedent));
        }

        while matches!(cursor.lookahead(), Some(' ' | '\t' | '\r')) {
            cursor.skip();
        }

        match cursor.lookahead() {
            None => return Ok(self.close_at_eof(cursor, valid)),
            Some('\n') => {}
            Some(_) => return Ok(None),
        }

        cursor.advance();
        cursor.mark_end();

        let width = self.measure_next_line(cursor);
        let current = u32::from(self.state.current_indent());

        if width > current && valid.contains(ExternalToken::Indent) {
            self.open_block(width)?;
            // the indentation belongs to the INDENT token
            cursor.mark_end();
            return Ok(Some(ExternalToken::Indent));
        }

        if width < current && valid.contains(ExternalToken::Dedent) {
            let closed = self.state.close_blocks_wider_than(width);
            if closed > 0 {
                // the first one goes out now, only the rest are queued
                self.state.queue_dedents(closed - 1);
                return Ok(Some(ExternalToken::Dedent));
            }
        }

        if valid.contains(ExternalToken::Newline) {
            return Ok(Some(ExternalToken::Newline));
        }

        Ok(None)
    }

    fn close_at_eof<C>(&mut self, cursor: &mut C, valid: ValidSymbols) -> Option<ExternalToken>
    where
        C: Cursor + ?Sized,
    {
        if valid.contains(ExternalToken::Dedent) && self.state.pop().is_some() {
            cursor.mark_end();
            return Some(ExternalToken::Dedent);
        }
        None
    }

    fn measure_next_line<C>(&self, cursor: &mut C) -> u32
    where
        C: Cursor + ?Sized,
    {
        let mut width: u32 = 0;
        loop {
            match cursor.lookahead() {
                Some(' ') => {
                    width = width.saturating_add(1);
                    cursor.advance();
                }
                Some('\t') => {
                    width = width.saturating_add(TAB_WIDTH);
                    cursor.advance();
                }
                // zero columns, and measuring goes on: a CRLF blank line resets at its '\n'
                Some('\r') => cursor.advance(),
                Some('\n') => {
                    width = 0;
                    cursor.advance();
                }
                Some(c) if c == self.config.comment_char => {
                    while cursor.lookahead().is_some_and(|c| c != '\n') {
                        cursor.advance();
                    }
                }
                Some(_) => return width,
                None => return width,
            }
        }
    }

    fn open_block(&mut self, width: u32) -> Result<(), ScanError> {
        if self.state.depth() >= self.config.max_depth {
            return Err(ScanError::DepthExceeded {
                max_depth: self.config.max_depth,
            });
        }
        let width = u16::try_from(width).map_err(|_| ScanError::WidthOverflow { width })?;
        self.state.push(width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::cursor::StrCursor;
    use std::ops::Range;

    type Outcome = (Option<ExternalToken>, Range<usize>);

    fn scan_at(scanner: &mut IndentScanner, source: &str, offset: usize) -> Outcome {
        scan_with(scanner, source, offset, ValidSymbols::all())
    }

    fn scan_with(
        scanner: &mut IndentScanner,
        source: &str,
        offset: usize,
        valid: ValidSymbols,
    ) -> Outcome {
        let mut cursor = StrCursor::at(source, offset);
        let token = scanner.scan(&mut cursor, valid).expect("scan failed");
        (token, cursor.token_span())
    }

    fn scanner_with(indents: &[u16], pending: u8) -> IndentScanner {
        let mut scanner = IndentScanner::new();
        let state = ScannerState::from_parts(indents.to_vec(), pending).unwrap();
        scanner.deserialize(&state.serialize()).unwrap();
        scanner
    }

    #[test]
    fn test_error_recovery_declines() {
        let mut scanner = scanner_with(&[4], 1);
        let mut cursor = StrCursor::new("\n    x");
        let token = scanner
            .scan(&mut cursor, ValidSymbols::error_recovery())
            .unwrap();
        assert_eq!(token, None);
        assert_eq!(cursor.position(), 0);
        assert_eq!(scanner.state().pending_dedents(), 1);
    }

    #[test]
    fn test_declines_on_code() {
        let mut scanner = IndentScanner::new();
        assert_eq!(scan_at(&mut scanner, "label start:", 0).0, None);
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_indent_swallows_leading_whitespace() {
        let mut scanner = IndentScanner::new();
        let (token, span) = scan_at(&mut scanner, "a:\n    b", 2);
        assert_eq!(token, Some(ExternalToken::Indent));
        assert_eq!(span, 2..7);
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_newline_ends_at_newline() {
        let mut scanner = scanner_with(&[4], 0);
        let (token, span) = scan_at(&mut scanner, "\n    b", 0);
        assert_eq!(token, Some(ExternalToken::Newline));
        assert_eq!(span, 0..1);
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_trailing_whitespace_is_skipped_before_newline() {
        let mut scanner = IndentScanner::new();
        let (token, span) = scan_at(&mut scanner, "x   \n  y", 1);
        assert_eq!(token, Some(ExternalToken::Indent));
        assert_eq!(span, 4..7);
    }

    #[test]
    fn test_multi_level_dedent_drains_one_per_call() {
        let mut scanner = scanner_with(&[4, 8], 0);
        let source = "\nx";

        let (token, span) = scan_at(&mut scanner, source, 0);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(span, 0..1);
        assert_eq!(scanner.state().pending_dedents(), 1);
        assert_eq!(scanner.state().depth(), 0);

        let (token, span) = scan_at(&mut scanner, source, 1);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(span, 1..1);
        assert_eq!(scanner.state().pending_dedents(), 0);

        assert_eq!(scan_at(&mut scanner, source, 1).0, None);
    }

    #[test]
    fn test_pending_dedents_wait_for_validity() {
        let mut scanner = scanner_with(&[], 1);
        let newline_only = ValidSymbols::none().with(ExternalToken::Newline);
        let (token, _) = scan_with(&mut scanner, "x", 0, newline_only);
        assert_eq!(token, None);
        assert_eq!(scanner.state().pending_dedents(), 1);
    }

    #[test]
    fn test_dedent_to_intermediate_width() {
        let mut scanner = scanner_with(&[4, 8], 0);
        let (token, _) = scan_at(&mut scanner, "\n      x", 0);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(scanner.state().indents(), &[4]);
        assert!(!scanner.state().has_pending_dedents());
    }

    #[test]
    fn test_end_of_input_unwinds_one_level_per_call() {
        let mut scanner = scanner_with(&[4, 8], 0);
        let (token, span) = scan_at(&mut scanner, "x", 1);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(span, 1..1);
        assert_eq!(scan_at(&mut scanner, "x", 1).0, Some(ExternalToken::Dedent));
        assert_eq!(scan_at(&mut scanner, "x", 1).0, None);
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_end_of_input_without_dedent_keeps_blocks_open() {
        let mut scanner = scanner_with(&[4], 0);
        let valid = ValidSymbols::all().without(ExternalToken::Dedent);
        assert_eq!(scan_with(&mut scanner, "", 0, valid).0, None);
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_comment_line_is_transparent() {
        let mut scanner = scanner_with(&[4], 0);
        let (token, span) = scan_at(&mut scanner, "\n# note\n    d", 0);
        assert_eq!(token, Some(ExternalToken::Newline));
        assert_eq!(span, 0..1);
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_custom_comment_char() {
        let config = ScannerConfig::new().with_comment_char(';');
        let mut scanner = IndentScanner::with_config(config);
        let (token, _) = scan_at(&mut scanner, "\n; note\nx", 0);
        assert_eq!(token, Some(ExternalToken::Newline));
        // '#' is ordinary code under this configuration
        let (token, _) = scan_at(&mut scanner, "\n  # x", 0);
        assert_eq!(token, Some(ExternalToken::Indent));
    }

    #[test]
    fn test_tab_counts_four_columns() {
        let mut with_tab = IndentScanner::new();
        let mut with_spaces = IndentScanner::new();
        scan_at(&mut with_tab, "\n\tx", 0);
        scan_at(&mut with_spaces, "\n    x", 0);
        assert_eq!(with_tab.state(), with_spaces.state());
        assert_eq!(with_tab.state().indents(), &[4]);

        // a tab after two spaces still adds four
        let mut mixed = IndentScanner::new();
        scan_at(&mut mixed, "\n  \tx", 0);
        assert_eq!(mixed.state().indents(), &[6]);
    }

    #[test]
    fn test_blank_lines_reset_width() {
        let mut scanner = IndentScanner::new();
        let (token, span) = scan_at(&mut scanner, "\n    \n\n  x", 0);
        assert_eq!(token, Some(ExternalToken::Indent));
        assert_eq!(span, 0..9);
        assert_eq!(scanner.state().indents(), &[2]);
    }

    #[test]
    fn test_carriage_returns_measure_nothing() {
        let mut scanner = scanner_with(&[4], 0);
        let (token, span) = scan_at(&mut scanner, "\r\n\r\n    x", 0);
        assert_eq!(token, Some(ExternalToken::Newline));
        assert_eq!(span, 1..2);
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_whitespace_before_end_of_input_keeps_its_width() {
        let mut scanner = IndentScanner::new();
        let (token, span) = scan_at(&mut scanner, "\n    ", 0);
        assert_eq!(token, Some(ExternalToken::Indent));
        assert_eq!(span, 0..5);
        assert_eq!(scanner.state().indents(), &[4]);

        let (token, span) = scan_at(&mut scanner, "\n    ", 5);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(span, 5..5);
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_blank_line_before_end_of_input_measures_zero() {
        let mut scanner = scanner_with(&[4], 0);
        let (token, span) = scan_at(&mut scanner, "\n    \n", 0);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(span, 0..1);
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_carriage_return_does_not_end_measurement() {
        let mut scanner = IndentScanner::new();
        let (token, span) = scan_at(&mut scanner, "\n\r\n  x", 0);
        assert_eq!(token, Some(ExternalToken::Indent));
        assert_eq!(span, 0..5);
        assert_eq!(scanner.state().indents(), &[2]);
    }

    #[test]
    fn test_closing_every_level_emits_every_dedent() {
        let widths: Vec<u16> = (1..=256).collect();
        let mut scanner = scanner_with(&widths, 0);
        let source = "\nc";

        let (token, span) = scan_at(&mut scanner, source, 0);
        assert_eq!(token, Some(ExternalToken::Dedent));
        assert_eq!(span, 0..1);
        assert_eq!(scanner.state().depth(), 0);
        assert_eq!(scanner.state().pending_dedents(), u8::MAX);

        let mut dedents = 1;
        while scan_at(&mut scanner, source, 1).0 == Some(ExternalToken::Dedent) {
            dedents += 1;
        }
        assert_eq!(dedents, 256);
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_indent_not_valid_falls_back_to_newline() {
        let mut scanner = IndentScanner::new();
        let valid = ValidSymbols::all().without(ExternalToken::Indent);
        let (token, span) = scan_with(&mut scanner, "\n    x", 0, valid);
        assert_eq!(token, Some(ExternalToken::Newline));
        assert_eq!(span, 0..1);
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_dedent_not_valid_falls_back_to_newline() {
        let mut scanner = scanner_with(&[4], 0);
        let valid = ValidSymbols::all().without(ExternalToken::Dedent);
        let (token, _) = scan_with(&mut scanner, "\nx", 0, valid);
        assert_eq!(token, Some(ExternalToken::Newline));
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_nothing_valid_declines_at_newline() {
        let mut scanner = scanner_with(&[4], 0);
        let (token, _) = scan_with(&mut scanner, "\nx", 0, ValidSymbols::none());
        assert_eq!(token, None);
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_depth_limit_is_reported() {
        let config = ScannerConfig::new().with_max_depth(1);
        let mut scanner = IndentScanner::with_config(config);
        scan_at(&mut scanner, "\n    x", 0);
        assert_eq!(scanner.state().indents(), &[4]);

        let mut cursor = StrCursor::new("\n        x");
        let result = scanner.scan(&mut cursor, ValidSymbols::all());
        assert_eq!(result, Err(ScanError::DepthExceeded { max_depth: 1 }));
        assert_eq!(scanner.state().indents(), &[4]);
    }

    #[test]
    fn test_width_overflow_is_reported() {
        let source = format!("\n{}x", "\t".repeat(16_384));
        let mut scanner = IndentScanner::new();
        let mut cursor = StrCursor::new(&source);
        let result = scanner.scan(&mut cursor, ValidSymbols::all());
        assert_eq!(result, Err(ScanError::WidthOverflow { width: 65_536 }));
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_max_depth_is_clamped() {
        let config = ScannerConfig::new().with_max_depth(10_000);
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_deserialize_respects_configured_depth() {
        let mut scanner = IndentScanner::with_config(ScannerConfig::new().with_max_depth(1));
        let deep = ScannerState::from_parts(vec![4, 8], 0).unwrap();
        assert_eq!(
            scanner.deserialize(&deep.serialize()),
            Err(StateError::TooDeep {
                depth: 2,
                max_depth: 1
            })
        );
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_deserialize_empty_resets() {
        let mut scanner = scanner_with(&[4, 8], 2);
        scanner.deserialize(&[]).unwrap();
        assert!(scanner.state().is_empty());
    }

    #[test]
    fn test_same_inputs_same_decision() {
        let source = "a:\n    b\n  c";
        let snapshot = scanner_with(&[4], 0).serialize();
        let mut first = IndentScanner::new();
        let mut second = IndentScanner::new();
        first.deserialize(&snapshot).unwrap();
        second.deserialize(&snapshot).unwrap();
        assert_eq!(scan_at(&mut first, source, 8), scan_at(&mut second, source, 8));
        assert_eq!(first.state(), second.state());
    }
}
