//! Error types for scanning and state restoration.
//!
//! Declining to produce a token is not an error; it is `Ok(None)` from
//! [IndentScanner::scan](super::IndentScanner::scan). These types cover the conditions that
//! would otherwise corrupt the indentation stack.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("indentation nested deeper than {max_depth} levels")]
    DepthExceeded { max_depth: usize },
    #[error("indentation width {width} does not fit in 16 bits")]
    WidthOverflow { width: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("serialized state truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("serialized state has {extra} trailing bytes")]
    TrailingBytes { extra: usize },
    #[error("serialized stack size {0} is negative")]
    NegativeDepth(i16),
    #[error("serialized stack size {depth} exceeds the maximum of {max_depth}")]
    TooDeep { depth: usize, max_depth: usize },
    #[error("indentation stack is not strictly increasing at level {index}")]
    NotIncreasing { index: usize },
    #[error("serialization buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}
