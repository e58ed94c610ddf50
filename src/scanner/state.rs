//! Persistent scanner state and its byte layout.
//!
//! Layout (little-endian):
//!
//!     i16        number of open levels
//!     u16 * n    indentation widths, bottom of the stack first
//!     u8         pending dedents
//!
//! An empty buffer stands for the state at the very start of input.

use super::error::StateError;

/// Deepest nesting the state can represent. A line closing every level emits one DEDENT at
/// once and queues the other 255, which is what the single pending byte holds.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Size of the buffer hosts hand to `serialize`. A full stack fits with room to spare.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

const DEPTH_BYTES: usize = std::mem::size_of::<i16>();
const WIDTH_BYTES: usize = std::mem::size_of::<u16>();
const PENDING_BYTES: usize = std::mem::size_of::<u8>();

/// Indentation stack plus the dedents still owed to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScannerState {
    /// Widths of the open blocks, strictly increasing from bottom to top.
    indents: Vec<u16>,
    /// DEDENT tokens already decided but not yet emitted.
    pending_dedents: u8,
}

impl ScannerState {
    /// The state at the start of input: no open blocks, nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from raw parts, checking the stack invariant.
    pub fn from_parts(indents: Vec<u16>, pending_dedents: u8) -> Result<Self, StateError> {
        check_increasing(&indents)?;
        Ok(Self {
            indents,
            pending_dedents,
        })
    }

    pub fn indents(&self) -> &[u16] {
        &self.indents
    }

    pub fn depth(&self) -> usize {
        self.indents.len()
    }

    /// Width of the innermost open block, 0 at top level.
    pub fn current_indent(&self) -> u16 {
        self.indents.last().copied().unwrap_or(0)
    }

    pub fn pending_dedents(&self) -> u8 {
        self.pending_dedents
    }

    pub fn has_pending_dedents(&self) -> bool {
        self.pending_dedents > 0
    }

    /// True for the start-of-input state.
    pub fn is_empty(&self) -> bool {
        self.indents.is_empty() && self.pending_dedents == 0
    }

    /// Open a block. The caller guarantees `width > current_indent()`.
    pub(crate) fn push(&mut self, width: u16) {
        debug_assert!(width > self.current_indent());
        self.indents.push(width);
    }

    pub(crate) fn pop(&mut self) -> Option<u16> {
        self.indents.pop()
    }

    /// Close every block wider than `width`. Returns how many were closed.
    pub(crate) fn close_blocks_wider_than(&mut self, width: u32) -> usize {
        let mut closed = 0;
        while self
            .indents
            .last()
            .is_some_and(|top| u32::from(*top) > width)
        {
            self.indents.pop();
            closed += 1;
        }
        closed
    }

    /// Hand out one queued dedent, if any.
    pub(crate) fn take_pending_dedent(&mut self) -> bool {
        if self.pending_dedents == 0 {
            return false;
        }
        self.pending_dedents -= 1;
        true
    }

    pub(crate) fn queue_dedents(&mut self, count: usize) {
        let total = usize::from(self.pending_dedents) + count;
        self.pending_dedents = u8::try_from(total).unwrap_or(u8::MAX);
    }

    /// Number of bytes [serialize_into](Self::serialize_into) writes.
    pub fn serialized_len(&self) -> usize {
        DEPTH_BYTES + self.indents.len() * WIDTH_BYTES + PENDING_BYTES
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buffer = vec![0; self.serialized_len()];
        let written = self.write_bytes(&mut buffer);
        buffer.truncate(written);
        buffer
    }

    /// Write into a host-provided buffer, returning the number of bytes used.
    pub fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, StateError> {
        let needed = self.serialized_len();
        if buffer.len() < needed {
            return Err(StateError::BufferTooSmall {
                needed,
                available: buffer.len(),
            });
        }
        Ok(self.write_bytes(buffer))
    }

    fn write_bytes(&self, buffer: &mut [u8]) -> usize {
        // Depth never exceeds DEFAULT_MAX_DEPTH, which fits an i16.
        let depth = i16::try_from(self.indents.len()).unwrap_or(i16::MAX);
        let mut size = 0;
        buffer[size..size + DEPTH_BYTES].copy_from_slice(&depth.to_le_bytes());
        size += DEPTH_BYTES;
        for width in &self.indents {
            buffer[size..size + WIDTH_BYTES].copy_from_slice(&width.to_le_bytes());
            size += WIDTH_BYTES;
        }
        buffer[size] = self.pending_dedents;
        size + PENDING_BYTES
    }

    /// Decode a snapshot produced by [serialize](Self::serialize). An empty buffer decodes to
    /// the start-of-input state.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        if bytes.len() < DEPTH_BYTES + PENDING_BYTES {
            return Err(StateError::Truncated {
                expected: DEPTH_BYTES + PENDING_BYTES,
                actual: bytes.len(),
            });
        }

        let depth = i16::from_le_bytes([bytes[0], bytes[1]]);
        let depth = usize::try_from(depth).map_err(|_| StateError::NegativeDepth(depth))?;
        let expected = DEPTH_BYTES + depth * WIDTH_BYTES + PENDING_BYTES;
        if bytes.len() < expected {
            return Err(StateError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(StateError::TrailingBytes {
                extra: bytes.len() - expected,
            });
        }

        let widths = &bytes[DEPTH_BYTES..DEPTH_BYTES + depth * WIDTH_BYTES];
        let indents: Vec<u16> = widths
            .chunks_exact(WIDTH_BYTES)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        let pending_dedents = bytes[expected - PENDING_BYTES];

        Self::from_parts(indents, pending_dedents)
    }
}

fn check_increasing(indents: &[u16]) -> Result<(), StateError> {
    let mut below = 0u16;
    for (index, width) in indents.iter().enumerate() {
        if *width <= below {
            return Err(StateError::NotIncreasing { index });
        }
        below = *width;
    }
    Ok(())
}
