//! Scanner
//!
//!     The indentation scanner is invoked by a parsing engine before every token. Each call
//!     receives the set of external tokens the grammar currently accepts and either consumes
//!     input and produces exactly one of INDENT, DEDENT or NEWLINE, or declines so the engine
//!     falls back to its ordinary lexing rules.
//!
//! State
//!
//!     The only persistent state is an indentation stack (strictly increasing widths, one per
//!     open block) and a counter of dedents that were decided but not yet handed out. Only one
//!     token may be produced per call, so closing several blocks at once queues the extra
//!     dedents and drains them on the following calls. See [state].
//!
//!     The state round-trips through a compact little-endian byte layout so the engine can
//!     checkpoint it at any buffer offset and restore it when re-lexing incrementally.
//!
//! Token Boundaries
//!
//!     The scanner looks past the end of the token it ends up producing. The [Cursor] keeps a
//!     provisional position and a committed token end apart: NEWLINE and DEDENT commit right
//!     after the newline character, INDENT commits after the leading whitespace of the new
//!     line, so the indentation is swallowed into the INDENT token. See [scan].

pub mod cursor;
pub mod error;
pub mod scan;
pub mod state;
pub mod token;

pub use cursor::{Cursor, StrCursor};
pub use error::{ScanError, StateError};
pub use scan::{IndentScanner, ScannerConfig, COMMENT_CHAR, TAB_WIDTH};
pub use state::{ScannerState, DEFAULT_MAX_DEPTH, SERIALIZATION_BUFFER_SIZE};
pub use token::{ExternalToken, ValidSymbols};
