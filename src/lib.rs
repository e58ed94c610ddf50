//! # indent-scanner
//!
//! An external scanner that augments a grammar's lexer with the three synthetic tokens
//! indentation-sensitive languages need: INDENT, DEDENT and NEWLINE.
//!
//! File Layout
//!
//! The [scanner] module is the core: persistent state, the scanning algorithm and the state
//! (de)serialization the host uses to checkpoint and restore. Everything around it plays the
//! role of the parsing engine that would normally call into the scanner:
//!
//! src/
//!   ├── scanner     The core. Owns state, decides which synthetic token (if any) to emit
//!   ├── host        A reference host that drives the scanner over a whole source string
//!   └── settings    Bridges `indent-config` data into scanner and host options
//!
//! The binary in `src/bin` is a thin shell over [host] for inspecting token streams and
//! serialized states.

pub mod host;
pub mod scanner;
pub mod settings;

pub use host::{tokenize, HostError, HostOptions, Token};
pub use scanner::{
    Cursor, ExternalToken, IndentScanner, ScanError, ScannerConfig, ScannerState, StateError,
    StrCursor, ValidSymbols,
};
