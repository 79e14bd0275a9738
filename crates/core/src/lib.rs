//! Brewin Core: shared value representation and error types
//!
//! This crate provides the language-agnostic-within-Brewin foundation used by both
//! the parser and the interpreter:
//!
//! - `Type`: the closed set of type tags (primitives plus user struct names).
//! - `SourceLocation`: source position for diagnostics.
//! - `BrewinError`/`ErrorKind`: the three error kinds surfaced to the host.
//!
//! The runtime `Value` (Int/String/Bool/Nil/struct instances/thunks) lives in
//! `brewin_interpreter::value` since it is tightly coupled to AST expression nodes and
//! the environment.

pub mod error;
pub mod source;
pub mod value;

pub use error::{BrewinError, ErrorKind};
pub use source::SourceLocation;
pub use value::Type;
