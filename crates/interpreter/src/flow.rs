//! Control-flow signals threaded through evaluation.
//!
//! Two separate error channels exist side by side, matching the specification's
//! split between catchable and fatal errors:
//!
//! - A fatal [`brewin_core::BrewinError`] (`NAME_ERROR`/`TYPE_ERROR`) propagates
//!   through `Result::Err` and `?`, unwinding straight out of `run`. A program
//!   cannot catch these; they are interpreter-detected misuse, not language-level
//!   exceptions.
//! - A catchable exception (`raise "tag";`, or division by zero) is not an
//!   `Err` at all — it is a value threaded through `Ok`, since `try`/`catch` is
//!   ordinary control flow that the interpreter must be able to inspect and
//!   resume from, not something to unwind past.

use crate::value::Value;

/// The result of evaluating an expression.
#[derive(Debug, Clone)]
pub enum ExprFlow {
    Value(Value),
    Raise(String),
}

impl ExprFlow {
    pub fn ok(value: Value) -> Self {
        ExprFlow::Value(value)
    }
}

/// The result of executing a statement or a statement list.
#[derive(Debug, Clone)]
pub enum ExecFlow {
    /// Fell off the end of the block normally.
    Continue,
    Return(Value),
    Raise(String),
}

impl From<ExprFlow> for ExecFlow {
    fn from(flow: ExprFlow) -> Self {
        match flow {
            ExprFlow::Value(_) => ExecFlow::Continue,
            ExprFlow::Raise(tag) => ExecFlow::Raise(tag),
        }
    }
}
