//! Call-by-need argument binding.
//!
//! Every actual argument to a user function (and every assignment's right-hand
//! side) is wrapped in a thunk instead of being evaluated eagerly. The thunk
//! captures the free variables of its expression at the moment it is created, so
//! forcing it later sees the values those names held *then*, not whatever they
//! hold by the time the thunk is actually forced. Forcing is memoized: a second
//! read of the same slot reuses the first result instead of recomputing it,
//! which is what makes it safe to force an argument with a side effect more than
//! once in the body of a function.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use brewin_parser::Expr;

use crate::environment::Slot;
use crate::value::Value;

#[derive(Debug)]
enum ThunkState {
    Unforced {
        expr: Rc<Expr>,
        env: HashMap<String, Slot>,
    },
    Forced(Value),
}

/// A shared, lazily-forced argument or assignment right-hand side.
///
/// Cloning a `Thunk` clones the `Rc`, not the underlying expression or
/// environment snapshot, so every alias of a given variable shares one
/// memoization cell.
#[derive(Debug, Clone)]
pub struct Thunk(Rc<RefCell<ThunkState>>);

impl Thunk {
    pub fn new(expr: Rc<Expr>, env: HashMap<String, Slot>) -> Self {
        Thunk(Rc::new(RefCell::new(ThunkState::Unforced { expr, env })))
    }

    /// Wraps an already-computed value; forcing it is then a no-op. Used for
    /// return values and other places that have a `Value` in hand but need to
    /// hand it to something that is typed to accept a `Thunk`.
    pub fn ready(value: Value) -> Self {
        Thunk(Rc::new(RefCell::new(ThunkState::Forced(value))))
    }

    /// Returns the memoized value without attempting to force, if already forced.
    pub fn peek(&self) -> Option<Value> {
        match &*self.0.borrow() {
            ThunkState::Forced(v) => Some(v.clone()),
            ThunkState::Unforced { .. } => None,
        }
    }

    /// Takes the pending expression and its captured environment, for the forcer
    /// to evaluate. Returns `None` if already forced.
    pub fn pending(&self) -> Option<(Rc<Expr>, HashMap<String, Slot>)> {
        match &*self.0.borrow() {
            ThunkState::Unforced { expr, env } => Some((Rc::clone(expr), env.clone())),
            ThunkState::Forced(_) => None,
        }
    }

    /// Records the result of forcing. Intentionally not called when forcing
    /// raises: a thunk whose expression raised stays unforced, so the next
    /// access (e.g. from inside a `catch` block) retries it rather than
    /// replaying a memoized failure that never happened.
    pub fn memoize(&self, value: Value) {
        *self.0.borrow_mut() = ThunkState::Forced(value);
    }
}
