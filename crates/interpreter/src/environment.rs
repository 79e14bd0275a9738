//! Lexical scoping.
//!
//! A call stack of activation records, each of which is itself a stack of block
//! scopes (one per `{ ... }`). Lookups walk the current activation record's
//! scopes from innermost to outermost and never cross into an enclosing
//! activation record — Brewin has no closures over surrounding function scope,
//! only the explicit free-variable capture a [`crate::thunk::Thunk`] performs.

use std::collections::HashMap;

use crate::value::Binding;

/// A declared variable or parameter slot: the type it was declared with,
/// fixed for its lifetime, paired with its current binding (which may still
/// be an unforced thunk). Declared type is tracked separately from the
/// binding's runtime value because a freshly declared variable starts out
/// bound to `nil` regardless of its declared type.
#[derive(Debug, Clone)]
pub struct Slot {
    pub type_name: String,
    pub binding: Binding,
}

/// One function call's scopes, innermost last.
#[derive(Debug, Default)]
struct ActivationRecord {
    scopes: Vec<HashMap<String, Slot>>,
}

impl ActivationRecord {
    fn new() -> Self {
        ActivationRecord {
            scopes: vec![HashMap::new()],
        }
    }
}

#[derive(Debug)]
pub struct Environment {
    records: Vec<ActivationRecord>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            records: vec![ActivationRecord::new()],
        }
    }

    pub fn push_activation(&mut self) {
        self.records.push(ActivationRecord::new());
    }

    pub fn pop_activation(&mut self) {
        self.records.pop();
    }

    pub fn push_scope(&mut self) {
        self.current_mut().scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.current_mut().scopes.pop();
    }

    /// Defines `name` in the innermost scope of the current activation record,
    /// with `type_name` as its fixed declared type. Returns `false` if `name`
    /// is already defined in that exact scope (a duplicate `var` in the same
    /// block).
    pub fn create(&mut self, name: &str, type_name: &str, binding: Binding) -> bool {
        let scope = self.current_mut().scopes.last_mut().expect("activation record always has a scope");
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(
            name.to_string(),
            Slot {
                type_name: type_name.to_string(),
                binding,
            },
        );
        true
    }

    /// Looks up `name`'s current binding in the current activation record,
    /// innermost scope first.
    pub fn get(&self, name: &str) -> Option<Binding> {
        self.find_slot(name).map(|slot| slot.binding.clone())
    }

    /// Looks up `name`'s declared type, fixed at the point it was created with
    /// [`Environment::create`].
    pub fn declared_type(&self, name: &str) -> Option<String> {
        self.find_slot(name).map(|slot| slot.type_name.clone())
    }

    /// Rebinds the first scope (innermost out) that already defines `name`,
    /// keeping its declared type unchanged. Returns `false` if `name` is not
    /// defined anywhere in the current activation record.
    pub fn set(&mut self, name: &str, binding: Binding) -> bool {
        for scope in self.current_mut().scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                slot.binding = binding;
                return true;
            }
        }
        false
    }

    /// Snapshots the current slots of exactly the given names, for a thunk to
    /// capture (both the binding and its declared type, so a later re-read of
    /// the captured name still enforces the type it was declared with). Names
    /// with no current binding (shouldn't happen for a well-formed program)
    /// are silently skipped.
    pub fn snapshot(&self, names: &[String]) -> HashMap<String, Slot> {
        let mut out = HashMap::new();
        for name in names {
            if let Some(slot) = self.find_slot(name) {
                out.insert(name.clone(), slot.clone());
            }
        }
        out
    }

    fn find_slot(&self, name: &str) -> Option<&Slot> {
        for scope in self.current().scopes.iter().rev() {
            if let Some(slot) = scope.get(name) {
                return Some(slot);
            }
        }
        None
    }

    fn current(&self) -> &ActivationRecord {
        self.records.last().expect("environment always has an activation record")
    }

    fn current_mut(&mut self) -> &mut ActivationRecord {
        self.records.last_mut().expect("environment always has an activation record")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn shadowing_inner_scope_does_not_affect_outer() {
        let mut env = Environment::new();
        env.create("x", "int", Binding::Value(Value::Int(1)));
        env.push_scope();
        env.create("x", "int", Binding::Value(Value::Int(2)));
        assert!(matches!(env.get("x"), Some(Binding::Value(Value::Int(2)))));
        env.pop_scope();
        assert!(matches!(env.get("x"), Some(Binding::Value(Value::Int(1)))));
    }

    #[test]
    fn set_updates_the_defining_scope() {
        let mut env = Environment::new();
        env.create("x", "int", Binding::Value(Value::Int(1)));
        env.push_scope();
        assert!(env.set("x", Binding::Value(Value::Int(9))));
        env.pop_scope();
        assert!(matches!(env.get("x"), Some(Binding::Value(Value::Int(9)))));
    }

    #[test]
    fn activation_records_do_not_see_each_other() {
        let mut env = Environment::new();
        env.create("x", "int", Binding::Value(Value::Int(1)));
        env.push_activation();
        assert!(env.get("x").is_none());
        env.pop_activation();
        assert!(env.get("x").is_some());
    }

    #[test]
    fn declared_type_survives_reassignment() {
        let mut env = Environment::new();
        env.create("x", "bool", Binding::Value(Value::Bool(false)));
        env.set("x", Binding::Value(Value::Bool(true)));
        assert_eq!(env.declared_type("x").as_deref(), Some("bool"));
    }
}
