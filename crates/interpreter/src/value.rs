//! Runtime values.
//!
//! Lives here rather than in `brewin-core` because a deferred argument needs to
//! hold onto an AST expression and a snapshot of the environment it closed over.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use brewin_core::{BrewinError, SourceLocation, Type};

use crate::thunk::Thunk;

/// A struct instance. Identity (not field equality) is what Brewin compares when
/// two struct-typed expressions are checked with `==`/`!=`, so this is always
/// passed around behind an `Rc` and compared with `Rc::ptr_eq`.
#[derive(Debug)]
pub struct StructInstance {
    pub type_name: String,
    pub fields: RefCell<HashMap<String, Value>>,
}

impl StructInstance {
    pub fn new(type_name: String, fields: HashMap<String, Value>) -> Rc<Self> {
        Rc::new(StructInstance {
            type_name,
            fields: RefCell::new(fields),
        })
    }
}

/// A fully evaluated Brewin value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    /// The universal null value: a bare `nil` literal, and also the zero value of
    /// every struct-typed field and variable before it is assigned a `new` instance.
    Nil,
    Struct(Rc<StructInstance>),
}

impl Value {
    pub fn type_tag(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Str(_) => Type::String,
            Value::Bool(_) => Type::Bool,
            Value::Nil => Type::Nil,
            Value::Struct(s) => Type::Struct(s.type_name.clone()),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The zero value of a declared type: `0`, `""`, `false`, or `nil` for a
    /// struct-typed slot. Used to zero-initialize a `new` instance's fields.
    /// `None` if `type_name` is neither a primitive nor a name in
    /// `known_structs` — an invalid field type.
    pub fn zero_of(type_name: &str, known_structs: &HashSet<String>) -> Option<Value> {
        match type_name {
            "int" => Some(Value::Int(0)),
            "string" => Some(Value::Str(String::new())),
            "bool" => Some(Value::Bool(false)),
            other if known_structs.contains(other) => Some(Value::Nil),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
            Value::Struct(s) => write!(f, "{}", s.type_name),
        }
    }
}

/// What a variable slot or struct field can hold: either a value that's already
/// been computed, or a deferred argument that hasn't been forced yet.
#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Thunk(Thunk),
}

impl Binding {
    pub fn nil() -> Self {
        Binding::Value(Value::Nil)
    }
}

/// Coerces `value` to fit a slot (variable, parameter, field, or return value)
/// declared as `declared_type`, or reports a type error: `nil` is allowed into
/// a struct-typed slot, an `int` coerces to `bool`, and anything else must
/// already match exactly.
pub fn coerce_for_slot(
    declared_type: &str,
    value: Value,
    known_structs: &HashSet<String>,
    source: &SourceLocation,
) -> Result<Value, BrewinError> {
    let declared = Type::from_name(declared_type, known_structs).ok_or_else(|| {
        BrewinError::type_error(format!("Unknown type '{}' at {}", declared_type, source))
    })?;
    if value.is_nil() && matches!(declared, Type::Struct(_)) {
        return Ok(value);
    }
    if let (Type::Bool, Value::Int(n)) = (&declared, &value) {
        return Ok(Value::Bool(*n != 0));
    }
    if value.type_tag() != declared {
        return Err(BrewinError::type_error(format!(
            "Incompatible types: cannot use a value of type '{}' where '{}' is expected at {}",
            value.type_tag(),
            declared,
            source
        )));
    }
    Ok(value)
}
