//! The struct registry: field schemas for every `struct` definition, and
//! zero-initialization of new instances.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use brewin_core::{BrewinError, SourceLocation};
use brewin_parser::{Program, StructDef};

use crate::value::{StructInstance, Value};

pub struct StructRegistry {
    defs: HashMap<String, Rc<StructDef>>,
}

impl StructRegistry {
    /// Builds the registry, rejecting any field whose declared type is
    /// neither a primitive nor the name of another struct in the program.
    pub fn from_program(program: &Program) -> Result<Self, BrewinError> {
        let defs: HashMap<String, Rc<StructDef>> = program
            .structs
            .iter()
            .map(|s| (s.name.clone(), Rc::new(s.clone())))
            .collect();

        let known: HashSet<String> = defs.keys().cloned().collect();
        for def in defs.values() {
            for field in &def.fields {
                let ty = field.type_name.as_str();
                if !matches!(ty, "int" | "string" | "bool") && !known.contains(ty) {
                    return Err(BrewinError::type_error(format!(
                        "Unknown type '{}' for field '{}' of struct '{}' at {}",
                        ty, field.name, def.name, def.source
                    )));
                }
            }
        }

        Ok(StructRegistry { defs })
    }

    pub fn known_names(&self) -> HashSet<String> {
        self.defs.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Rc<StructDef>> {
        self.defs.get(name)
    }

    /// Allocates a new instance of `type_name` with every field set to the zero
    /// value of its declared type: `0`, `""`, `false`, or `nil` for struct-typed
    /// fields. This is what `new Foo` evaluates to.
    pub fn instantiate(&self, type_name: &str, source: &SourceLocation) -> Result<Rc<StructInstance>, BrewinError> {
        let def = self.defs.get(type_name).ok_or_else(|| {
            BrewinError::type_error(format!("Unknown struct type '{}' at {}", type_name, source))
        })?;
        let known = self.known_names();
        let mut fields = HashMap::new();
        for field in &def.fields {
            // `from_program` already validated every field's type, so this
            // can only fail if a struct's own definition changed underneath
            // a stale `Rc<StructDef>` — not a reachable condition here.
            let zero = Value::zero_of(&field.type_name, &known).ok_or_else(|| {
                BrewinError::type_error(format!(
                    "Invalid field type '{}' for field '{}' of struct '{}' at {}",
                    field.type_name, field.name, type_name, source
                ))
            })?;
            fields.insert(field.name.clone(), zero);
        }
        Ok(StructInstance::new(type_name.to_string(), fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewin_parser::parse_program;

    #[test]
    fn instantiate_zero_initializes_fields() {
        let program = parse_program("struct s { a: int b: string c: bool d: s }").unwrap();
        let registry = StructRegistry::from_program(&program).unwrap();
        let loc = SourceLocation::new(0, 0);
        let inst = registry.instantiate("s", &loc).unwrap();
        let fields = inst.fields.borrow();
        assert!(matches!(fields.get("a"), Some(Value::Int(0))));
        assert!(matches!(fields.get("b"), Some(Value::Str(s)) if s.is_empty()));
        assert!(matches!(fields.get("c"), Some(Value::Bool(false))));
        assert!(matches!(fields.get("d"), Some(Value::Nil)));
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let program = parse_program("struct s { a: bogus }").unwrap();
        assert!(StructRegistry::from_program(&program).is_err());
    }
}
