//! The function table: every user-defined function, keyed by name and then by
//! arity so that overloads that differ only in parameter count resolve
//! correctly (Brewin has no overloading on type, only on arity).

use std::collections::HashMap;
use std::rc::Rc;

use brewin_core::BrewinError;
use brewin_parser::{FunctionDef, Program};

pub struct FunctionTable {
    by_name_and_arity: HashMap<String, HashMap<usize, Rc<FunctionDef>>>,
}

impl FunctionTable {
    pub fn from_program(program: &Program) -> Result<Self, BrewinError> {
        let mut by_name_and_arity: HashMap<String, HashMap<usize, Rc<FunctionDef>>> = HashMap::new();
        for func in &program.functions {
            let overloads = by_name_and_arity.entry(func.name.clone()).or_default();
            if overloads.contains_key(&func.params.len()) {
                return Err(BrewinError::name(format!(
                    "Duplicate definition of function '{}' with {} parameter(s)",
                    func.name,
                    func.params.len()
                )));
            }
            overloads.insert(func.params.len(), Rc::new(func.clone()));
        }
        Ok(FunctionTable { by_name_and_arity })
    }

    pub fn resolve(&self, name: &str, arity: usize) -> Option<Rc<FunctionDef>> {
        self.by_name_and_arity.get(name)?.get(&arity).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewin_parser::parse_program;

    #[test]
    fn resolves_overloads_by_arity() {
        let program = parse_program(
            "func f(): int { return 0; } func f(x: int): int { return x; }",
        )
        .unwrap();
        let table = FunctionTable::from_program(&program).unwrap();
        assert!(table.resolve("f", 0).is_some());
        assert!(table.resolve("f", 1).is_some());
        assert!(table.resolve("f", 2).is_none());
    }

    #[test]
    fn rejects_duplicate_arity() {
        let program = parse_program(
            "func f(): int { return 0; } func f(x: int): int { return x; } func f(y: int): int { return y; }",
        )
        .unwrap();
        assert!(FunctionTable::from_program(&program).is_err());
    }
}
