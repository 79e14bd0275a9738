//! The interpreter: struct registry, function table and environment wired
//! together behind a [`Host`].

use brewin_core::{BrewinError, SourceLocation};
use brewin_parser::Program;

use crate::environment::Environment;
use crate::flow::ExecFlow;
use crate::functions::FunctionTable;
use crate::host::Host;
use crate::structs::StructRegistry;
use crate::value::Value;

pub struct Interpreter<H: Host> {
    pub(crate) structs: StructRegistry,
    pub(crate) functions: FunctionTable,
    pub(crate) env: Environment,
    pub(crate) host: H,
}

impl<H: Host> Interpreter<H> {
    pub fn new(program: &Program, host: H) -> Result<Self, BrewinError> {
        let functions = FunctionTable::from_program(program)?;
        let structs = StructRegistry::from_program(program)?;
        Ok(Interpreter {
            structs,
            functions,
            env: Environment::new(),
            host,
        })
    }

    /// Runs the program's zero-argument `main` function to completion.
    ///
    /// An uncaught `raise` surfaces as a fatal error rather than silently
    /// succeeding — a top-level program that raises and never catches has
    /// nothing left to hand the exception to.
    pub fn run(&mut self) -> Result<(), BrewinError> {
        let main = self
            .functions
            .resolve("main", 0)
            .ok_or_else(|| BrewinError::name("No main() function with 0 parameters was found"))?;

        self.env.push_activation();
        let flow = self.exec_block(&main.body);
        self.env.pop_activation();

        match flow? {
            ExecFlow::Continue | ExecFlow::Return(_) => Ok(()),
            ExecFlow::Raise(tag) => Err(BrewinError::fault(format!(
                "Uncaught exception '{}' escaped main()",
                tag
            ))),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub(crate) fn source_unknown() -> SourceLocation {
        SourceLocation::default()
    }

    pub(crate) fn void_value() -> Value {
        Value::Nil
    }
}
