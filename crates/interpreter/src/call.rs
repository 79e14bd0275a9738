//! Call machinery: resolving a function by name and arity, binding actual
//! arguments to formal parameters as thunks, and enforcing declared return
//! types on the way back out.

use std::rc::Rc;

use brewin_core::{BrewinError, SourceLocation, Type};
use brewin_parser::Expr;

use crate::evaluator::free_vars;
use crate::flow::{ExecFlow, ExprFlow};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::value::{Binding, Value};
use crate::{builtins, thunk::Thunk};

impl<H: Host> Interpreter<H> {
    pub(crate) fn eval_call(&mut self, name: &str, args: &[Expr], source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
        match name {
            "print" => builtins::call_print(self, args),
            "inputi" | "inputs" => builtins::call_input(self, name, args, source),
            _ => self.call_user_function(name, args, source),
        }
    }

    fn call_user_function(&mut self, name: &str, args: &[Expr], source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
        let func = self.functions.resolve(name, args.len()).ok_or_else(|| {
            BrewinError::name(format!(
                "Function '{}' taking {} argument(s) not found at {}",
                name,
                args.len(),
                source
            ))
        })?;

        // Every actual argument is a thunk over the *caller's* environment,
        // built before the callee's activation record is pushed. Each is
        // bound under its formal parameter's declared type, so a mismatched
        // argument is caught (lazily, the first time the parameter is read)
        // the same way a mismatched assignment is.
        let mut bound = Vec::with_capacity(args.len());
        for (param, arg_expr) in func.params.iter().zip(args) {
            let mut names = Vec::new();
            free_vars(arg_expr, &mut names);
            let captured = self.env.snapshot(&names);
            let thunk = Thunk::new(Rc::new(arg_expr.clone()), captured);
            bound.push((param.name.clone(), param.type_name.clone(), thunk));
        }

        self.env.push_activation();
        for (name, type_name, thunk) in bound {
            self.env.create(&name, &type_name, Binding::Thunk(thunk));
        }
        let flow = self.exec_block(&func.body);
        self.env.pop_activation();

        let returned = match flow? {
            ExecFlow::Continue => None,
            ExecFlow::Return(v) => Some(v),
            ExecFlow::Raise(tag) => return Ok(ExprFlow::Raise(tag)),
        };

        self.enforce_return_type(&func.return_type, returned, source)
    }

    fn enforce_return_type(
        &self,
        return_type: &str,
        returned: Option<Value>,
        source: &SourceLocation,
    ) -> Result<ExprFlow, BrewinError> {
        match (return_type, returned) {
            ("void", None) => Ok(ExprFlow::ok(Self::void_value())),
            ("void", Some(_)) => Err(BrewinError::type_error(format!(
                "void function at {} returned a value",
                source
            ))),
            (_, None) => Ok(ExprFlow::ok(Self::void_value())),
            (declared, Some(Value::Int(n))) if declared == "bool" => Ok(ExprFlow::ok(Value::Bool(n != 0))),
            (declared, Some(value)) => {
                let known = self.structs.known_names();
                let declared_type = Type::from_name(declared, &known).ok_or_else(|| {
                    BrewinError::type_error(format!("Unknown return type '{}' at {}", declared, source))
                })?;
                if value.is_nil() && matches!(declared_type, Type::Struct(_)) {
                    return Ok(ExprFlow::ok(value));
                }
                if value.type_tag() != declared_type {
                    return Err(BrewinError::type_error(format!(
                        "Function declared to return '{}' returned a value of type '{}' at {}",
                        declared,
                        value.type_tag(),
                        source
                    )));
                }
                Ok(ExprFlow::ok(value))
            }
        }
    }
}
