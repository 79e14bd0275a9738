//! Statement execution.

use std::rc::Rc;

use brewin_core::{BrewinError, SourceLocation, Type};
use brewin_parser::{DottedName, Stmt};

use crate::evaluator::free_vars;
use crate::flow::{ExecFlow, ExprFlow};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::thunk::Thunk;
use crate::value::{coerce_for_slot, Binding, Value};

impl<H: Host> Interpreter<H> {
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt]) -> Result<ExecFlow, BrewinError> {
        self.env.push_scope();
        let flow = self.exec_stmts(stmts);
        self.env.pop_scope();
        flow
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<ExecFlow, BrewinError> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                ExecFlow::Continue => {}
                other => return Ok(other),
            }
        }
        Ok(ExecFlow::Continue)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<ExecFlow, BrewinError> {
        match stmt {
            Stmt::VarDef { name, type_name, source } => self.exec_var_def(name, type_name, source),
            Stmt::Assign { target, expr, source } => self.exec_assign(target, expr, source),
            Stmt::Call(expr) => match self.eval_expr(expr)? {
                ExprFlow::Value(_) => Ok(ExecFlow::Continue),
                ExprFlow::Raise(tag) => Ok(ExecFlow::Raise(tag)),
            },
            Stmt::Return { expr, .. } => self.exec_return(expr.as_ref()),
            Stmt::If {
                condition,
                then_body,
                else_body,
                source,
            } => self.exec_if(condition, then_body, else_body.as_deref(), source),
            Stmt::For {
                init,
                condition,
                update,
                body,
                source,
            } => self.exec_for(init, condition, update, body, source),
            Stmt::Try { body, catchers, .. } => self.exec_try(body, catchers),
            Stmt::Raise { expr, source } => self.exec_raise(expr, source),
        }
    }

    fn exec_var_def(&mut self, name: &str, type_name: &str, source: &SourceLocation) -> Result<ExecFlow, BrewinError> {
        if type_name == "void" {
            return Err(BrewinError::type_error(format!(
                "'void' is not a valid type for variable '{}' at {}",
                name, source
            )));
        }
        let known = self.structs.known_names();
        if Type::from_name(type_name, &known).is_none() {
            return Err(BrewinError::type_error(format!(
                "Unknown type '{}' in declaration of '{}' at {}",
                type_name, name, source
            )));
        }
        if !self.env.create(name, type_name, Binding::nil()) {
            return Err(BrewinError::name(format!(
                "Duplicate definition for variable '{}' at {}",
                name, source
            )));
        }
        Ok(ExecFlow::Continue)
    }

    fn exec_assign(&mut self, target: &DottedName, expr: &brewin_parser::Expr, source: &SourceLocation) -> Result<ExecFlow, BrewinError> {
        if target.len() == 1 {
            let mut names = Vec::new();
            free_vars(expr, &mut names);
            let captured = self.env.snapshot(&names);
            let thunk = Thunk::new(Rc::new(expr.clone()), captured);
            if !self.env.set(&target[0], Binding::Thunk(thunk)) {
                return Err(BrewinError::name(format!(
                    "Undefined variable '{}' in assignment at {}",
                    target[0], source
                )));
            }
            return Ok(ExecFlow::Continue);
        }

        let value = match self.eval_expr(expr)? {
            ExprFlow::Value(v) => v,
            ExprFlow::Raise(tag) => return Ok(ExecFlow::Raise(tag)),
        };
        self.assign_field(target, value, source)
    }

    fn assign_field(&mut self, target: &DottedName, value: Value, source: &SourceLocation) -> Result<ExecFlow, BrewinError> {
        let base_binding = self.env.get(&target[0]).ok_or_else(|| {
            BrewinError::name(format!("Undefined variable '{}' in assignment at {}", target[0], source))
        })?;
        let mut current = match self.force_binding(base_binding)? {
            ExprFlow::Value(v) => v,
            ExprFlow::Raise(tag) => return Ok(ExecFlow::Raise(tag)),
        };

        let (path, last_field) = target[1..].split_at(target.len() - 2);
        for field in path {
            current = self.step_into_field(current, field, source)?;
        }

        let inst = match current {
            Value::Struct(inst) => inst,
            Value::Nil => {
                return Err(BrewinError::fault(format!(
                    "Cannot assign field '{}' of nil at {}",
                    last_field[0], source
                )))
            }
            other => {
                return Err(BrewinError::type_error(format!(
                    "Cannot assign a field of non-struct value '{}' at {}",
                    other, source
                )))
            }
        };

        let field_name = &last_field[0];
        let declared_type = self
            .structs
            .get(&inst.type_name)
            .and_then(|def| def.fields.iter().find(|f| &f.name == field_name))
            .map(|f| f.type_name.clone())
            .ok_or_else(|| {
                BrewinError::name(format!(
                    "'{}' is not a field of struct '{}' at {}",
                    field_name, inst.type_name, source
                ))
            })?;

        let coerced = coerce_for_slot(&declared_type, value, &self.structs.known_names(), source)?;
        inst.fields.borrow_mut().insert(field_name.clone(), coerced);
        Ok(ExecFlow::Continue)
    }

    fn step_into_field(&self, value: Value, field: &str, source: &SourceLocation) -> Result<Value, BrewinError> {
        match value {
            Value::Struct(inst) => inst.fields.borrow().get(field).cloned().ok_or_else(|| {
                BrewinError::name(format!(
                    "'{}' is not a field of struct '{}' at {}",
                    field, inst.type_name, source
                ))
            }),
            Value::Nil => Err(BrewinError::fault(format!(
                "Cannot access field '{}' of nil at {}",
                field, source
            ))),
            other => Err(BrewinError::type_error(format!(
                "Cannot access field '{}' of non-struct value '{}' at {}",
                field, other, source
            ))),
        }
    }

    fn exec_return(&mut self, expr: Option<&brewin_parser::Expr>) -> Result<ExecFlow, BrewinError> {
        let value = match expr {
            None => Self::void_value(),
            Some(expr) => match self.eval_expr(expr)? {
                ExprFlow::Value(v) => v,
                ExprFlow::Raise(tag) => return Ok(ExecFlow::Raise(tag)),
            },
        };
        Ok(ExecFlow::Return(value))
    }

    fn exec_if(
        &mut self,
        condition: &brewin_parser::Expr,
        then_body: &[Stmt],
        else_body: Option<&[Stmt]>,
        source: &SourceLocation,
    ) -> Result<ExecFlow, BrewinError> {
        let cond = match self.eval_expr(condition)? {
            ExprFlow::Value(v) => v,
            ExprFlow::Raise(tag) => return Ok(ExecFlow::Raise(tag)),
        };
        let truthy = match cond {
            Value::Bool(b) => b,
            Value::Int(n) => n != 0,
            other => {
                return Err(BrewinError::type_error(format!(
                    "Incompatible type '{}' for if condition at {}",
                    other, source
                )))
            }
        };
        if truthy {
            self.exec_block(then_body)
        } else if let Some(else_body) = else_body {
            self.exec_block(else_body)
        } else {
            Ok(ExecFlow::Continue)
        }
    }

    fn exec_for(
        &mut self,
        init: &Stmt,
        condition: &brewin_parser::Expr,
        update: &Stmt,
        body: &[Stmt],
        source: &SourceLocation,
    ) -> Result<ExecFlow, BrewinError> {
        self.env.push_scope();
        let result = (|| -> Result<ExecFlow, BrewinError> {
            match self.exec_stmt(init)? {
                ExecFlow::Continue => {}
                other => return Ok(other),
            }
            loop {
                let cond = match self.eval_expr(condition)? {
                    ExprFlow::Value(v) => v,
                    ExprFlow::Raise(tag) => return Ok(ExecFlow::Raise(tag)),
                };
                let truthy = match cond {
                    Value::Bool(b) => b,
                    Value::Int(n) => n != 0,
                    other => {
                        return Err(BrewinError::type_error(format!(
                            "Incompatible type '{}' for for-loop condition at {}",
                            other, source
                        )))
                    }
                };
                if !truthy {
                    return Ok(ExecFlow::Continue);
                }
                // Each iteration gets its own scope so a `var` declared in the
                // body doesn't collide with the next iteration's declaration.
                match self.exec_block(body)? {
                    ExecFlow::Continue => {}
                    other => return Ok(other),
                }
                match self.exec_stmt(update)? {
                    ExecFlow::Continue => {}
                    other => return Ok(other),
                }
            }
        })();
        self.env.pop_scope();
        result
    }

    fn exec_try(&mut self, body: &[Stmt], catchers: &[brewin_parser::Catcher]) -> Result<ExecFlow, BrewinError> {
        match self.exec_block(body)? {
            ExecFlow::Raise(tag) => {
                for catcher in catchers {
                    if catcher.exception_type == tag {
                        self.env.push_scope();
                        // The tag is bound to a variable of the same name as the
                        // tag itself, exactly as `raise`d — an odd corner of the
                        // original language, preserved rather than cleaned up.
                        self.env.create(&tag, "string", Binding::Value(Value::Str(tag.clone())));
                        let flow = self.exec_stmts(&catcher.body);
                        self.env.pop_scope();
                        return flow;
                    }
                }
                Ok(ExecFlow::Raise(tag))
            }
            other => Ok(other),
        }
    }

    fn exec_raise(&mut self, expr: &brewin_parser::Expr, source: &SourceLocation) -> Result<ExecFlow, BrewinError> {
        let value = match self.eval_expr(expr)? {
            ExprFlow::Value(v) => v,
            ExprFlow::Raise(tag) => return Ok(ExecFlow::Raise(tag)),
        };
        match value {
            Value::Str(tag) => Ok(ExecFlow::Raise(tag)),
            other => Err(BrewinError::type_error(format!(
                "'raise' requires a string exception tag, got '{}' at {}",
                other, source
            ))),
        }
    }
}
