//! Expression evaluation: literals, variable/field lookup, unary and binary
//! operators, `new`, and thunk forcing.

use std::rc::Rc;

use brewin_core::{BrewinError, SourceLocation};
use brewin_parser::{BinaryOp, DottedName, Expr, UnaryOp};

use crate::flow::ExprFlow;
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::value::{coerce_for_slot, Binding, Value};

impl<H: Host> Interpreter<H> {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<ExprFlow, BrewinError> {
        match expr {
            Expr::IntLit(n) => Ok(ExprFlow::ok(Value::Int(*n))),
            Expr::StringLit(s) => Ok(ExprFlow::ok(Value::Str(s.clone()))),
            Expr::BoolLit(b) => Ok(ExprFlow::ok(Value::Bool(*b))),
            Expr::NilLit => Ok(ExprFlow::ok(Value::Nil)),
            Expr::Var(path, source) => self.eval_var(path, source),
            Expr::Call { name, args, source } => self.eval_call(name, args, source),
            Expr::Unary { op, operand, source } => self.eval_unary(*op, operand, source),
            Expr::Binary { op, left, right, source } => self.eval_binary(*op, left, right, source),
            Expr::New { type_name, source } => {
                let inst = self.structs.instantiate(type_name, source)?;
                Ok(ExprFlow::ok(Value::Struct(inst)))
            }
        }
    }

    fn eval_var(&mut self, path: &DottedName, source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
        let declared_type = self.env.declared_type(&path[0]).ok_or_else(|| {
            BrewinError::name(format!("Variable '{}' not found at {}", path[0], source))
        })?;
        let binding = self.env.get(&path[0]).expect("declared_type succeeded, so get must too");
        let base = match self.force_binding(binding)? {
            ExprFlow::Value(v) => v,
            raise => return Ok(raise),
        };
        // The variable's own declared type is enforced here, lazily, at the
        // point its thunk is actually forced and read — not at assignment
        // time, so an assignment that is never read never has to pay for the
        // check (or surface a mismatch) at all.
        let base = coerce_for_slot(&declared_type, base, &self.structs.known_names(), source)?;
        self.follow_path(base, &path[1..], source)
    }

    fn follow_path(&self, mut value: Value, rest: &[String], source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
        for field in rest {
            let inst = match value {
                Value::Struct(inst) => inst,
                Value::Nil => {
                    return Err(BrewinError::fault(format!(
                        "Cannot access field '{}' of nil at {}",
                        field, source
                    )))
                }
                other => {
                    return Err(BrewinError::type_error(format!(
                        "Cannot access field '{}' of non-struct value '{}' at {}",
                        field, other, source
                    )))
                }
            };
            let next = inst
                .fields
                .borrow()
                .get(field)
                .cloned()
                .ok_or_else(|| {
                    BrewinError::name(format!(
                        "'{}' is not a field of struct '{}' at {}",
                        field, inst.type_name, source
                    ))
                })?;
            value = next;
        }
        Ok(ExprFlow::ok(value))
    }

    /// Forces a binding if it is a thunk, memoizing the result. A raise
    /// encountered while forcing is *not* memoized: the thunk is left pending so
    /// a later force (e.g. inside a `catch`) retries the expression.
    pub(crate) fn force_binding(&mut self, binding: Binding) -> Result<ExprFlow, BrewinError> {
        let thunk = match binding {
            Binding::Value(v) => return Ok(ExprFlow::ok(v)),
            Binding::Thunk(t) => t,
        };
        if let Some(v) = thunk.peek() {
            return Ok(ExprFlow::ok(v));
        }
        let (expr, captured) = thunk
            .pending()
            .expect("thunk is either forced (handled above) or pending");

        self.env.push_activation();
        for (name, slot) in captured {
            self.env.create(&name, &slot.type_name, slot.binding);
        }
        let result = self.eval_expr(&expr);
        self.env.pop_activation();

        match result? {
            ExprFlow::Value(v) => {
                thunk.memoize(v.clone());
                Ok(ExprFlow::ok(v))
            }
            raise @ ExprFlow::Raise(_) => Ok(raise),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
        let value = match self.eval_expr(operand)? {
            ExprFlow::Value(v) => v,
            raise => return Ok(raise),
        };
        match op {
            UnaryOp::Neg => match value {
                Value::Int(n) => Ok(ExprFlow::ok(Value::Int(-n))),
                other => Err(BrewinError::type_error(format!(
                    "Cannot negate non-int value '{}' at {}",
                    other, source
                ))),
            },
            UnaryOp::Not => {
                let b = coerce_to_bool(&value).ok_or_else(|| {
                    BrewinError::type_error(format!(
                        "Cannot apply '!' to non-bool value '{}' at {}",
                        value, source
                    ))
                })?;
                Ok(ExprFlow::ok(Value::Bool(!b)))
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        source: &SourceLocation,
    ) -> Result<ExprFlow, BrewinError> {
        let left_val = match self.eval_expr(left)? {
            ExprFlow::Value(v) => v,
            raise => return Ok(raise),
        };

        // Short-circuit before the right operand is even evaluated, so a
        // crashing or raising second operand is never touched.
        if op == BinaryOp::And {
            if let Some(false) = coerce_to_bool(&left_val) {
                return Ok(ExprFlow::ok(Value::Bool(false)));
            }
        }
        if op == BinaryOp::Or {
            if let Some(true) = coerce_to_bool(&left_val) {
                return Ok(ExprFlow::ok(Value::Bool(true)));
            }
        }

        let right_val = match self.eval_expr(right)? {
            ExprFlow::Value(v) => v,
            raise => return Ok(raise),
        };

        if op == BinaryOp::Div {
            if let Value::Int(0) = right_val {
                return Ok(ExprFlow::Raise("div0".to_string()));
            }
        }

        eval_binary_op(op, left_val, right_val, source)
    }
}

/// `true`/`false` as-is; a nonzero/zero int coerces to `true`/`false`. Nothing
/// else coerces.
fn coerce_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(n) => Some(*n != 0),
        _ => None,
    }
}

fn is_nil_like(value: &Value) -> bool {
    matches!(value, Value::Nil)
}

fn eval_binary_op(op: BinaryOp, left: Value, right: Value, source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
    // int/bool mix with a logical or equality operator: coerce both to bool.
    let mixed_int_bool = matches!(
        (&left, &right),
        (Value::Int(_), Value::Bool(_)) | (Value::Bool(_), Value::Int(_))
    );
    if mixed_int_bool {
        if let (Some(l), Some(r)) = (coerce_to_bool(&left), coerce_to_bool(&right)) {
            return eval_bool_op(op, l, r, source);
        }
    }
    if let (Value::Int(_), Value::Int(_)) = (&left, &right) {
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let l = coerce_to_bool(&left).unwrap();
            let r = coerce_to_bool(&right).unwrap();
            return eval_bool_op(op, l, r, source);
        }
    }

    // Struct identity comparison: same Rc means the same instance.
    if let (Value::Struct(l), Value::Struct(r)) = (&left, &right) {
        return match op {
            BinaryOp::Eq => Ok(ExprFlow::ok(Value::Bool(Rc::ptr_eq(l, r)))),
            BinaryOp::Ne => Ok(ExprFlow::ok(Value::Bool(!Rc::ptr_eq(l, r)))),
            _ => Err(BrewinError::type_error(format!(
                "Cannot apply '{}' to struct values at {}",
                op.as_str(),
                source
            ))),
        };
    }

    // nil vs. struct, or nil vs. nil, both allowed for ==/!=.
    let left_is_struct_or_nil = matches!(left, Value::Struct(_) | Value::Nil);
    let right_is_struct_or_nil = matches!(right, Value::Struct(_) | Value::Nil);
    if (left_is_struct_or_nil || right_is_struct_or_nil) && matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        let equal = match (is_nil_like(&left), is_nil_like(&right)) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => {
                return Err(BrewinError::type_error(format!(
                    "Cannot compare two different struct values with '{}' at {}",
                    op.as_str(),
                    source
                )))
            }
        };
        return Ok(ExprFlow::ok(Value::Bool(if op == BinaryOp::Eq {
            equal
        } else {
            !equal
        })));
    }

    // nil compared against a primitive with anything but ==/!= is nonsensical.
    if (is_nil_like(&left) || is_nil_like(&right)) && !matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        return Err(BrewinError::type_error(format!(
            "Cannot compare nil with '{}' at {}",
            op.as_str(),
            source
        )));
    }
    if is_nil_like(&left) != is_nil_like(&right) && matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        return Ok(ExprFlow::ok(Value::Bool(op == BinaryOp::Ne)));
    }

    match (left, right) {
        (Value::Int(l), Value::Int(r)) => eval_int_op(op, l, r, source),
        (Value::Str(l), Value::Str(r)) => eval_string_op(op, l, r, source),
        (Value::Bool(l), Value::Bool(r)) => eval_bool_op(op, l, r, source),
        (Value::Nil, Value::Nil) => match op {
            BinaryOp::Eq => Ok(ExprFlow::ok(Value::Bool(true))),
            BinaryOp::Ne => Ok(ExprFlow::ok(Value::Bool(false))),
            _ => Err(BrewinError::type_error(format!(
                "Cannot apply '{}' to nil at {}",
                op.as_str(),
                source
            ))),
        },
        // Two primitives of different type (int/string, string/bool, ...):
        // == and != are always defined and simply report unequal; any other
        // operator is a type error.
        (_, _) if matches!(op, BinaryOp::Eq | BinaryOp::Ne) => {
            Ok(ExprFlow::ok(Value::Bool(op == BinaryOp::Ne)))
        }
        (l, r) => Err(BrewinError::type_error(format!(
            "Incompatible types for '{}' operation at {}: '{}' and '{}'",
            op.as_str(),
            source,
            l,
            r
        ))),
    }
}

/// Floor division: rounds the quotient toward negative infinity rather than
/// toward zero, so `7 / -2` is `-4`, not `-3`.
fn floor_div(l: i64, r: i64) -> i64 {
    let q = l / r;
    if l % r != 0 && (l < 0) != (r < 0) {
        q - 1
    } else {
        q
    }
}

fn eval_int_op(op: BinaryOp, l: i64, r: i64, source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
    let value = match op {
        BinaryOp::Add => Value::Int(l + r),
        BinaryOp::Sub => Value::Int(l - r),
        BinaryOp::Mul => Value::Int(l * r),
        BinaryOp::Div => Value::Int(floor_div(l, r)),
        BinaryOp::Lt => Value::Bool(l < r),
        BinaryOp::Le => Value::Bool(l <= r),
        BinaryOp::Gt => Value::Bool(l > r),
        BinaryOp::Ge => Value::Bool(l >= r),
        BinaryOp::Eq => Value::Bool(l == r),
        BinaryOp::Ne => Value::Bool(l != r),
        BinaryOp::And | BinaryOp::Or => {
            return Err(BrewinError::type_error(format!(
                "'{}' requires bool operands at {}",
                op.as_str(),
                source
            )))
        }
    };
    Ok(ExprFlow::ok(value))
}

fn eval_string_op(op: BinaryOp, l: String, r: String, source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
    let value = match op {
        BinaryOp::Add => Value::Str(l + &r),
        BinaryOp::Eq => Value::Bool(l == r),
        BinaryOp::Ne => Value::Bool(l != r),
        _ => {
            return Err(BrewinError::type_error(format!(
                "'{}' is not defined for strings at {}",
                op.as_str(),
                source
            )))
        }
    };
    Ok(ExprFlow::ok(value))
}

fn eval_bool_op(op: BinaryOp, l: bool, r: bool, source: &SourceLocation) -> Result<ExprFlow, BrewinError> {
    let value = match op {
        BinaryOp::And => Value::Bool(l && r),
        BinaryOp::Or => Value::Bool(l || r),
        BinaryOp::Eq => Value::Bool(l == r),
        BinaryOp::Ne => Value::Bool(l != r),
        _ => {
            return Err(BrewinError::type_error(format!(
                "'{}' is not defined for bools at {}",
                op.as_str(),
                source
            )))
        }
    };
    Ok(ExprFlow::ok(value))
}

/// Collects the base names (first path segment) of every variable referenced
/// in `expr`, for a thunk to snapshot at creation time. Dotted accesses
/// (`a.b.c`) contribute only `a` — the interpreter re-walks the dotted path
/// against whatever `a` resolves to when the thunk is forced.
pub(crate) fn free_vars(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::IntLit(_) | Expr::StringLit(_) | Expr::BoolLit(_) | Expr::NilLit | Expr::New { .. } => {}
        Expr::Var(path, _) => out.push(path[0].clone()),
        Expr::Call { args, .. } => {
            for arg in args {
                free_vars(arg, out);
            }
        }
        Expr::Unary { operand, .. } => free_vars(operand, out),
        Expr::Binary { left, right, .. } => {
            free_vars(left, out);
            free_vars(right, out);
        }
    }
}
