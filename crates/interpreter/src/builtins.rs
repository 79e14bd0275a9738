//! `print`, `inputi` and `inputs`: the three functions that bypass the
//! function table entirely rather than being resolved against user
//! definitions, and so can never be shadowed or overloaded by a Brewin
//! program.

use brewin_core::{BrewinError, SourceLocation};
use brewin_parser::Expr;

use crate::flow::ExprFlow;
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::value::Value;

pub(crate) fn call_print<H: Host>(interp: &mut Interpreter<H>, args: &[Expr]) -> Result<ExprFlow, BrewinError> {
    let mut line = String::new();
    for arg in args {
        match interp.eval_expr(arg)? {
            ExprFlow::Value(v) => line.push_str(&format!("{}", v)),
            raise => return Ok(raise),
        }
    }
    interp.host_mut().print_line(&line);
    Ok(ExprFlow::ok(Value::Nil))
}

pub(crate) fn call_input<H: Host>(
    interp: &mut Interpreter<H>,
    name: &str,
    args: &[Expr],
    source: &SourceLocation,
) -> Result<ExprFlow, BrewinError> {
    match args.len() {
        0 => {}
        1 => match interp.eval_expr(&args[0])? {
            ExprFlow::Value(v) => interp.host_mut().print_line(&format!("{}", v)),
            raise => return Ok(raise),
        },
        n => {
            return Err(BrewinError::name(format!(
                "No {}() function that takes {} parameters at {}",
                name, n, source
            )))
        }
    }
    let line = interp.host_mut().read_line();
    match name {
        "inputi" => {
            let n: i64 = line.trim().parse().map_err(|_| {
                BrewinError::type_error(format!("'{}' is not a valid integer for inputi() at {}", line, source))
            })?;
            Ok(ExprFlow::ok(Value::Int(n)))
        }
        "inputs" => Ok(ExprFlow::ok(Value::Str(line))),
        _ => unreachable!("call_input is only invoked for inputi/inputs"),
    }
}
