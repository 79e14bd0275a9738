//! Abstract syntax tree for Brewin.
//!
//! The specification describes the AST an external parser would hand the interpreter
//! as a dynamic `elem_type`/`get(key)` node tree (its §6.2 "AST contract"). This is the
//! same tree expressed as a typed Rust AST instead — the specification's contract is a
//! description of *shape*, not a mandate to carry a stringly-typed node around inside an
//! otherwise statically typed interpreter.

use brewin_core::SourceLocation;

/// A complete Brewin program: its struct definitions and its functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub structs: Vec<StructDef>,
    pub functions: Vec<FunctionDef>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            structs: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_function(&self, name: &str, arity: usize) -> Option<&FunctionDef> {
        self.functions
            .iter()
            .find(|f| f.name == name && f.params.len() == arity)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

/// `struct Name { field1: type1 field2: type2 ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    /// Ordered field schema: declaration order matters for zero-initialization.
    pub fields: Vec<FieldDef>,
    pub source: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
}

/// `func name(p1: t1, p2: t2): return_type { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<ParamDef>,
    pub return_type: String,
    pub body: Vec<Stmt>,
    pub source: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub type_name: String,
}

/// A dotted variable reference or assignment target: `a`, `a.b`, `a.b.c`, ...
/// Always has at least one element.
pub type DottedName = Vec<String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDef {
        name: String,
        type_name: String,
        source: SourceLocation,
    },
    Assign {
        target: DottedName,
        expr: Expr,
        source: SourceLocation,
    },
    /// A function call used for its side effect; its result is discarded.
    Call(Expr),
    Return {
        expr: Option<Expr>,
        source: SourceLocation,
    },
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        source: SourceLocation,
    },
    For {
        init: Box<Stmt>,
        condition: Expr,
        update: Box<Stmt>,
        body: Vec<Stmt>,
        source: SourceLocation,
    },
    Try {
        body: Vec<Stmt>,
        catchers: Vec<Catcher>,
        source: SourceLocation,
    },
    Raise {
        expr: Expr,
        source: SourceLocation,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catcher {
    pub exception_type: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i64),
    StringLit(String),
    BoolLit(bool),
    NilLit,
    /// A (possibly dotted) variable reference: `a`, `a.b.c`.
    Var(DottedName, SourceLocation),
    Call {
        name: String,
        args: Vec<Expr>,
        source: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        source: SourceLocation,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        source: SourceLocation,
    },
    New {
        type_name: String,
        source: SourceLocation,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_function_resolves_by_arity() {
        let loc = SourceLocation::new(0, 0);
        let program = Program {
            structs: vec![],
            functions: vec![
                FunctionDef {
                    name: "f".into(),
                    params: vec![],
                    return_type: "void".into(),
                    body: vec![],
                    source: loc.clone(),
                },
                FunctionDef {
                    name: "f".into(),
                    params: vec![ParamDef {
                        name: "x".into(),
                        type_name: "int".into(),
                    }],
                    return_type: "void".into(),
                    body: vec![],
                    source: loc,
                },
            ],
        };

        assert_eq!(program.find_function("f", 0).unwrap().params.len(), 0);
        assert_eq!(program.find_function("f", 1).unwrap().params.len(), 1);
        assert!(program.find_function("f", 2).is_none());
    }
}
