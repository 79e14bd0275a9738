//! Tokenizer and recursive-descent parser for Brewin source text.
//!
//! Syntax (informally):
//! ```text
//! struct Name { field1: type1 field2: type2 }
//!
//! func name(p1: type1, p2: type2): return_type {
//!   statement
//!   statement
//! }
//! ```

use crate::ast::{
    BinaryOp, Catcher, DottedName, Expr, FieldDef, FunctionDef, ParamDef, Program, Stmt,
    StructDef, UnaryOp,
};
use brewin_core::SourceLocation;

/// A token with source position information, mirroring the teacher's `Token` shape.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    /// Line number (0-indexed).
    pub line: usize,
    /// Column number (0-indexed).
    pub column: usize,
}

impl Token {
    fn new(text: String, line: usize, column: usize) -> Self {
        Token { text, line, column }
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// Tokenize Brewin source into a flat token stream.
///
/// Punctuation is tokenized greedily (longest match first) so that `==`, `!=`, `<=`,
/// `>=`, `&&`, `||` are each single tokens rather than two single-character ones.
fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 0;
    let mut col = 0;

    let two_char_ops = ["==", "!=", "<=", ">=", "&&", "||"];

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            i += 1;
            line += 1;
            col = 0;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            col += 1;
            continue;
        }
        if c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '"' {
            let start_line = line;
            let start_col = col;
            let mut text = String::new();
            i += 1;
            col += 1;
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '"' {
                    closed = true;
                    i += 1;
                    col += 1;
                    break;
                }
                if chars[i] == '\\' && i + 1 < chars.len() {
                    let escaped = match chars[i + 1] {
                        'n' => '\n',
                        't' => '\t',
                        '"' => '"',
                        '\\' => '\\',
                        other => other,
                    };
                    text.push(escaped);
                    i += 2;
                    col += 2;
                    continue;
                }
                text.push(chars[i]);
                i += 1;
                col += 1;
            }
            if !closed {
                tokens.push(Token::new(
                    "<<<UNCLOSED_STRING>>>".to_string(),
                    start_line,
                    start_col,
                ));
                break;
            }
            // Sentinel-wrapped so the parser can distinguish `"foo"` from a bare `foo`.
            tokens.push(Token::new(format!("\"{}\"", text), start_line, start_col));
            continue;
        }
        if c.is_ascii_digit() {
            let start_col = col;
            let mut text = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                text.push(chars[i]);
                i += 1;
                col += 1;
            }
            tokens.push(Token::new(text, line, start_col));
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let start_col = col;
            let mut text = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                text.push(chars[i]);
                i += 1;
                col += 1;
            }
            tokens.push(Token::new(text, line, start_col));
            continue;
        }

        if i + 1 < chars.len() {
            let pair: String = [chars[i], chars[i + 1]].iter().collect();
            if two_char_ops.contains(&pair.as_str()) {
                tokens.push(Token::new(pair, line, col));
                i += 2;
                col += 2;
                continue;
            }
        }

        tokens.push(Token::new(c.to_string(), line, col));
        i += 1;
        col += 1;
    }

    tokens
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser {
            tokens: tokenize(source),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Program, String> {
        if let Some(bad) = self.tokens.iter().find(|t| t.text == "<<<UNCLOSED_STRING>>>") {
            return Err(format!(
                "Unclosed string literal at line {}, column {}",
                bad.line + 1,
                bad.column + 1
            ));
        }

        let mut program = Program::new();
        while !self.is_at_end() {
            if self.check("struct") {
                program.structs.push(self.parse_struct_def()?);
            } else if self.check("func") {
                program.functions.push(self.parse_function_def()?);
            } else {
                return Err(self.error("expected 'struct' or 'func' at top level"));
            }
        }
        Ok(program)
    }

    // ---- top-level defs ----

    fn parse_struct_def(&mut self) -> Result<StructDef, String> {
        let source = self.peek_loc();
        self.expect("struct")?;
        let name = self.expect_ident()?;
        self.expect("{")?;
        let mut fields = Vec::new();
        while !self.check("}") {
            let field_name = self.expect_ident()?;
            self.expect(":")?;
            let type_name = self.expect_ident()?;
            fields.push(FieldDef {
                name: field_name,
                type_name,
            });
        }
        self.expect("}")?;
        Ok(StructDef {
            name,
            fields,
            source,
        })
    }

    fn parse_function_def(&mut self) -> Result<FunctionDef, String> {
        let source = self.peek_loc();
        self.expect("func")?;
        let name = self.expect_ident()?;
        self.expect("(")?;
        let mut params = Vec::new();
        if !self.check(")") {
            loop {
                let param_name = self.expect_ident()?;
                self.expect(":")?;
                let type_name = self.expect_ident()?;
                params.push(ParamDef {
                    name: param_name,
                    type_name,
                });
                if self.check(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(")")?;
        self.expect(":")?;
        let return_type = self.expect_ident()?;
        let body = self.parse_block()?;
        Ok(FunctionDef {
            name,
            params,
            return_type,
            body,
            source,
        })
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<Vec<Stmt>, String> {
        self.expect("{")?;
        let mut stmts = Vec::new();
        while !self.check("}") {
            stmts.push(self.parse_statement()?);
        }
        self.expect("}")?;
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Stmt, String> {
        let source = self.peek_loc();
        if self.check("var") {
            self.advance();
            let name = self.expect_ident()?;
            self.expect(":")?;
            let type_name = self.expect_ident()?;
            self.expect(";")?;
            return Ok(Stmt::VarDef {
                name,
                type_name,
                source,
            });
        }
        if self.check("return") {
            self.advance();
            if self.check(";") {
                self.advance();
                return Ok(Stmt::Return { expr: None, source });
            }
            let expr = self.parse_expr()?;
            self.expect(";")?;
            return Ok(Stmt::Return {
                expr: Some(expr),
                source,
            });
        }
        if self.check("if") {
            return self.parse_if();
        }
        if self.check("for") {
            return self.parse_for();
        }
        if self.check("try") {
            return self.parse_try();
        }
        if self.check("raise") {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(";")?;
            return Ok(Stmt::Raise { expr, source });
        }
        self.parse_assign_or_call(true)
    }

    /// Parses either `dotted.name = expr` or a bare call expression used as a
    /// statement. When `consume_semi` is true (the normal statement case), a
    /// trailing `;` is consumed; the `for` loop's init/update clauses call this
    /// with `false` since their surrounding `;`/`)` are parsed by `parse_for`.
    fn parse_assign_or_call(&mut self, consume_semi: bool) -> Result<Stmt, String> {
        let source = self.peek_loc();
        let start = self.pos;
        if let Ok(target) = self.try_parse_dotted_name() {
            if self.check("=") {
                self.advance();
                let expr = self.parse_expr()?;
                if consume_semi {
                    self.expect(";")?;
                }
                return Ok(Stmt::Assign {
                    target,
                    expr,
                    source,
                });
            }
        }
        self.pos = start;
        let expr = self.parse_expr()?;
        if consume_semi {
            self.expect(";")?;
        }
        Ok(Stmt::Call(expr))
    }

    fn try_parse_dotted_name(&mut self) -> Result<DottedName, String> {
        let mut parts = vec![self.expect_ident()?];
        while self.check(".") {
            self.advance();
            parts.push(self.expect_ident()?);
        }
        Ok(parts)
    }

    fn parse_if(&mut self) -> Result<Stmt, String> {
        let source = self.peek_loc();
        self.expect("if")?;
        self.expect("(")?;
        let condition = self.parse_expr()?;
        self.expect(")")?;
        let then_body = self.parse_block()?;
        let else_body = if self.check("else") {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
            source,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, String> {
        let source = self.peek_loc();
        self.expect("for")?;
        self.expect("(")?;
        let init = self.parse_assign_or_call(false)?;
        self.expect(";")?;
        let condition = self.parse_expr()?;
        self.expect(";")?;
        let update = self.parse_assign_or_call(false)?;
        self.expect(")")?;
        let body = self.parse_block()?;
        Ok(Stmt::For {
            init: Box::new(init),
            condition,
            update: Box::new(update),
            body,
            source,
        })
    }

    fn parse_try(&mut self) -> Result<Stmt, String> {
        let source = self.peek_loc();
        self.expect("try")?;
        let body = self.parse_block()?;
        let mut catchers = Vec::new();
        while self.check("catch") {
            self.advance();
            let exception_type = self.expect_string()?;
            let catch_body = self.parse_block()?;
            catchers.push(Catcher {
                exception_type,
                body: catch_body,
            });
        }
        if catchers.is_empty() {
            return Err(self.error("'try' must be followed by at least one 'catch'"));
        }
        Ok(Stmt::Try {
            body,
            catchers,
            source,
        })
    }

    // ---- expressions (precedence climbing) ----

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while self.check("||") {
            let source = self.peek_loc();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                source,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_equality()?;
        while self.check("&&") {
            let source = self.peek_loc();
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
                source,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.check("==") {
                BinaryOp::Eq
            } else if self.check("!=") {
                BinaryOp::Ne
            } else {
                break;
            };
            let source = self.peek_loc();
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                source,
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.check("<") {
                BinaryOp::Lt
            } else if self.check("<=") {
                BinaryOp::Le
            } else if self.check(">") {
                BinaryOp::Gt
            } else if self.check(">=") {
                BinaryOp::Ge
            } else {
                break;
            };
            let source = self.peek_loc();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                source,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.check("+") {
                BinaryOp::Add
            } else if self.check("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            let source = self.peek_loc();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                source,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.check("*") {
                BinaryOp::Mul
            } else if self.check("/") {
                BinaryOp::Div
            } else {
                break;
            };
            let source = self.peek_loc();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                source,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        let source = self.peek_loc();
        if self.check("-") {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                source,
            });
        }
        if self.check("!") {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                source,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let source = self.peek_loc();
        if self.check("(") {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(")")?;
            return Ok(expr);
        }
        if self.check("true") {
            self.advance();
            return Ok(Expr::BoolLit(true));
        }
        if self.check("false") {
            self.advance();
            return Ok(Expr::BoolLit(false));
        }
        if self.check("nil") {
            self.advance();
            return Ok(Expr::NilLit);
        }
        if self.check("new") {
            self.advance();
            let type_name = self.expect_ident()?;
            return Ok(Expr::New { type_name, source });
        }
        if let Some(tok) = self.peek() {
            if tok.text.starts_with('"') {
                let text = tok.text.clone();
                self.advance();
                return Ok(Expr::StringLit(unwrap_string_sentinel(&text)));
            }
            if tok.text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                let n: i64 = tok
                    .text
                    .parse()
                    .map_err(|_| format!("invalid integer literal '{}'", tok.text))?;
                self.advance();
                return Ok(Expr::IntLit(n));
            }
            if is_ident_start(&tok.text) {
                let name = tok.text.clone();
                self.advance();
                if self.check("(") {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(")") {
                        loop {
                            args.push(self.parse_expr()?);
                            if self.check(",") {
                                self.advance();
                                continue;
                            }
                            break;
                        }
                    }
                    self.expect(")")?;
                    return Ok(Expr::Call {
                        name,
                        args,
                        source,
                    });
                }
                let mut parts = vec![name];
                while self.check(".") {
                    self.advance();
                    parts.push(self.expect_ident()?);
                }
                return Ok(Expr::Var(parts, source));
            }
        }
        Err(self.error("expected an expression"))
    }

    // ---- low-level token helpers ----

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_loc(&self) -> SourceLocation {
        self.peek().map(Token::loc).unwrap_or_default()
    }

    fn check(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, text: &str) -> Result<Token, String> {
        if self.check(text) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.error(&format!("expected '{}'", text)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(tok) if is_ident_start(&tok.text) => {
                let text = tok.text.clone();
                self.advance();
                Ok(text)
            }
            _ => Err(self.error("expected an identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(tok) if tok.text.starts_with('"') => {
                let text = unwrap_string_sentinel(&tok.text);
                self.advance();
                Ok(text)
            }
            _ => Err(self.error("expected a string literal")),
        }
    }

    fn error(&self, message: &str) -> String {
        match self.peek() {
            Some(tok) => format!(
                "Parse error at line {}, column {}: {} (found '{}')",
                tok.line + 1,
                tok.column + 1,
                message,
                tok.text
            ),
            None => format!("Parse error at end of input: {}", message),
        }
    }
}

fn is_ident_start(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

fn unwrap_string_sentinel(text: &str) -> String {
    text.trim_start_matches('"').trim_end_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Expr, Stmt};

    #[test]
    fn parses_fact_function() {
        let src = "func fact(n: int): int { if (n <= 1) { return 1; } return n * fact(n-1); }";
        let mut parser = Parser::new(src);
        let program = parser.parse().unwrap();
        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.name, "fact");
        assert_eq!(f.params.len(), 1);
        assert_eq!(f.return_type, "int");
        assert_eq!(f.body.len(), 2);
    }

    #[test]
    fn parses_struct_def() {
        let src = "struct s { a: int b: string }";
        let mut parser = Parser::new(src);
        let program = parser.parse().unwrap();
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].fields.len(), 2);
    }

    #[test]
    fn parses_try_catch_raise() {
        let src = r#"func main(): void { try { raise "oops"; } catch "oops" { print("caught"); } }"#;
        let mut parser = Parser::new(src);
        let program = parser.parse().unwrap();
        let body = &program.functions[0].body;
        match &body[0] {
            Stmt::Try { catchers, .. } => {
                assert_eq!(catchers.len(), 1);
                assert_eq!(catchers[0].exception_type, "oops");
            }
            other => panic!("expected Try, got {:?}", other),
        }
    }

    #[test]
    fn parses_dotted_assignment_and_new() {
        let src = "func main(): void { var x: s; x = new s; x.a = 5; }";
        let mut parser = Parser::new(src);
        let program = parser.parse().unwrap();
        match &program.functions[0].body[2] {
            Stmt::Assign { target, .. } => assert_eq!(target, &vec!["x".to_string(), "a".to_string()]),
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn precedence_binds_multiplicative_tighter_than_additive() {
        let src = "func main(): int { return 1 + 2 * 3; }";
        let mut parser = Parser::new(src);
        let program = parser.parse().unwrap();
        match &program.functions[0].body[0] {
            Stmt::Return {
                expr: Some(Expr::Binary { op, left, .. }),
                ..
            } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(**left, Expr::IntLit(1)));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn unclosed_string_is_reported() {
        let src = "func main(): void { print(\"oops); }";
        let mut parser = Parser::new(src);
        assert!(parser.parse().is_err());
    }
}
