use crate::ast::{AssignTarget, BinOp, BoolOpKind, Expr, ExceptHandler, Stmt, UnaryOp};
use crate::lexer::{Token, TokenKind};
use crate::value::{RuntimeError, RuntimeErrorCode, Value};

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn line(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.line).unwrap_or(0)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self
            .tokens
            .get(self.pos)
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), RuntimeError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(RuntimeError::with_location(
                format!("expected {}, found {:?}", what, self.peek()),
                RuntimeErrorCode::ParseExpected,
                self.line(),
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, RuntimeError> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            other => Err(RuntimeError::with_location(
                format!("expected {}, found {:?}", what, other),
                RuntimeErrorCode::ParseExpected,
                self.line(),
            )),
        }
    }

    pub(crate) fn parse_program(&mut self) -> Result<Vec<Stmt>, RuntimeError> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Eof) {
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, RuntimeError> {
        match self.peek() {
            TokenKind::Def => self.parse_def(),
            TokenKind::Class => self.parse_class(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Try => self.parse_try(),
            _ => {
                let stmt = self.parse_simple_stmt()?;
                self.end_of_line()?;
                Ok(stmt)
            }
        }
    }

    fn end_of_line(&mut self) -> Result<(), RuntimeError> {
        if self.eat(&TokenKind::Newline) || self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(RuntimeError::with_location(
                format!("expected end of line, found {:?}", self.peek()),
                RuntimeErrorCode::ParseExpected,
                self.line(),
            ))
        }
    }

    /// A statement without a block: expression, assignment, `return`, etc.
    fn parse_simple_stmt(&mut self) -> Result<Stmt, RuntimeError> {
        match self.peek() {
            TokenKind::Return => {
                self.pos += 1;
                if self.check(&TokenKind::Newline) || self.check(&TokenKind::Eof) {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(self.parse_expr_list()?)))
                }
            }
            TokenKind::Pass => {
                self.pos += 1;
                Ok(Stmt::Pass)
            }
            TokenKind::Break => {
                self.pos += 1;
                Ok(Stmt::Break)
            }
            TokenKind::Continue => {
                self.pos += 1;
                Ok(Stmt::Continue)
            }
            TokenKind::Import => {
                self.pos += 1;
                let module = self.expect_ident("module name")?;
                Ok(Stmt::Import { module })
            }
            TokenKind::Del => {
                self.pos += 1;
                let target = self.parse_expr()?;
                Ok(Stmt::Delete(self.as_assign_target(target)?))
            }
            TokenKind::Raise => {
                self.pos += 1;
                let exc_type = self.expect_ident("exception type")?;
                let message = if self.eat(&TokenKind::LParen) {
                    if self.eat(&TokenKind::RParen) {
                        None
                    } else {
                        let msg = self.parse_expr()?;
                        self.expect(&TokenKind::RParen, "')'")?;
                        Some(msg)
                    }
                } else {
                    None
                };
                Ok(Stmt::Raise { exc_type, message })
            }
            _ => {
                let expr = self.parse_expr_list()?;
                if self.eat(&TokenKind::Assign) {
                    let target = self.as_assign_target(expr)?;
                    let value = self.parse_expr_list()?;
                    Ok(Stmt::Assign { target, value })
                } else {
                    Ok(Stmt::Expr(expr))
                }
            }
        }
    }

    fn as_assign_target(&self, expr: Expr) -> Result<AssignTarget, RuntimeError> {
        match expr {
            Expr::Name(name) => Ok(AssignTarget::Name(name)),
            Expr::Attribute { target, name } => Ok(AssignTarget::Attribute {
                target: *target,
                name,
            }),
            _ => Err(RuntimeError::with_location(
                "cannot assign to this expression",
                RuntimeErrorCode::ParseUnexpected,
                self.line(),
            )),
        }
    }

    /// A `:`-introduced suite: either an indented block or a single simple
    /// statement on the same line.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, RuntimeError> {
        self.expect(&TokenKind::Colon, "':'")?;
        if !self.check(&TokenKind::Newline) {
            let stmt = self.parse_simple_stmt()?;
            self.end_of_line()?;
            return Ok(vec![stmt]);
        }
        self.expect(&TokenKind::Newline, "newline")?;
        self.expect(&TokenKind::Indent, "an indented block")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Dedent) && !self.check(&TokenKind::Eof) {
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::Dedent, "dedent")?;
        Ok(stmts)
    }

    fn parse_def(&mut self) -> Result<Stmt, RuntimeError> {
        self.expect(&TokenKind::Def, "'def'")?;
        let name = self.expect_ident("function name")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_param_names()?;
        let body = self.parse_block()?;
        Ok(Stmt::FuncDef { name, params, body })
    }

    fn parse_param_names(&mut self) -> Result<Vec<String>, RuntimeError> {
        let mut params = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RParen) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "')'")?;
        }
        Ok(params)
    }

    fn parse_class(&mut self) -> Result<Stmt, RuntimeError> {
        self.expect(&TokenKind::Class, "'class'")?;
        let name = self.expect_ident("class name")?;
        let mut bases = Vec::new();
        if self.eat(&TokenKind::LParen) && !self.eat(&TokenKind::RParen) {
            loop {
                bases.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RParen) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "')'")?;
        }
        let body = self.parse_block()?;
        Ok(Stmt::ClassDef { name, bases, body })
    }

    fn parse_if(&mut self) -> Result<Stmt, RuntimeError> {
        self.expect(&TokenKind::If, "'if'")?;
        let mut branches = Vec::new();
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        branches.push((cond, body));
        let mut else_body = None;
        loop {
            if self.eat(&TokenKind::Elif) {
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                branches.push((cond, body));
            } else if self.eat(&TokenKind::Else) {
                else_body = Some(self.parse_block()?);
                break;
            } else {
                break;
            }
        }
        Ok(Stmt::If {
            branches,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, RuntimeError> {
        self.expect(&TokenKind::While, "'while'")?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, RuntimeError> {
        self.expect(&TokenKind::For, "'for'")?;
        let var = self.expect_ident("loop variable")?;
        self.expect(&TokenKind::In, "'in'")?;
        let iter = self.parse_expr_list()?;
        let body = self.parse_block()?;
        Ok(Stmt::For { var, iter, body })
    }

    fn parse_try(&mut self) -> Result<Stmt, RuntimeError> {
        self.expect(&TokenKind::Try, "'try'")?;
        let body = self.parse_block()?;
        let mut handlers = Vec::new();
        while self.eat(&TokenKind::Except) {
            let exc_type = match self.peek() {
                TokenKind::Ident(name) => {
                    let name = name.clone();
                    self.pos += 1;
                    Some(name)
                }
                _ => None,
            };
            let binding = if self.eat(&TokenKind::As) {
                Some(self.expect_ident("exception binding")?)
            } else {
                None
            };
            let handler_body = self.parse_block()?;
            handlers.push(ExceptHandler {
                exc_type,
                binding,
                body: handler_body,
            });
        }
        let finally = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handlers.is_empty() && finally.is_none() {
            return Err(RuntimeError::with_location(
                "expected 'except' or 'finally' block",
                RuntimeErrorCode::ParseExpected,
                self.line(),
            ));
        }
        Ok(Stmt::Try {
            body,
            handlers,
            finally,
        })
    }

    /// An expression list: `a, b, c` becomes a tuple, a single expression
    /// stays itself. Used where Python allows bare tuples (assignments,
    /// `return`, expression statements).
    fn parse_expr_list(&mut self) -> Result<Expr, RuntimeError> {
        let first = self.parse_expr()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.is_expr_end() {
                break;
            }
            items.push(self.parse_expr()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn is_expr_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Colon
                | TokenKind::Assign
        )
    }

    fn parse_expr(&mut self) -> Result<Expr, RuntimeError> {
        if self.check(&TokenKind::Lambda) {
            return self.parse_lambda();
        }
        self.parse_or()
    }

    fn parse_lambda(&mut self) -> Result<Expr, RuntimeError> {
        self.expect(&TokenKind::Lambda, "'lambda'")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::Colon) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_expr()?;
        Ok(Expr::Lambda {
            params,
            body: Box::new(body),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::BoolOp {
                op: BoolOpKind::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_not()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_not()?;
            left = Expr::BoolOp {
                op: BoolOpKind::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, RuntimeError> {
        if self.eat(&TokenKind::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, RuntimeError> {
        let left = self.parse_arith()?;
        let op = match self.peek() {
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::NotEq,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Lte => BinOp::LtEq,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Gte => BinOp::GtEq,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_arith()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_arith(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::SlashSlash => BinOp::FloorDiv,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, RuntimeError> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.parse_factor()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        if self.eat(&TokenKind::Plus) {
            return self.parse_factor();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, RuntimeError> {
        let base = self.parse_postfix()?;
        if self.eat(&TokenKind::StarStar) {
            // Right-associative, binding tighter than unary on the right.
            let exp = self.parse_factor()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, RuntimeError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::LParen) {
                let mut args = Vec::new();
                if !self.eat(&TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                        if self.check(&TokenKind::RParen) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen, "')'")?;
                }
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else if self.eat(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                expr = Expr::Subscript {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&TokenKind::Dot) {
                let name = self.expect_ident("attribute name")?;
                expr = Expr::Attribute {
                    target: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, RuntimeError> {
        match self.advance() {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Int(n))),
            TokenKind::BigNumber(n) => Ok(Expr::Literal(Value::BigInt(n))),
            TokenKind::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::NoneKw => Ok(Expr::Literal(Value::None)),
            TokenKind::Ident(name) => Ok(Expr::Name(name)),
            TokenKind::LParen => {
                if self.eat(&TokenKind::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.parse_expr()?;
                if self.check(&TokenKind::Comma) {
                    let mut items = vec![first];
                    while self.eat(&TokenKind::Comma) {
                        if self.check(&TokenKind::RParen) {
                            break;
                        }
                        items.push(self.parse_expr()?);
                    }
                    self.expect(&TokenKind::RParen, "')'")?;
                    Ok(Expr::Tuple(items))
                } else {
                    self.expect(&TokenKind::RParen, "')'")?;
                    Ok(first)
                }
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                if !self.eat(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                        if self.check(&TokenKind::RBracket) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RBracket, "']'")?;
                }
                Ok(Expr::List(items))
            }
            TokenKind::Lambda => {
                // Reached when a lambda appears past the statement head,
                // e.g. as the right operand of `or`.
                self.pos -= 1;
                self.parse_lambda()
            }
            other => Err(RuntimeError::with_location(
                format!("unexpected token {:?}", other),
                RuntimeErrorCode::ParseUnexpected,
                self.line(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::ast::{AssignTarget, Expr, Stmt};
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Vec<Stmt> {
        let tokens = Lexer::new(input).tokenize().expect("tokenize");
        Parser::new(tokens).parse_program().expect("parse")
    }

    #[test]
    fn attribute_assignment_target() {
        let stmts = parse("builtins.abs = lambda x: x + 1\n");
        match &stmts[0] {
            Stmt::Assign {
                target: AssignTarget::Attribute { name, .. },
                value: Expr::Lambda { params, .. },
            } => {
                assert_eq!(name, "abs");
                assert_eq!(params, &["x".to_string()]);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn class_with_single_statement_body() {
        let stmts = parse("class A:\n    pass\n");
        match &stmts[0] {
            Stmt::ClassDef { name, bases, body } => {
                assert_eq!(name, "A");
                assert!(bases.is_empty());
                assert_eq!(body.len(), 1);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn tuple_expression_in_lambda_body() {
        let stmts = parse("hook = lambda x, y: ('class', y)\n");
        match &stmts[0] {
            Stmt::Assign {
                value: Expr::Lambda { body, .. },
                ..
            } => match body.as_ref() {
                Expr::Tuple(items) => assert_eq!(items.len(), 2),
                other => panic!("unexpected lambda body: {:?}", other),
            },
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn try_except_as_binding() {
        let stmts = parse("try:\n    pass\nexcept AttributeError as e:\n    pass\n");
        match &stmts[0] {
            Stmt::Try { handlers, .. } => {
                assert_eq!(handlers[0].exc_type.as_deref(), Some("AttributeError"));
                assert_eq!(handlers[0].binding.as_deref(), Some("e"));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn parse_error_reports_line() {
        let tokens = Lexer::new("x = (1\ny = 2\n").tokenize();
        // The open bracket swallows the newline; the parse fails later.
        let err = match tokens {
            Ok(tokens) => Parser::new(tokens).parse_program().unwrap_err(),
            Err(err) => err,
        };
        assert!(err.code.map(|c| c.is_parse()).unwrap_or(false));
    }
}
