use std::rc::Rc;

use rill_common::error::{Error, ErrorS, Result, SyntaxError};
use rill_common::types::Span;

use crate::ast::{
    Accessor, Expr, ExprArray, ExprAssign, ExprAssignOp, ExprCall, ExprGet, ExprGrouping,
    ExprInfix, ExprLiteral, ExprLogical, ExprPrefix, ExprS, ExprSet, ExprStruct, ExprSuper,
    ExprUpdate, ExprVariable, Fixity, OpAssign, OpInfix, OpLogical, OpPrefix, OpUpdate, Program,
    Stmt, StmtBlock, StmtExpr, StmtFun, StmtIf, StmtPrint, StmtReturn, StmtS, StmtSwitch,
    StmtVar, StmtWhile, StructField, SwitchCase, SwitchDefault,
};
use crate::lexer::{Literal, Token, TokenKind};

/// Upper bound on both call arguments and function parameters.
pub const MAX_ARGS: usize = 255;

/// Upper bound on how deeply expressions and statements may nest.
pub const MAX_DEPTH: usize = 128;

/// A recursive-descent parser over a scanned token stream.
///
/// Parsing stops at the first error: there is no resynchronization, so a
/// [`Parser`] reports at most one error per call to [`Parser::parse`].
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Number of loops enclosing the current statement, reset at function
    /// boundaries.
    loop_depth: usize,
    fun_depth: usize,
    depth: usize,
}

impl Parser {
    /// `tokens` must end with a [`TokenKind::Eof`] token, as produced by
    /// [`crate::lexer::scan`].
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0, loop_depth: 0, fun_depth: 0, depth: 0 }
    }

    pub fn parse(mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::Eof) {
            stmts.push(self.declaration()?);
        }
        Ok(Program { stmts })
    }

    fn declaration(&mut self) -> Result<StmtS> {
        match self.peek().kind {
            TokenKind::Var => self.var_decl(),
            TokenKind::Fun => self.fun_decl(),
            _ => self.statement(),
        }
    }

    fn var_decl(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        let name = self.expect(TokenKind::Identifier)?.lexeme;
        let value = if self.eat(TokenKind::Equal) { Some(self.expression()?) } else { None };
        self.expect(TokenKind::Semicolon)?;
        Ok((Stmt::Var(StmtVar { name, value }), self.span_from(&start)))
    }

    fn fun_decl(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        let name = self.expect(TokenKind::Identifier)?.lexeme;

        self.expect(TokenKind::LtParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RtParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    return Err(self.error_here(SyntaxError::TooManyParameters { max: MAX_ARGS }));
                }
                params.push(self.expect(TokenKind::Identifier)?.lexeme);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RtParen)?;

        // A function body is a fresh context: "break" cannot reach a loop
        // outside of it.
        let loop_depth = std::mem::take(&mut self.loop_depth);
        self.fun_depth += 1;
        let body = self.block();
        self.fun_depth -= 1;
        self.loop_depth = loop_depth;

        let (body, _) = body?;
        let fun = StmtFun { name, params, body };
        Ok((Stmt::Fun(Rc::new(fun)), self.span_from(&start)))
    }

    fn statement(&mut self) -> Result<StmtS> {
        match self.peek().kind {
            TokenKind::Break => self.break_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::LtBrace if !self.is_struct_literal() => {
                let (block, span) = self.block()?;
                Ok((Stmt::Block(block), span))
            }
            TokenKind::Print => {
                let start = self.advance().span.clone();
                let value = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok((Stmt::Print(StmtPrint { value }), self.span_from(&start)))
            }
            TokenKind::Return => self.return_stmt(),
            TokenKind::Switch => self.switch_stmt(),
            TokenKind::While => self.while_stmt(),
            _ => {
                let value = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                let span = self.span_from(&value.1);
                Ok((Stmt::Expr(StmtExpr { value }), span))
            }
        }
    }

    fn block(&mut self) -> Result<(StmtBlock, Span)> {
        let start = self.expect(TokenKind::LtBrace)?.span;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RtBrace) && !self.check(TokenKind::Eof) {
            stmts.push(self.nested(Self::declaration)?);
        }
        self.expect(TokenKind::RtBrace)?;
        Ok((StmtBlock { stmts }, self.span_from(&start)))
    }

    fn break_stmt(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        if self.loop_depth == 0 {
            return Err((Error::SyntaxError(SyntaxError::BreakOutsideLoop), start));
        }
        self.expect(TokenKind::Semicolon)?;
        Ok((Stmt::Break, self.span_from(&start)))
    }

    fn return_stmt(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        if self.fun_depth == 0 {
            return Err((Error::SyntaxError(SyntaxError::ReturnOutsideFunction), start));
        }
        let value =
            if self.check(TokenKind::Semicolon) { None } else { Some(self.expression()?) };
        self.expect(TokenKind::Semicolon)?;
        Ok((Stmt::Return(StmtReturn { value }), self.span_from(&start)))
    }

    fn if_stmt(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        self.expect(TokenKind::LtParen)?;
        let cond = self.expression()?;
        self.expect(TokenKind::RtParen)?;
        let then = self.nested(Self::statement)?;
        let else_ =
            if self.eat(TokenKind::Else) { Some(self.nested(Self::statement)?) } else { None };
        Ok((Stmt::If(Box::new(StmtIf { cond, then, else_ })), self.span_from(&start)))
    }

    fn while_stmt(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        self.expect(TokenKind::LtParen)?;
        let cond = self.expression()?;
        self.expect(TokenKind::RtParen)?;
        let body = self.loop_body()?;
        Ok((Stmt::While(Box::new(StmtWhile { cond, body })), self.span_from(&start)))
    }

    /// Parses `for (init; cond; incr) body` directly into
    /// `{ init; while (cond) { body; incr; } }`.
    fn for_stmt(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        self.expect(TokenKind::LtParen)?;

        let init = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => Some(self.var_decl()?),
            _ => {
                let value = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                let span = self.span_from(&value.1);
                Some((Stmt::Expr(StmtExpr { value }), span))
            }
        };

        let cond = if self.check(TokenKind::Semicolon) {
            let span = self.peek().span.clone();
            (Expr::Literal(ExprLiteral::Bool(true)), span)
        } else {
            self.expression()?
        };
        self.expect(TokenKind::Semicolon)?;

        let incr = if self.check(TokenKind::RtParen) { None } else { Some(self.expression()?) };
        self.expect(TokenKind::RtParen)?;

        let body = self.loop_body()?;
        let body_span = body.1.clone();
        let mut stmts = vec![body];
        if let Some(value) = incr {
            let span = value.1.clone();
            stmts.push((Stmt::Expr(StmtExpr { value }), span));
        }
        let body = (Stmt::Block(StmtBlock { stmts }), body_span);

        let span = self.span_from(&start);
        let while_ = (Stmt::While(Box::new(StmtWhile { cond, body })), span.clone());
        let stmts = init.into_iter().chain([while_]).collect();
        Ok((Stmt::Block(StmtBlock { stmts }), span))
    }

    fn loop_body(&mut self) -> Result<StmtS> {
        self.loop_depth += 1;
        let body = self.nested(Self::statement);
        self.loop_depth -= 1;
        body
    }

    fn switch_stmt(&mut self) -> Result<StmtS> {
        let start = self.advance().span.clone();
        self.expect(TokenKind::LtParen)?;
        let discriminant = self.expression()?;
        self.expect(TokenKind::RtParen)?;
        self.expect(TokenKind::LtBrace)?;

        let mut cases = Vec::new();
        let mut default: Option<SwitchDefault> = None;
        loop {
            match self.peek().kind {
                TokenKind::Case => {
                    let case_start = self.peek().span.clone();
                    let mut values = Vec::new();
                    while self.eat(TokenKind::Case) {
                        values.push(self.expression()?);
                        self.expect(TokenKind::Colon)?;
                    }
                    let body = self.clause_body()?;
                    cases.push(SwitchCase { values, body, span: self.span_from(&case_start) });
                }
                TokenKind::Default => {
                    let default_start = self.advance().span.clone();
                    if default.is_some() {
                        return Err((
                            Error::SyntaxError(SyntaxError::DuplicateDefault),
                            default_start,
                        ));
                    }
                    self.expect(TokenKind::Colon)?;
                    let body = self.clause_body()?;
                    default = Some(SwitchDefault { body, span: self.span_from(&default_start) });
                }
                TokenKind::RtBrace if cases.is_empty() && default.is_none() => {
                    return Err(self.error_here(SyntaxError::EmptySwitch));
                }
                TokenKind::RtBrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected(&[TokenKind::Case, TokenKind::Default])),
            }
        }

        let switch = StmtSwitch { discriminant, cases, default };
        Ok((Stmt::Switch(Box::new(switch)), self.span_from(&start)))
    }

    /// Statements up to the next `case`, `default` or closing brace.
    fn clause_body(&mut self) -> Result<StmtBlock> {
        let mut stmts = Vec::new();
        while !matches!(
            self.peek().kind,
            TokenKind::Case | TokenKind::Default | TokenKind::RtBrace | TokenKind::Eof
        ) {
            stmts.push(self.nested(Self::declaration)?);
        }
        Ok(StmtBlock { stmts })
    }

    /// At statement position, `{` opens a struct literal only when followed
    /// by `name :` or by `} ;`. Anything else is a block.
    fn is_struct_literal(&self) -> bool {
        let kind = |offset: usize| {
            self.tokens.get(self.current + offset).map_or(TokenKind::Eof, |token| token.kind)
        };
        match kind(1) {
            TokenKind::RtBrace => kind(2) == TokenKind::Semicolon,
            next if is_name(next) => kind(2) == TokenKind::Colon,
            _ => false,
        }
    }

    pub fn expression(&mut self) -> Result<ExprS> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> Result<ExprS> {
        let target = self.compound()?;
        if !self.check(TokenKind::Equal) {
            return Ok(target);
        }
        let equal = self.advance().span.clone();
        let value = self.expression()?;
        let span = target.1.to(&value.1);
        let expr = match target.0 {
            Expr::Variable(var) => Expr::Assign(Box::new(ExprAssign { name: var.name, value })),
            Expr::Get(get) => {
                let ExprGet { object, accessor, key } = *get;
                Expr::Set(Box::new(ExprSet { object, accessor, key, value }))
            }
            _ => return Err((Error::SyntaxError(SyntaxError::InvalidAssignmentTarget), equal)),
        };
        Ok((expr, span))
    }

    fn compound(&mut self) -> Result<ExprS> {
        let target = self.logic_or()?;
        let op = match self.peek().kind {
            TokenKind::PlusEqual => OpAssign::Add,
            TokenKind::MinusEqual => OpAssign::Subtract,
            TokenKind::AsteriskEqual => OpAssign::Multiply,
            TokenKind::SlashEqual => OpAssign::Divide,
            _ => return Ok(target),
        };
        let op_span = self.advance().span.clone();
        check_target(&target, &op_span)?;
        let value = self.expression()?;
        let span = target.1.to(&value.1);
        Ok((Expr::AssignOp(Box::new(ExprAssignOp { target, op, value })), span))
    }

    fn logic_or(&mut self) -> Result<ExprS> {
        let mut lt = self.logic_and()?;
        while self.eat(TokenKind::Or) {
            let rt = self.logic_and()?;
            let span = lt.1.to(&rt.1);
            lt = (Expr::Logical(Box::new(ExprLogical { lt, op: OpLogical::Or, rt })), span);
        }
        Ok(lt)
    }

    fn logic_and(&mut self) -> Result<ExprS> {
        let mut lt = self.equality()?;
        while self.eat(TokenKind::And) {
            let rt = self.equality()?;
            let span = lt.1.to(&rt.1);
            lt = (Expr::Logical(Box::new(ExprLogical { lt, op: OpLogical::And, rt })), span);
        }
        Ok(lt)
    }

    fn equality(&mut self) -> Result<ExprS> {
        self.infix(Self::comparison, |kind| match kind {
            TokenKind::EqualEqual => Some(OpInfix::Equal),
            TokenKind::BangEqual => Some(OpInfix::NotEqual),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<ExprS> {
        self.infix(Self::term, |kind| match kind {
            TokenKind::Greater => Some(OpInfix::Greater),
            TokenKind::GreaterEqual => Some(OpInfix::GreaterEqual),
            TokenKind::Less => Some(OpInfix::Less),
            TokenKind::LessEqual => Some(OpInfix::LessEqual),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<ExprS> {
        self.infix(Self::factor, |kind| match kind {
            TokenKind::Plus => Some(OpInfix::Add),
            TokenKind::Minus => Some(OpInfix::Subtract),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<ExprS> {
        self.infix(Self::unary, |kind| match kind {
            TokenKind::Asterisk => Some(OpInfix::Multiply),
            TokenKind::Slash => Some(OpInfix::Divide),
            _ => None,
        })
    }

    /// Parses a left-associative chain of operands produced by `operand`,
    /// joined by the operators `op` recognizes.
    fn infix(
        &mut self,
        operand: fn(&mut Self) -> Result<ExprS>,
        op: fn(TokenKind) -> Option<OpInfix>,
    ) -> Result<ExprS> {
        let mut lt = operand(self)?;
        while let Some(op) = op(self.peek().kind) {
            self.advance();
            let rt = operand(self)?;
            let span = lt.1.to(&rt.1);
            lt = (Expr::Infix(Box::new(ExprInfix { lt, op, rt })), span);
        }
        Ok(lt)
    }

    fn unary(&mut self) -> Result<ExprS> {
        let op = match self.peek().kind {
            TokenKind::Bang => OpPrefix::Not,
            TokenKind::Minus => OpPrefix::Negate,
            TokenKind::PlusPlus | TokenKind::MinusMinus => return self.prefix_update(),
            _ => return self.postfix(),
        };
        let start = self.advance().span.clone();
        let rt = self.nested(Self::unary)?;
        let span = start.to(&rt.1);
        Ok((Expr::Prefix(Box::new(ExprPrefix { op, rt })), span))
    }

    fn prefix_update(&mut self) -> Result<ExprS> {
        let token = self.advance().clone();
        let op = update_op(token.kind);
        let target = self.nested(Self::unary)?;
        check_target(&target, &token.span)?;
        let span = token.span.to(&target.1);
        Ok((Expr::Update(Box::new(ExprUpdate { target, op, fixity: Fixity::Prefix })), span))
    }

    fn postfix(&mut self) -> Result<ExprS> {
        let target = self.call()?;
        if !matches!(self.peek().kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            return Ok(target);
        }
        let token = self.advance().clone();
        check_target(&target, &token.span)?;
        let span = target.1.to(&token.span);
        let op = update_op(token.kind);
        Ok((Expr::Update(Box::new(ExprUpdate { target, op, fixity: Fixity::Postfix })), span))
    }

    fn call(&mut self) -> Result<ExprS> {
        let mut expr = self.primary()?;
        loop {
            match self.peek().kind {
                TokenKind::LtParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RtParen) {
                        loop {
                            if args.len() >= MAX_ARGS {
                                return Err(self
                                    .error_here(SyntaxError::TooManyArguments { max: MAX_ARGS }));
                            }
                            args.push(self.expression()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let paren = self.expect(TokenKind::RtParen)?;
                    let span = expr.1.to(&paren.span);
                    expr = (Expr::Call(Box::new(ExprCall { callee: expr, args })), span);
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_name()?;
                    let span = expr.1.to(&name.span);
                    let key = (Expr::Literal(ExprLiteral::String(name.lexeme)), name.span);
                    let get = ExprGet { object: expr, accessor: Accessor::Dot, key };
                    expr = (Expr::Get(Box::new(get)), span);
                }
                TokenKind::LtBracket => {
                    self.advance();
                    let key = self.expression()?;
                    let bracket = self.expect(TokenKind::RtBracket)?;
                    let span = expr.1.to(&bracket.span);
                    let get = ExprGet { object: expr, accessor: Accessor::Index, key };
                    expr = (Expr::Get(Box::new(get)), span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<ExprS> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::False => Expr::Literal(ExprLiteral::Bool(false)),
            TokenKind::True => Expr::Literal(ExprLiteral::Bool(true)),
            TokenKind::Nil => Expr::Literal(ExprLiteral::Nil),
            TokenKind::Number | TokenKind::String => match token.literal {
                Some(Literal::Number(number)) => Expr::Literal(ExprLiteral::Number(number)),
                Some(Literal::String(string)) => Expr::Literal(ExprLiteral::String(string)),
                None => unreachable!("literal token without a value: {:?}", token.kind),
            },
            TokenKind::Identifier => Expr::Variable(ExprVariable { name: token.lexeme }),
            TokenKind::This => Expr::This,
            TokenKind::Super => {
                self.advance();
                self.expect(TokenKind::Dot)?;
                let name = self.expect_name()?;
                let span = token.span.to(&name.span);
                return Ok((Expr::Super(ExprSuper { name: name.lexeme }), span));
            }
            TokenKind::LtParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RtParen)?;
                let span = self.span_from(&token.span);
                return Ok((Expr::Grouping(Box::new(ExprGrouping { expr })), span));
            }
            TokenKind::LtBracket => return self.array(),
            TokenKind::LtBrace => return self.struct_(),
            _ => {
                return Err(self.unexpected(&[
                    TokenKind::Identifier,
                    TokenKind::Number,
                    TokenKind::String,
                    TokenKind::LtParen,
                    TokenKind::LtBracket,
                    TokenKind::LtBrace,
                ]));
            }
        };
        self.advance();
        Ok((expr, token.span))
    }

    fn array(&mut self) -> Result<ExprS> {
        let start = self.advance().span.clone();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RtBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RtBracket)?;
        Ok((Expr::Array(ExprArray { elements }), self.span_from(&start)))
    }

    fn struct_(&mut self) -> Result<ExprS> {
        let start = self.advance().span.clone();
        let mut fields: Vec<StructField> = Vec::new();
        if !self.check(TokenKind::RtBrace) {
            loop {
                let name = self.expect_name()?;
                if fields.iter().any(|field| field.name == name.lexeme) {
                    return Err((
                        Error::SyntaxError(SyntaxError::DuplicateField { name: name.lexeme }),
                        name.span,
                    ));
                }
                self.expect(TokenKind::Colon)?;
                let value = self.expression()?;
                fields.push(StructField { name: name.lexeme, span: name.span, value });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RtBrace)?;
        Ok((Expr::Struct(ExprStruct { fields }), self.span_from(&start)))
    }

    /// Field names after `.` and struct keys may also be reserved words.
    fn expect_name(&mut self) -> Result<Token> {
        if is_name(self.peek().kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(&[TokenKind::Identifier]))
        }
    }

    fn peek(&self) -> &Token {
        let idx = self.current.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.check(TokenKind::Eof) {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(&[kind]))
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: &Span) -> Span {
        match self.current.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(token) => start.to(&token.span),
            None => start.clone(),
        }
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error_here(SyntaxError::TooDeeplyNested { max: MAX_DEPTH }));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn error_here(&self, error: SyntaxError) -> ErrorS {
        (Error::SyntaxError(error), self.peek().span.clone())
    }

    fn unexpected(&self, expected: &[TokenKind]) -> ErrorS {
        let token = self.peek();
        let expected = expected.iter().map(ToString::to_string).collect();
        let error = match token.kind {
            TokenKind::Eof => SyntaxError::UnrecognizedEof { expected },
            _ => SyntaxError::UnrecognizedToken { token: token.lexeme.clone(), expected },
        };
        (Error::SyntaxError(error), token.span.clone())
    }
}

fn is_name(kind: TokenKind) -> bool {
    kind == TokenKind::Identifier || kind.is_keyword()
}

fn update_op(kind: TokenKind) -> OpUpdate {
    match kind {
        TokenKind::PlusPlus => OpUpdate::Increment,
        TokenKind::MinusMinus => OpUpdate::Decrement,
        _ => unreachable!("not an update operator: {kind:?}"),
    }
}

/// Only variables and `.field` / `[index]` accesses can be written to.
fn check_target(target: &ExprS, op_span: &Span) -> Result<()> {
    match target.0 {
        Expr::Variable(_) | Expr::Get(_) => Ok(()),
        _ => Err((Error::SyntaxError(SyntaxError::InvalidAssignmentTarget), op_span.clone())),
    }
}
