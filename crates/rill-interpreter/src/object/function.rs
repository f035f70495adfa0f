use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, RangeInclusive};
use std::rc::Rc;

use gc::{Finalize, Gc, Trace};
use rill_common::error::{Error, Result, SyntaxError};
use rill_common::types::Span;
use rill_syntax::ast::{StmtFun, StmtS};

use crate::env::Env;
use crate::interpreter::{Flow, Interpreter};
use crate::object::{Callable, Object};
use crate::system::System;

/// A user-defined function, closed over the frame it was declared in.
#[derive(Clone, Debug, Finalize, Trace)]
pub struct Function(Gc<FunctionImpl>);

impl Function {
    pub fn new(decl: &Rc<StmtFun>, env: &Env) -> Self {
        Function(Gc::new(FunctionImpl { decl: Rc::clone(decl), env: env.clone() }))
    }

    pub fn params(&self) -> &[String] {
        &self.decl.params
    }

    pub fn stmts(&self) -> &[StmtS] {
        &self.decl.body.stmts
    }
}

impl Callable for Function {
    fn arity(&self) -> RangeInclusive<usize> {
        let params = self.decl.params.len();
        params..=params
    }

    fn name(&self) -> &str {
        &self.decl.name
    }

    fn call_unchecked<S: System>(
        &self,
        interpreter: &mut Interpreter<S>,
        args: Vec<Object>,
        span: &Span,
    ) -> Result<Object> {
        let env = Env::with_parent(&self.env);
        for (param, arg) in self.params().iter().zip(args) {
            env.define(param, arg);
        }
        for stmt_s in self.stmts() {
            match interpreter.run_stmt(&env, stmt_s)? {
                Flow::Normal => {}
                Flow::Return(object) => return Ok(object),
                Flow::Break => {
                    return Err((Error::SyntaxError(SyntaxError::BreakOutsideLoop), span.clone()));
                }
            }
        }
        Ok(Object::Nil)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name())
    }
}

impl Deref for Function {
    type Target = FunctionImpl;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Eq for Function {}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Finalize, Trace)]
pub struct FunctionImpl {
    #[unsafe_ignore_trace]
    pub decl: Rc<StmtFun>,
    pub env: Env,
}
