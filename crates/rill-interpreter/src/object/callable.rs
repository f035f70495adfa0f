use std::ops::RangeInclusive;

use rill_common::error::{Error, Result, TypeError};
use rill_common::types::Span;

use crate::interpreter::Interpreter;
use crate::object::Object;
use crate::system::System;

pub trait Callable {
    /// Accepted argument counts.
    fn arity(&self) -> RangeInclusive<usize>;

    fn name(&self) -> &str;

    fn call_unchecked<S: System>(
        &self,
        interpreter: &mut Interpreter<S>,
        args: Vec<Object>,
        span: &Span,
    ) -> Result<Object>;

    fn call<S: System>(
        &self,
        interpreter: &mut Interpreter<S>,
        args: Vec<Object>,
        span: &Span,
    ) -> Result<Object> {
        let arity = self.arity();
        if !arity.contains(&args.len()) {
            return Err((
                Error::TypeError(TypeError::ArityMismatch {
                    name: self.name().to_string(),
                    min_args: *arity.start(),
                    max_args: *arity.end(),
                    got_args: args.len(),
                }),
                span.clone(),
            ));
        }
        self.call_unchecked(interpreter, args, span)
    }
}
