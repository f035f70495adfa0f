use rill_common::error::{
    AttributeError, Error, ErrorS, IndexError, IoError, NameError, OverflowError, Result,
    SyntaxError, TypeError, ZeroDivisionError,
};
use rill_syntax::ast::{
    Accessor, Expr, ExprLiteral, ExprS, Fixity, OpInfix, OpLogical, OpPrefix, OpUpdate, Program,
    Span, Stmt, StmtBlock, StmtS,
};

use crate::env::Env;
use crate::object::{Array, Callable, Function, Native, Object, Struct};
use crate::system::System;

/// How a statement finished.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal,
    /// A `break` on its way to the nearest loop.
    Break,
    /// A `return` on its way to the enclosing function call.
    Return(Object),
}

/// A writable location: a variable, or an element / field of a container.
/// Resolving a place evaluates its object and key exactly once.
enum Place {
    Variable(String),
    Item { object: Object, key: Object, accessor: Accessor },
}

/// Upper bound on nested calls to user-defined functions.
pub const MAX_FRAMES: usize = 64;

pub struct Interpreter<S> {
    globals: Env,
    system: S,
    /// Number of user-defined function calls in progress.
    frames: usize,
}

impl<S: System> Interpreter<S> {
    pub fn new(system: S) -> Self {
        let globals = Env::default();
        for native in Native::ALL {
            globals.define(native.name(), Object::Native(native.clone()));
        }
        Self { globals, system, frames: 0 }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut S {
        &mut self.system
    }

    /// Runs `program` in the global frame. Globals persist across calls.
    pub fn run(&mut self, program: &Program) -> Result<()> {
        let globals = self.globals.clone();
        for stmt_s in &program.stmts {
            match self.run_stmt(&globals, stmt_s)? {
                Flow::Normal => {}
                Flow::Break => {
                    return Err((Error::SyntaxError(SyntaxError::BreakOutsideLoop), stmt_s.1.clone()));
                }
                Flow::Return(_) => {
                    return Err((
                        Error::SyntaxError(SyntaxError::ReturnOutsideFunction),
                        stmt_s.1.clone(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Parses and runs `source`.
    pub fn run_source(&mut self, source: &str) -> Result<(), Vec<ErrorS>> {
        let program = rill_syntax::parse(source)?;
        self.run(&program).map_err(|e| vec![e])
    }

    pub(crate) fn run_stmt(&mut self, env: &Env, stmt_s: &StmtS) -> Result<Flow> {
        let (stmt, span) = stmt_s;
        if cfg!(feature = "trace") {
            eprintln!("[trace] {span} {}", describe(stmt));
        }
        match stmt {
            Stmt::Block(block) => self.run_block(&Env::with_parent(env), block),
            Stmt::Break => Ok(Flow::Break),
            Stmt::Expr(expr) => {
                self.run_expr(env, &expr.value)?;
                Ok(Flow::Normal)
            }
            Stmt::Fun(fun) => {
                env.define(&fun.name, Object::Function(Function::new(fun, env)));
                Ok(Flow::Normal)
            }
            Stmt::If(if_) => {
                if self.run_expr(env, &if_.cond)?.bool() {
                    self.run_stmt(env, &if_.then)
                } else if let Some(else_) = &if_.else_ {
                    self.run_stmt(env, else_)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Print(print) => {
                let value = self.run_expr(env, &print.value)?;
                self.system.write_line(&value.to_string()).map_err(|_| {
                    (Error::IoError(IoError::WriteError { file: "stdout".to_string() }), span.clone())
                })?;
                Ok(Flow::Normal)
            }
            Stmt::Return(return_) => {
                let object = match &return_.value {
                    Some(value) => self.run_expr(env, value)?,
                    None => Object::Nil,
                };
                Ok(Flow::Return(object))
            }
            Stmt::Switch(switch) => {
                let discriminant = self.run_expr(env, &switch.discriminant)?;
                for case in &switch.cases {
                    for value in &case.values {
                        if self.run_expr(env, value)? == discriminant {
                            return self.run_block(&Env::with_parent(env), &case.body);
                        }
                    }
                }
                match &switch.default {
                    Some(default) => self.run_block(&Env::with_parent(env), &default.body),
                    None => Ok(Flow::Normal),
                }
            }
            Stmt::Var(var) => {
                let value = match &var.value {
                    Some(value) => self.run_expr(env, value)?,
                    None => Object::Nil,
                };
                env.define(&var.name, value);
                Ok(Flow::Normal)
            }
            Stmt::While(while_) => {
                while self.run_expr(env, &while_.cond)?.bool() {
                    match self.run_stmt(env, &while_.body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    /// Runs `block` in `env`, stopping at the first statement that breaks or
    /// returns.
    fn run_block(&mut self, env: &Env, block: &StmtBlock) -> Result<Flow> {
        for stmt_s in &block.stmts {
            match self.run_stmt(env, stmt_s)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn run_expr(&mut self, env: &Env, expr_s: &ExprS) -> Result<Object> {
        let (expr, span) = expr_s;
        match expr {
            Expr::Array(array) => {
                let elements = array
                    .elements
                    .iter()
                    .map(|element| self.run_expr(env, element))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Array::new(elements).into_object())
            }
            Expr::Assign(assign) => {
                let value = self.run_expr(env, &assign.value)?;
                self.write(env, &Place::Variable(assign.name.clone()), value.clone(), span)?;
                Ok(value)
            }
            Expr::AssignOp(assign) => {
                let place = self.place(env, &assign.target)?;
                let old = self.read(env, &place, span)?;
                let rt = self.run_expr(env, &assign.value)?;
                let new = self.infix(assign.op.infix(), old, rt, span)?;
                self.write(env, &place, new.clone(), span)?;
                Ok(new)
            }
            Expr::Call(call) => {
                let callee = self.run_expr(env, &call.callee)?;
                let args =
                    call.args.iter().map(|arg| self.run_expr(env, arg)).collect::<Result<Vec<_>>>()?;
                match &callee {
                    Object::Function(function) => {
                        self.trace_call(function.name(), span);
                        if self.frames >= MAX_FRAMES {
                            let error = OverflowError::StackOverflow { max: MAX_FRAMES };
                            return Err((Error::OverflowError(error), span.clone()));
                        }
                        self.frames += 1;
                        let result = function.call(self, args, span);
                        self.frames -= 1;
                        result
                    }
                    Object::Native(native) => {
                        self.trace_call(native.name(), span);
                        native.call(self, args, span)
                    }
                    object => Err((
                        Error::TypeError(TypeError::NotCallable { type_: object.type_() }),
                        span.clone(),
                    )),
                }
            }
            Expr::Get(get) => {
                let object = self.run_expr(env, &get.object)?;
                let key = self.run_expr(env, &get.key)?;
                get_item(&object, &key, get.accessor, span)
            }
            Expr::Grouping(group) => self.run_expr(env, &group.expr),
            Expr::Infix(infix) => {
                let lt = self.run_expr(env, &infix.lt)?;
                let rt = self.run_expr(env, &infix.rt)?;
                self.infix(infix.op, lt, rt, span)
            }
            Expr::Literal(literal) => Ok(match literal {
                ExprLiteral::Nil => Object::Nil,
                ExprLiteral::Bool(bool) => Object::Bool(*bool),
                ExprLiteral::Number(number) => Object::Number(*number),
                ExprLiteral::String(string) => Object::String(string.clone()),
            }),
            Expr::Logical(logical) => {
                let lt = self.run_expr(env, &logical.lt)?.bool();
                let value = match logical.op {
                    OpLogical::And => lt && self.run_expr(env, &logical.rt)?.bool(),
                    OpLogical::Or => lt || self.run_expr(env, &logical.rt)?.bool(),
                };
                Ok(Object::Bool(value))
            }
            Expr::Prefix(prefix) => {
                let rt = self.run_expr(env, &prefix.rt)?;
                match (prefix.op, rt) {
                    (OpPrefix::Negate, Object::Number(number)) => Ok(Object::Number(-number)),
                    (OpPrefix::Not, rt) => Ok(Object::Bool(!rt.bool())),
                    (op, rt) => Err((
                        Error::TypeError(TypeError::UnsupportedOperandPrefix {
                            op: op.to_string(),
                            rt_type: rt.type_(),
                        }),
                        span.clone(),
                    )),
                }
            }
            Expr::Set(set) => {
                let object = self.run_expr(env, &set.object)?;
                let key = self.run_expr(env, &set.key)?;
                let value = self.run_expr(env, &set.value)?;
                set_item(&object, &key, set.accessor, value.clone(), span)?;
                Ok(value)
            }
            Expr::Struct(struct_) => {
                let object = Struct::default();
                for field in &struct_.fields {
                    let value = self.run_expr(env, &field.value)?;
                    object.set(&field.name, value);
                }
                Ok(object.into_object())
            }
            Expr::Super(_) => Err(reserved("super", span)),
            Expr::This => Err(reserved("this", span)),
            Expr::Update(update) => {
                let place = self.place(env, &update.target)?;
                let old = self.read(env, &place, span)?;
                let op = match update.op {
                    OpUpdate::Increment => OpInfix::Add,
                    OpUpdate::Decrement => OpInfix::Subtract,
                };
                let new = self.infix(op, old.clone(), Object::Number(1.0), span)?;
                self.write(env, &place, new.clone(), span)?;
                Ok(match update.fixity {
                    Fixity::Prefix => new,
                    Fixity::Postfix => old,
                })
            }
            Expr::Variable(var) => self.read(env, &Place::Variable(var.name.clone()), span),
        }
    }

    fn infix(&self, op: OpInfix, lt: Object, rt: Object, span: &Span) -> Result<Object> {
        match (op, &lt, &rt) {
            (OpInfix::Add, Object::Number(a), Object::Number(b)) => Ok(Object::Number(a + b)),
            (OpInfix::Add, Object::String(a), Object::String(b)) => {
                Ok(Object::String(a.clone() + b))
            }
            (OpInfix::Subtract, Object::Number(a), Object::Number(b)) => Ok(Object::Number(a - b)),
            (OpInfix::Multiply, Object::Number(a), Object::Number(b)) => Ok(Object::Number(a * b)),
            (OpInfix::Divide, Object::Number(_), Object::Number(b)) if *b == 0.0 => Err((
                Error::ZeroDivisionError(ZeroDivisionError::DivisionByZero),
                span.clone(),
            )),
            (OpInfix::Divide, Object::Number(a), Object::Number(b)) => Ok(Object::Number(a / b)),
            (OpInfix::Less, Object::Number(a), Object::Number(b)) => Ok(Object::Bool(a < b)),
            (OpInfix::LessEqual, Object::Number(a), Object::Number(b)) => Ok(Object::Bool(a <= b)),
            (OpInfix::Greater, Object::Number(a), Object::Number(b)) => Ok(Object::Bool(a > b)),
            (OpInfix::GreaterEqual, Object::Number(a), Object::Number(b)) => {
                Ok(Object::Bool(a >= b))
            }
            (OpInfix::Equal, a, b) => Ok(Object::Bool(a == b)),
            (OpInfix::NotEqual, a, b) => Ok(Object::Bool(a != b)),
            (op, a, b) => Err((
                Error::TypeError(TypeError::UnsupportedOperandInfix {
                    op: op.to_string(),
                    lt_type: a.type_(),
                    rt_type: b.type_(),
                }),
                span.clone(),
            )),
        }
    }

    fn place(&mut self, env: &Env, target: &ExprS) -> Result<Place> {
        match &target.0 {
            Expr::Variable(var) => Ok(Place::Variable(var.name.clone())),
            Expr::Get(get) => {
                let object = self.run_expr(env, &get.object)?;
                let key = self.run_expr(env, &get.key)?;
                Ok(Place::Item { object, key, accessor: get.accessor })
            }
            _ => Err((Error::SyntaxError(SyntaxError::InvalidAssignmentTarget), target.1.clone())),
        }
    }

    fn read(&self, env: &Env, place: &Place, span: &Span) -> Result<Object> {
        match place {
            Place::Variable(name) => env.get(name).ok_or_else(|| not_defined(name, span)),
            Place::Item { object, key, accessor } => get_item(object, key, *accessor, span),
        }
    }

    fn write(&self, env: &Env, place: &Place, value: Object, span: &Span) -> Result<()> {
        match place {
            Place::Variable(name) => {
                if env.assign(name, value) {
                    Ok(())
                } else {
                    Err(not_defined(name, span))
                }
            }
            Place::Item { object, key, accessor } => set_item(object, key, *accessor, value, span),
        }
    }

    fn trace_call(&self, name: &str, span: &Span) {
        if cfg!(feature = "trace") {
            eprintln!("[trace] {span} call {name}()");
        }
    }
}

fn get_item(object: &Object, key: &Object, accessor: Accessor, span: &Span) -> Result<Object> {
    match object {
        Object::Array(array) => {
            let idx = index(object, key, span)?;
            array.get(idx).ok_or_else(|| out_of_range(object, idx, array.len(), span))
        }
        Object::String(string) => {
            let idx = index(object, key, span)?;
            match string.chars().nth(idx) {
                Some(c) => Ok(Object::String(c.to_string())),
                None => Err(out_of_range(object, idx, string.chars().count(), span)),
            }
        }
        Object::Struct(struct_) => {
            let name = field_name(object, key, span)?;
            struct_.get(name).ok_or_else(|| {
                (
                    Error::AttributeError(AttributeError::NoSuchAttribute {
                        type_: object.type_(),
                        name: name.to_string(),
                    }),
                    span.clone(),
                )
            })
        }
        _ => Err(not_indexable(object, accessor, "access", span)),
    }
}

fn set_item(object: &Object, key: &Object, accessor: Accessor, value: Object, span: &Span) -> Result<()> {
    match object {
        Object::Array(array) => {
            let idx = index(object, key, span)?;
            if array.set(idx, value) {
                Ok(())
            } else {
                Err(out_of_range(object, idx, array.len(), span))
            }
        }
        Object::Struct(struct_) => {
            let name = field_name(object, key, span)?;
            struct_.set(name, value);
            Ok(())
        }
        _ => Err(not_indexable(object, accessor, "assignment", span)),
    }
}

/// Array and string positions must be non-negative integers.
fn index(object: &Object, key: &Object, span: &Span) -> Result<usize> {
    match key {
        Object::Number(number) if *number >= 0.0 && number.fract() == 0.0 => Ok(*number as usize),
        _ => Err((
            Error::TypeError(TypeError::InvalidIndex { type_: object.type_(), index: key.repr() }),
            span.clone(),
        )),
    }
}

fn field_name<'a>(object: &Object, key: &'a Object, span: &Span) -> Result<&'a str> {
    match key {
        Object::String(name) => Ok(name),
        _ => Err((
            Error::AttributeError(AttributeError::NoSuchAttribute {
                type_: object.type_(),
                name: key.repr(),
            }),
            span.clone(),
        )),
    }
}

fn not_indexable(object: &Object, accessor: Accessor, action: &str, span: &Span) -> ErrorS {
    let access = match accessor {
        Accessor::Dot => format!("field {action}"),
        Accessor::Index => format!("item {action}"),
    };
    (Error::TypeError(TypeError::NotIndexable { type_: object.type_(), access }), span.clone())
}

fn out_of_range(object: &Object, index: usize, len: usize, span: &Span) -> ErrorS {
    (Error::IndexError(IndexError::OutOfRange { type_: object.type_(), index, len }), span.clone())
}

fn not_defined(name: &str, span: &Span) -> ErrorS {
    (Error::NameError(NameError::NotDefined { name: name.to_string() }), span.clone())
}

fn reserved(keyword: &str, span: &Span) -> ErrorS {
    (Error::TypeError(TypeError::ReservedKeyword { keyword: keyword.to_string() }), span.clone())
}

fn describe(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block(_) => "block".to_string(),
        Stmt::Break => "break".to_string(),
        Stmt::Expr(_) => "expression".to_string(),
        Stmt::Fun(fun) => format!("fun {}", fun.name),
        Stmt::If(_) => "if".to_string(),
        Stmt::Print(_) => "print".to_string(),
        Stmt::Return(_) => "return".to_string(),
        Stmt::Switch(_) => "switch".to_string(),
        Stmt::Var(var) => format!("var {}", var.name),
        Stmt::While(_) => "while".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::system::testing::Script;
    use pretty_assertions::assert_eq;

    fn run_with(script: Script, source: &str) -> (Vec<String>, Result<(), Error>) {
        let mut interpreter = Interpreter::new(script);
        let result = interpreter.run_source(source).map_err(|mut errors| errors.remove(0).0);
        (interpreter.system().output.clone(), result)
    }

    fn output(source: &str) -> Vec<String> {
        let (output, result) = run_with(Script::default(), source);
        assert_eq!(result, Ok(()));
        output
    }

    fn error(source: &str) -> Error {
        let (_, result) = run_with(Script::default(), source);
        result.expect_err("expected a runtime error")
    }

    #[test]
    fn print_sum() {
        assert_eq!(output("var a=2; var b=3; print a+b;"), vec!["5"]);
    }

    #[test]
    fn while_loop() {
        assert_eq!(output("var i=0; while (i<3) { print i; i=i+1; }"), vec!["0", "1", "2"]);
    }

    #[test]
    fn function_call_and_arity() {
        assert_eq!(output("fun add(a,b){ return a+b; } print add(2,3);"), vec!["5"]);
        assert_eq!(
            error("fun add(a,b){ return a+b; } add(2);"),
            Error::TypeError(TypeError::ArityMismatch {
                name: "add".to_string(),
                min_args: 2,
                max_args: 2,
                got_args: 1
            })
        );
    }

    #[test]
    fn closures() {
        let source = r#"
            fun counter() {
                var count = 0;
                fun next() { count++; return count; }
                return next;
            }
            var a = counter();
            var b = counter();
            print a(); print a(); print b(); print a();
        "#;
        assert_eq!(output(source), vec!["1", "2", "1", "3"]);
    }

    #[test]
    fn recursion() {
        let source = "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(15);";
        assert_eq!(output(source), vec!["610"]);
    }

    #[test]
    fn scopes() {
        let source = r#"
            var a = "global";
            { var a = "inner"; print a; a = "changed"; print a; }
            print a;
            { a = "assigned"; }
            print a;
            var a = "redefined";
            print a;
        "#;
        assert_eq!(output(source), vec!["inner", "changed", "global", "assigned", "redefined"]);
    }

    #[test]
    fn for_loop_and_break() {
        let source = r#"
            for (var i = 0; i < 10; i++) {
                if (i == 3) break;
                print i;
            }
            var n = 0;
            while (true) { n += 1; if (n > 4) break; }
            print n;
        "#;
        assert_eq!(output(source), vec!["0", "1", "2", "5"]);
    }

    #[test]
    fn break_only_exits_inner_loop() {
        let source = r#"
            for (var i = 0; i < 2; i++) {
                for (var j = 0; j < 5; j++) { if (j == 1) break; print i + j * 10; }
            }
        "#;
        assert_eq!(output(source), vec!["0", "1"]);
    }

    #[test]
    fn return_from_nested_loop() {
        let source = r#"
            fun find(xs, x) {
                for (var i = 0; i < len(xs); i++) { while (true) { if (xs[i] == x) return i; break; } }
                return -1;
            }
            print find([5, 6, 7], 7);
            print find([5, 6, 7], 8);
        "#;
        assert_eq!(output(source), vec!["2", "-1"]);
    }

    #[test]
    fn implicit_return_is_nil() {
        assert_eq!(output("fun f() {} print f(); fun g() { return; } print g();"), vec!["nil", "nil"]);
    }

    #[test]
    fn switch_first_match_no_fallthrough() {
        let source = r#"
            fun describe(x) {
                switch (x) {
                    case 1: case 2: return "small";
                    case 2: return "unreachable";
                    case "a": print "letter";
                    default: return "other";
                }
                return "after";
            }
            print describe(2);
            print describe("a");
            print describe(nil);
        "#;
        assert_eq!(output(source), vec!["small", "letter", "after", "other"]);
    }

    #[test]
    fn switch_default_tried_last() {
        let source = r#"switch (3) { default: print "default"; case 3: print "three"; }"#;
        assert_eq!(output(source), vec!["three"]);
        let source = r#"switch (4) { default: print "default"; case 3: print "three"; }"#;
        assert_eq!(output(source), vec!["default"]);
        assert_eq!(output("switch (4) { case 3: print 3; }"), Vec::<String>::new());
    }

    #[test]
    fn switch_evaluates_discriminant_once() {
        let source = r#"
            var calls = 0;
            fun next() { calls++; return calls; }
            switch (next()) { case 5: print "five"; case 1: print "one"; }
            print calls;
        "#;
        assert_eq!(output(source), vec!["one", "1"]);
    }

    #[test]
    fn break_inside_switch_exits_loop() {
        let source = r#"
            var i = 0;
            while (true) { switch (i) { case 2: break; default: i++; } }
            print i;
        "#;
        assert_eq!(output(source), vec!["2"]);
    }

    #[test]
    fn logical_operators_yield_bools() {
        let source = r#"print 1 and 2; print nil or 0; print nil and undefined; print "x" or undefined;"#;
        assert_eq!(output(source), vec!["true", "true", "false", "true"]);
    }

    #[test]
    fn strings() {
        let source = r#"var s = "héllo"; print s + "!"; print s[1]; print len(s);"#;
        assert_eq!(output(source), vec!["héllo!", "é", "5"]);
        assert_eq!(
            error(r#"var s = "abc"; s[0] = "x";"#),
            Error::TypeError(TypeError::NotIndexable {
                type_: "string".to_string(),
                access: "item assignment".to_string()
            })
        );
        assert_eq!(
            error(r#""abc"[3];"#),
            Error::IndexError(IndexError::OutOfRange { type_: "string".to_string(), index: 3, len: 3 })
        );
    }

    #[test]
    fn arrays_are_shared() {
        let source = r#"
            var a = [1, 2, 3];
            var b = a;
            b[0] = 10;
            push(b, 4);
            print a;
            print a == b;
            print a == [10, 2, 3, 4];
            var grid = [[1, 2], [3, 4]];
            grid[1][0] = "x";
            print grid;
        "#;
        assert_eq!(output(source), vec!["[10, 2, 3, 4]", "true", "false", r#"[[1, 2], ["x", 4]]"#]);
    }

    #[test]
    fn array_index_errors() {
        assert_eq!(
            error("var a = [1]; a[1];"),
            Error::IndexError(IndexError::OutOfRange { type_: "array".to_string(), index: 1, len: 1 })
        );
        assert_eq!(
            error("var a = [1]; a[5] = 2;"),
            Error::IndexError(IndexError::OutOfRange { type_: "array".to_string(), index: 5, len: 1 })
        );
        assert_eq!(
            error("[1][-1];"),
            Error::TypeError(TypeError::InvalidIndex { type_: "array".to_string(), index: "-1".to_string() })
        );
        assert_eq!(
            error("[1][0.5];"),
            Error::TypeError(TypeError::InvalidIndex { type_: "array".to_string(), index: "0.5".to_string() })
        );
        assert_eq!(
            error(r#"[1]["0"];"#),
            Error::TypeError(TypeError::InvalidIndex {
                type_: "array".to_string(),
                index: r#""0""#.to_string()
            })
        );
        assert_eq!(
            error("var n = 1; n[0];"),
            Error::TypeError(TypeError::NotIndexable {
                type_: "number".to_string(),
                access: "item access".to_string()
            })
        );
    }

    #[test]
    fn structs() {
        let source = r#"
            var point = { x: 1, y: 2 };
            var alias = point;
            alias.x = 5;
            point.z = 3;
            point["y"] += 10;
            print point;
            print alias.z;
            var reserved = { if: "i", default: "d" };
            print reserved.if + reserved.default;
            {};
            print {};
        "#;
        assert_eq!(output(source), vec!["{ x: 5, y: 12, z: 3 }", "3", "id", "{}"]);
        assert_eq!(
            error("var s = { a: 1 }; s.b;"),
            Error::AttributeError(AttributeError::NoSuchAttribute {
                type_: "struct".to_string(),
                name: "b".to_string()
            })
        );
        assert_eq!(
            error("var n = nil; n.field = 1;"),
            Error::TypeError(TypeError::NotIndexable {
                type_: "nil".to_string(),
                access: "field assignment".to_string()
            })
        );
    }

    #[test]
    fn update_and_compound_assignment() {
        let source = r#"
            var a = 1;
            print a++; print a; print ++a; print a--; print --a;
            var xs = [1, 2];
            xs[1] *= 5; xs[0] -= 3; print xs;
            var s = "ab"; s += "c"; print s;
            var p = { n: 1 }; p.n++; ++p.n; print p.n;
            print a /= 4;
        "#;
        assert_eq!(output(source), vec!["1", "2", "3", "3", "1", "[-2, 10]", "abc", "3", "0.25"]);
    }

    #[test]
    fn update_evaluates_target_once() {
        let source = r#"
            var calls = 0;
            var xs = [0, 0];
            fun idx() { calls++; return 1; }
            xs[idx()]++;
            xs[idx()] += 5;
            print xs;
            print calls;
        "#;
        assert_eq!(output(source), vec!["[0, 6]", "2"]);
    }

    #[test]
    fn update_requires_number() {
        assert_eq!(
            error(r#"var s = "a"; s++;"#),
            Error::TypeError(TypeError::UnsupportedOperandInfix {
                op: "+".to_string(),
                lt_type: "string".to_string(),
                rt_type: "number".to_string()
            })
        );
    }

    #[test]
    fn evaluation_order() {
        let source = r#"
            fun trace(x) { print x; return x; }
            trace(1) + trace(2);
            [trace(3), trace(4)];
            { a: trace(5), b: trace(6) };
            fun callee() { print "callee"; return trace; }
            callee()(trace(7));
        "#;
        assert_eq!(output(source), vec!["1", "2", "3", "4", "5", "6", "callee", "7", "7"]);
    }

    #[test]
    fn equality() {
        let source = r#"
            print 1 == 1; print "a" == "a"; print nil == false; print 1 != "1";
            var f = len; print f == len;
            fun g() {} print g == g;
            var s = {}; print s == s; print s == {};
        "#;
        assert_eq!(
            output(source),
            vec!["true", "true", "false", "true", "true", "true", "true", "false"]
        );
    }

    #[test]
    fn arithmetic_errors() {
        assert_eq!(error("1 / 0;"), Error::ZeroDivisionError(ZeroDivisionError::DivisionByZero));
        assert_eq!(
            error(r#"1 + "a";"#),
            Error::TypeError(TypeError::UnsupportedOperandInfix {
                op: "+".to_string(),
                lt_type: "number".to_string(),
                rt_type: "string".to_string()
            })
        );
        assert_eq!(
            error(r#""a" < "b";"#),
            Error::TypeError(TypeError::UnsupportedOperandInfix {
                op: "<".to_string(),
                lt_type: "string".to_string(),
                rt_type: "string".to_string()
            })
        );
        assert_eq!(
            error("-nil;"),
            Error::TypeError(TypeError::UnsupportedOperandPrefix {
                op: "-".to_string(),
                rt_type: "nil".to_string()
            })
        );
    }

    #[test]
    fn name_errors() {
        let not_defined = Error::NameError(NameError::NotDefined { name: "x".to_string() });
        assert_eq!(error("print x;"), not_defined);
        assert_eq!(error("x = 1;"), not_defined);
        assert_eq!(error("x++;"), not_defined);
    }

    #[test]
    fn call_depth_is_limited() {
        let mut interpreter = Interpreter::new(Script::default());
        let errors = interpreter.run_source("fun f(n) { return f(n + 1); } f(0);").unwrap_err();
        assert_eq!(
            errors[0].0,
            Error::OverflowError(OverflowError::StackOverflow { max: MAX_FRAMES })
        );

        let source = r#"
            fun depth(n) { if (n == 0) return 0; return 1 + depth(n - 1); }
            print depth(60);
        "#;
        interpreter.run_source(source).unwrap();
        assert_eq!(interpreter.system().output, vec!["60"]);
    }

    #[test]
    fn not_callable() {
        assert_eq!(
            error(r#""f"();"#),
            Error::TypeError(TypeError::NotCallable { type_: "string".to_string() })
        );
    }

    #[test]
    fn reserved_keywords() {
        assert_eq!(
            error("print this;"),
            Error::TypeError(TypeError::ReservedKeyword { keyword: "this".to_string() })
        );
        assert_eq!(
            error("print super.x;"),
            Error::TypeError(TypeError::ReservedKeyword { keyword: "super".to_string() })
        );
    }

    #[test]
    fn output_before_error_is_kept() {
        let (output, result) = run_with(Script::default(), "print 1; print nope; print 2;");
        assert_eq!(output, vec!["1"]);
        assert!(result.is_err());
    }

    #[test]
    fn syntax_errors_run_nothing() {
        let (output, result) = run_with(Script::default(), "print 1; print ;");
        assert_eq!(output, Vec::<String>::new());
        assert!(matches!(result, Err(Error::SyntaxError(_))));
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut interpreter = Interpreter::new(Script::default());
        interpreter.run_source("var a = 1; fun inc() { a++; }").unwrap();
        interpreter.run_source("inc(); print a;").unwrap();
        assert_eq!(interpreter.system().output, vec!["2"]);
    }

    #[test]
    fn error_span_points_at_expression() {
        let mut interpreter = Interpreter::new(Script::default());
        let errors = interpreter.run_source("var a = 1;\nprint a + nil;").unwrap_err();
        assert_eq!(errors[0].1, Span::new(2, 17, 24));
    }
}
