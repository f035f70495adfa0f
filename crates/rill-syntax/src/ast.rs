use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

pub use rill_common::types::{Span, Spanned};

pub type StmtS = Spanned<Stmt>;
pub type ExprS = Spanned<Expr>;

#[derive(Debug, Default, PartialEq)]
pub struct Program {
    pub stmts: Vec<StmtS>,
}

#[remain::sorted]
#[derive(Debug, PartialEq)]
pub enum Stmt {
    Block(StmtBlock),
    Break,
    Expr(StmtExpr),
    Fun(Rc<StmtFun>),
    If(Box<StmtIf>),
    Print(StmtPrint),
    Return(StmtReturn),
    Switch(Box<StmtSwitch>),
    Var(StmtVar),
    While(Box<StmtWhile>),
}

#[derive(Debug, PartialEq)]
pub struct StmtBlock {
    pub stmts: Vec<StmtS>,
}

/// An expression statement evaluates an expression and discards the result.
#[derive(Debug, PartialEq)]
pub struct StmtExpr {
    pub value: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct StmtFun {
    pub name: String,
    pub params: Vec<String>,
    pub body: StmtBlock,
}

#[derive(Debug, PartialEq)]
pub struct StmtIf {
    pub cond: ExprS,
    pub then: StmtS,
    pub else_: Option<StmtS>,
}

#[derive(Debug, PartialEq)]
pub struct StmtPrint {
    pub value: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct StmtReturn {
    pub value: Option<ExprS>,
}

#[derive(Debug, PartialEq)]
pub struct StmtSwitch {
    pub discriminant: ExprS,
    pub cases: Vec<SwitchCase>,
    pub default: Option<SwitchDefault>,
}

/// One `case` clause. Labels written back to back share a single body, so
/// `case 1: case 2: body;` has two `values`.
#[derive(Debug, PartialEq)]
pub struct SwitchCase {
    pub values: Vec<ExprS>,
    pub body: StmtBlock,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct SwitchDefault {
    pub body: StmtBlock,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct StmtVar {
    pub name: String,
    pub value: Option<ExprS>,
}

#[derive(Debug, PartialEq)]
pub struct StmtWhile {
    pub cond: ExprS,
    pub body: StmtS,
}

#[remain::sorted]
#[derive(Debug, PartialEq)]
pub enum Expr {
    Array(ExprArray),
    Assign(Box<ExprAssign>),
    AssignOp(Box<ExprAssignOp>),
    Call(Box<ExprCall>),
    Get(Box<ExprGet>),
    Grouping(Box<ExprGrouping>),
    Infix(Box<ExprInfix>),
    Literal(ExprLiteral),
    Logical(Box<ExprLogical>),
    Prefix(Box<ExprPrefix>),
    Set(Box<ExprSet>),
    Struct(ExprStruct),
    Super(ExprSuper),
    This,
    Update(Box<ExprUpdate>),
    Variable(ExprVariable),
}

#[derive(Debug, PartialEq)]
pub struct ExprArray {
    pub elements: Vec<ExprS>,
}

#[derive(Debug, PartialEq)]
pub struct ExprAssign {
    pub name: String,
    pub value: ExprS,
}

/// Compound assignment, e.g. `a += 1` or `xs[i] *= 2`. The target is
/// either a [`Expr::Variable`] or an [`Expr::Get`].
#[derive(Debug, PartialEq)]
pub struct ExprAssignOp {
    pub target: ExprS,
    pub op: OpAssign,
    pub value: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprCall {
    pub callee: ExprS,
    pub args: Vec<ExprS>,
}

#[derive(Debug, PartialEq)]
pub struct ExprGet {
    pub object: ExprS,
    pub accessor: Accessor,
    pub key: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprGrouping {
    pub expr: ExprS,
}

#[derive(Debug, PartialEq)]
pub enum ExprLiteral {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, PartialEq)]
pub struct ExprInfix {
    pub lt: ExprS,
    pub op: OpInfix,
    pub rt: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprLogical {
    pub lt: ExprS,
    pub op: OpLogical,
    pub rt: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprPrefix {
    pub op: OpPrefix,
    pub rt: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprSet {
    pub object: ExprS,
    pub accessor: Accessor,
    pub key: ExprS,
    pub value: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprStruct {
    pub fields: Vec<StructField>,
}

#[derive(Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    pub span: Span,
    pub value: ExprS,
}

#[derive(Debug, PartialEq)]
pub struct ExprSuper {
    pub name: String,
}

/// `++` / `--`, applied before or after its target.
#[derive(Debug, PartialEq)]
pub struct ExprUpdate {
    pub target: ExprS,
    pub op: OpUpdate,
    pub fixity: Fixity,
}

#[derive(Debug, Eq, PartialEq)]
pub struct ExprVariable {
    pub name: String,
}

/// How a [`ExprGet`] / [`ExprSet`] reached its key: `object.name` or
/// `object[key]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Accessor {
    Dot,
    Index,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fixity {
    Prefix,
    Postfix,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpAssign {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl OpAssign {
    pub fn infix(self) -> OpInfix {
        match self {
            OpAssign::Add => OpInfix::Add,
            OpAssign::Subtract => OpInfix::Subtract,
            OpAssign::Multiply => OpInfix::Multiply,
            OpAssign::Divide => OpInfix::Divide,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpInfix {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Display for OpInfix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self {
            OpInfix::Add => "+",
            OpInfix::Subtract => "-",
            OpInfix::Multiply => "*",
            OpInfix::Divide => "/",
            OpInfix::Equal => "==",
            OpInfix::NotEqual => "!=",
            OpInfix::Greater => ">",
            OpInfix::GreaterEqual => ">=",
            OpInfix::Less => "<",
            OpInfix::LessEqual => "<=",
        };
        write!(f, "{op}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpLogical {
    /// Short-circuiting logical AND.
    And,
    /// Short-circuiting logical OR.
    Or,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpPrefix {
    Negate,
    Not,
}

impl Display for OpPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self {
            OpPrefix::Negate => "-",
            OpPrefix::Not => "!",
        };
        write!(f, "{op}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpUpdate {
    Increment,
    Decrement,
}

impl Display for OpUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self {
            OpUpdate::Increment => "++",
            OpUpdate::Decrement => "--",
        };
        write!(f, "{op}")
    }
}
