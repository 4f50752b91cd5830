//! The typed AST produced by the parser and consumed by the code generator.

use strum_macros::IntoStaticStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A binary operator symbol, carried verbatim from the lexer's token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Dot,
    Cross,
    Lt,
    Gt,
    Le,
    Ge,
}

/// A unary operator symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    Neg,
    Transpose,
}

/// A range descriptor as produced by the parser: either a component
/// alphabet (`"xyz"`, `"xyzw"`), a half-open integer interval, or raw text
/// the parser did not recognize (preserved so the generator can fall back
/// to treating it as a single-element range, per the degrade-gracefully
/// philosophy the rest of the pipeline follows).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RangeDesc {
    Components(&'static str),
    IntRange(u32, u32),
    Raw(String),
}

impl RangeDesc {
    /// Expands this descriptor into the concrete substitution strings used
    /// during sum/comprehension expansion.
    pub fn index_strings(&self) -> Vec<String> {
        match self {
            RangeDesc::Components(letters) => letters.chars().map(|c| c.to_string()).collect(),
            RangeDesc::IntRange(lo, hi) => (*lo..*hi).map(|n| format!("{n}.0f")).collect(),
            RangeDesc::Raw(text) => vec![text.clone()],
        }
    }
}

/// A function parameter: its name and its textual type tag (`"scalar"`,
/// `"ℝ"`, `"ℝ3"`, `"ℝ4"`, `"ℝ4x4"`, `"ℤ"`, or whatever the type parser
/// produced — superscripts arrive as the lexer's ASCII rewrite, never the
/// original Unicode code points).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Param {
    pub name: String,
    pub type_tag: String,
}

/// A parsed function definition, ready for code generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: String,
    pub body: Expr,
}

/// The DSL's expression AST. Owned and boxed rather than arena-allocated —
/// each `Expr` tree is built once by the parser, walked once per emission
/// mode by the generator, and never shared across branches, so there is no
/// long-lived borrow graph to amortize an arena over.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    Number(String),
    Variable(String),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Call(String, Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    MatrixIndex(Box<Expr>, Box<Expr>, Box<Expr>),
    DotAccess(Box<Expr>, String),
    Sum(String, RangeDesc, Box<Expr>),
    Norm(Box<Expr>),
    Vector(Vec<Expr>),
    Comprehension(Box<Expr>, String, RangeDesc),
    Matrix(Vec<Vec<Expr>>),
    Let(Vec<(String, Expr)>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
}

static_assertions::assert_impl_all!(Expr: Send, Sync);
static_assertions::assert_impl_all!(FuncDef: Send, Sync);

impl Expr {
    /// Whether this node, used as the direct body of a `let` or as the
    /// branch of an `if`, forces block-structured (rather than ternary)
    /// code generation: it is itself a `let`, or an `if` one of whose
    /// branches itself needs block form.
    pub fn branch_needs_block(&self) -> bool {
        match self {
            Expr::Let(_, _) => true,
            Expr::If(_, t, f) => t.branch_needs_block() || f.branch_needs_block(),
            _ => false,
        }
    }
}
