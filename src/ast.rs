use crate::error::Span;
use crate::value::Value;

/// Concrete syntax tree for the restricted CEL dialect: one variant per
/// grammar rule. The tree is built once per parse and never mutated.

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: Value,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    /// A reserved keyword in expression position. Parsing accepts it so the
    /// evaluator can raise the dedicated error uniformly.
    Reserved {
        name: String,
        span: Span,
    },
    Comparison {
        left: Box<Expr>,
        operator: CompareOp,
        right: Box<Expr>,
        span: Span,
    },
    Additive {
        left: Box<Expr>,
        operator: ArithOp,
        right: Box<Expr>,
        span: Span,
    },
    Grouping {
        expr: Box<Expr>,
        span: Span,
    },
    List {
        elements: Vec<Expr>,
        span: Span,
    },
    /// Map literal. Keys are the literal string text; duplicate keys are
    /// resolved last-write-wins at evaluation time.
    Map {
        entries: Vec<(String, Expr)>,
        span: Span,
    },
    /// Dot access: `object.name`
    Member {
        object: Box<Expr>,
        name: String,
        span: Span,
    },
    /// Bracket access: `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. } => span,
            Expr::Identifier { span, .. } => span,
            Expr::Reserved { span, .. } => span,
            Expr::Comparison { span, .. } => span,
            Expr::Additive { span, .. } => span,
            Expr::Grouping { span, .. } => span,
            Expr::List { span, .. } => span,
            Expr::Map { span, .. } => span,
            Expr::Member { span, .. } => span,
            Expr::Index { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompareOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArithOp {
    Add,
    Subtract,
}
