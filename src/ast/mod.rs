//! AST foundation types and node structures.

mod expression;
mod span;

pub use expression::{
    BinaryOp, CompareOp, Expr, ExprKind, LogicalOp, PathRoot, PathSegment, Quantifier, UnaryOp,
};
pub use span::Span;
