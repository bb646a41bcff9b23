//! The compiled expression node: an `Expr` plus the metadata the compiler
//! synthesizes over it.

use crate::ast::{BinaryOp, CompareOp, Expr, ExprKind, LogicalOp};
use smol_str::SmolStr;
use std::fmt;

/// The `type` tag exposed by a compiled expression. Variant names track
/// the AST's shape directly so the `ExprKind -> NodeType` mapping is
/// close to a one-to-one projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Int,
    Double,
    String,
    Boolean,
    Null,
    Array,
    Document,
    Parameter,
    Call,
    Path,
    Source,
    Map,
    Filter,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    Between,
    In,
    And,
    Or,
}

impl NodeType {
    /// True precisely for this fixed set of comparison/logical node types.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            NodeType::Equal
                | NodeType::NotEqual
                | NodeType::GreaterThan
                | NodeType::GreaterThanOrEqual
                | NodeType::LessThan
                | NodeType::LessThanOrEqual
                | NodeType::Like
                | NodeType::Between
                | NodeType::In
                | NodeType::And
                | NodeType::Or
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Classifies an `Expr` node's shape into its `NodeType`, ignoring the
/// transparent `Paren` wrapper (which has no type of its own — it takes
/// the type of its inner expression).
pub fn node_type(expr: &Expr) -> NodeType {
    match &expr.kind {
        ExprKind::Int(_) => NodeType::Int,
        ExprKind::Double(_) => NodeType::Double,
        ExprKind::Str(_) => NodeType::String,
        ExprKind::Bool(_) => NodeType::Boolean,
        ExprKind::Null => NodeType::Null,
        ExprKind::Array(_) => NodeType::Array,
        ExprKind::Document(_) => NodeType::Document,
        ExprKind::Parameter(_) => NodeType::Parameter,
        ExprKind::Call { .. } => NodeType::Call,
        ExprKind::Path { .. } => NodeType::Path,
        ExprKind::Source => NodeType::Source,
        ExprKind::Map { .. } => NodeType::Map,
        ExprKind::Filter { .. } => NodeType::Filter,
        ExprKind::Unary { operand, .. } => node_type(operand),
        ExprKind::Binary { op, .. } => match op {
            BinaryOp::Add => NodeType::Add,
            BinaryOp::Subtract => NodeType::Subtract,
            BinaryOp::Multiply => NodeType::Multiply,
            BinaryOp::Divide => NodeType::Divide,
            BinaryOp::Modulo => NodeType::Modulo,
        },
        ExprKind::Compare { op, .. } => match op {
            CompareOp::Equal => NodeType::Equal,
            CompareOp::NotEqual => NodeType::NotEqual,
            CompareOp::Greater => NodeType::GreaterThan,
            CompareOp::GreaterOrEqual => NodeType::GreaterThanOrEqual,
            CompareOp::Less => NodeType::LessThan,
            CompareOp::LessOrEqual => NodeType::LessThanOrEqual,
        },
        ExprKind::Between { .. } => NodeType::Between,
        ExprKind::Like { .. } => NodeType::Like,
        ExprKind::In { .. } => NodeType::In,
        ExprKind::Logical { op, .. } => match op {
            LogicalOp::And => NodeType::And,
            LogicalOp::Or => NodeType::Or,
        },
        ExprKind::Paren(inner) => node_type(inner),
    }
}

/// A fully-compiled, immutable expression: the parsed tree plus every
/// piece of metadata the compiler synthesizes over it. Cheap to share —
/// `compiler::Expression` wraps this in an `Arc`.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub expr: Expr,
    pub source: String,
    pub node_type: NodeType,
    pub is_scalar: bool,
    pub is_immutable: bool,
    pub is_any: bool,
    pub is_all: bool,
    pub uses_source: bool,
    /// Root field names referenced, in first-seen order, deduplicated
    /// case-insensitively (spec.md §4.3 point 2). `"$"` means "the whole
    /// document is needed".
    pub fields: Vec<SmolStr>,
}

impl ExprNode {
    pub fn is_predicate(&self) -> bool {
        self.node_type.is_predicate()
    }
}
