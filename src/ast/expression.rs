//! Expression AST nodes.
//!
//! This is the raw tree produced by the parser, before compilation. The
//! compiler (`crate::compiler`) lowers this into `ExprNode`, which carries
//! the metadata (scalar/sequence shape, field set, immutability) and the
//! evaluator.

use crate::ast::Span;
use smol_str::SmolStr;

/// Any parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The shape of a parsed expression node.
///
/// Variant names (`Int`, `Double`, `String`, ..., `And`, `Or`) track the
/// compiled node-type enumeration directly, so that the compiler's
/// `ExprKind -> NodeType` lowering is a near-identity map.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Double(f64),
    Str(SmolStr),
    Bool(bool),
    Null,

    /// `[e1, e2, ...]`
    Array(Vec<Expr>),
    /// `{ key: expr, ... }`, keys in source order.
    Document(Vec<(SmolStr, Expr)>),

    /// `@0`, `@name`.
    Parameter(SmolStr),

    /// `name(args...)`.
    Call { name: SmolStr, args: Vec<Expr> },

    /// A root-rooted path: `$`, `$.a.b`, `$.a[0]`, `$.a[*]`, `$.a[pred]`.
    /// `root` is `Root` for `$`-rooted paths, `Current` for `@`-rooted
    /// paths (used inside MAP/FILTER projections).
    Path {
        root: PathRoot,
        segments: Vec<PathSegment>,
    },

    /// The bare `*` (source sequence).
    Source,

    /// `MAP(source => projection)`, `@` inside `projection` binds to each
    /// element of `source`. Also the desugared form of postfix-after-`[*]`.
    Map {
        source: Box<Expr>,
        projection: Box<Expr>,
    },

    /// `FILTER(source => predicate)`.
    Filter {
        source: Box<Expr>,
        predicate: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        quantifier: Quantifier,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Between {
        quantifier: Quantifier,
        value: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    Like {
        quantifier: Quantifier,
        value: Box<Expr>,
        pattern: Box<Expr>,
    },
    In {
        quantifier: Quantifier,
        value: Box<Expr>,
        set: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Parenthesized sub-expression, kept only to guide `source()` reprinting
    /// decisions during parsing; normalization re-derives parens from
    /// precedence rather than preserving this node.
    Paren(Box<Expr>),
}

/// Root of a path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot {
    /// `$` — the document passed to `evaluate`.
    Root,
    /// `@` — the current value bound by an enclosing MAP/FILTER.
    Current,
}

/// One postfix path step.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// `.name` or `.["name"]`.
    Field(SmolStr),
    /// `[i]` with a literal integer index.
    Index(i64),
    /// `[*]` — flatten all array elements.
    Wildcard,
    /// `[predicate]` — array filter, `predicate` sees `@` = element.
    Filter(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// `ANY` (default) or `ALL` quantification of a sequence-vs-scalar
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    #[default]
    Any,
    All,
}
