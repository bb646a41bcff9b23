//! The compiler/analyzer and evaluator: turns parsed `Expr` trees into
//! immutable, shareable `Expression` values.

pub mod analyzer;
pub mod eval;
pub mod functions;
pub mod node;
pub mod normalize;
pub mod prebuilt;

use crate::ast::{Expr, ExprKind, PathSegment};
use crate::error::Error;
use crate::value::collation::{Collation, InvariantCollation};
use crate::value::{Document, Value};
use dashmap::DashMap;
use node::{node_type, ExprNode, NodeType};
use smol_str::SmolStr;
use std::sync::{Arc, OnceLock};

/// The recursion-depth guard used by [`compile`]/[`compile_for_index`]
/// when no [`CompileOptions`] is supplied, bounding pathological nesting
/// in the parser/compiler.
pub const MAX_EXPRESSION_DEPTH: usize = 200;

/// Tunable compile-time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { max_depth: MAX_EXPRESSION_DEPTH }
    }
}

/// An immutable, cheaply-cloneable compiled expression. Wraps an
/// `Arc<ExprNode>` so cached entries and call-site clones share the same
/// backing allocation, letting compiled expressions be freely shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Expression(Arc<ExprNode>);

impl Expression {
    pub fn source(&self) -> &str {
        &self.0.source
    }

    pub fn node_type(&self) -> NodeType {
        self.0.node_type
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_scalar
    }

    pub fn is_immutable(&self) -> bool {
        self.0.is_immutable
    }

    pub fn is_predicate(&self) -> bool {
        self.0.is_predicate()
    }

    pub fn is_any(&self) -> bool {
        self.0.is_any
    }

    pub fn is_all(&self) -> bool {
        self.0.is_all
    }

    pub fn uses_source(&self) -> bool {
        self.0.uses_source
    }

    pub fn fields(&self) -> &[SmolStr] {
        &self.0.fields
    }

    pub(crate) fn node(&self) -> &ExprNode {
        &self.0
    }

    /// Wraps a raw AST node as a compiled expression without going through
    /// the parser or the compile cache — used by the optimizer to build
    /// sub-terms (AND-split conjuncts, the ANY-rewrite's synthesized
    /// `IN ARRAY(...)` node) directly from pieces of an already-parsed
    /// tree.
    pub(crate) fn from_expr(expr: Expr) -> Self {
        Expression(Arc::new(build_node(expr)))
    }

    /// Reference-identity comparison, distinguishing the exact term
    /// instance the optimizer consumed from an equal-by-value but
    /// distinct term.
    pub(crate) fn ptr_eq(&self, other: &Expression) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Runs the compiled expression against the four evaluation inputs:
    /// the current source sequence (for `*`), the root document, the
    /// current value (for `@`), a collation, and a parameters document.
    pub fn evaluate(
        &self,
        source_seq: &[Value],
        root: &Value,
        current: &Value,
        collation: &dyn Collation,
        parameters: &Document,
    ) -> Vec<Value> {
        let ctx = eval::EvalCtx { source_seq, root, current, collation, parameters };
        eval::evaluate(&self.0.expr, ctx)
    }

    /// Evaluates for tests/constant-folding callers: returns the first
    /// emitted value, or `Null` on an empty result.
    /// Each argument defaults when omitted: an empty document for `root`,
    /// [`InvariantCollation`] for `collation`, an empty document for
    /// `parameters`.
    pub fn execute_scalar(
        &self,
        root: Option<&Value>,
        collation: Option<&dyn Collation>,
        parameters: Option<&Document>,
    ) -> Value {
        let default_root = Value::Document(Document::new());
        let default_collation = InvariantCollation;
        let default_parameters = Document::new();
        let root = root.unwrap_or(&default_root);
        let collation = collation.unwrap_or(&default_collation);
        let parameters = parameters.unwrap_or(&default_parameters);
        self.evaluate(&[], root, root, collation, parameters).into_iter().next().unwrap_or(Value::Null)
    }
}

/// Walks the full tree validating every `Call` node's function name and
/// argument count against the registry: an unknown name or mismatched
/// arity raises at compile time.
fn validate_calls(expr: &Expr) -> Result<(), Error> {
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Double(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Parameter(_)
        | ExprKind::Source => Ok(()),
        ExprKind::Array(items) => items.iter().try_for_each(validate_calls),
        ExprKind::Document(fields) => fields.iter().try_for_each(|(_, v)| validate_calls(v)),
        ExprKind::Call { name, args } => {
            let spec = functions::lookup(name)
                .ok_or_else(|| Error::invalid_expression_type(format!("unknown function '{name}'")))?;
            if !spec.arity.accepts(args.len()) {
                return Err(Error::invalid_expression_type(format!(
                    "function '{name}' called with {} argument(s)",
                    args.len()
                )));
            }
            args.iter().try_for_each(validate_calls)
        }
        ExprKind::Path { segments, .. } => segments.iter().try_for_each(|segment| match segment {
            PathSegment::Filter(predicate) => validate_calls(predicate),
            PathSegment::Field(_) | PathSegment::Index(_) | PathSegment::Wildcard => Ok(()),
        }),
        ExprKind::Map { source, projection } => {
            validate_calls(source)?;
            validate_calls(projection)
        }
        ExprKind::Filter { source, predicate } => {
            validate_calls(source)?;
            validate_calls(predicate)
        }
        ExprKind::Unary { operand, .. } => validate_calls(operand),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            validate_calls(left)?;
            validate_calls(right)
        }
        ExprKind::Compare { left, right, .. } => {
            validate_calls(left)?;
            validate_calls(right)
        }
        ExprKind::Between { value, low, high, .. } => {
            validate_calls(value)?;
            validate_calls(low)?;
            validate_calls(high)
        }
        ExprKind::Like { value, pattern, .. } => {
            validate_calls(value)?;
            validate_calls(pattern)
        }
        ExprKind::In { value, set, .. } => {
            validate_calls(value)?;
            validate_calls(set)
        }
        ExprKind::Paren(inner) => validate_calls(inner),
    }
}

fn compile_cache() -> &'static DashMap<String, Expression> {
    static CACHE: OnceLock<DashMap<String, Expression>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

fn build_node(expr: Expr) -> ExprNode {
    let source = normalize::normalize(&expr);
    let ty = node_type(&expr);
    let quantifier = analyzer::top_level_quantifier(&expr).unwrap_or_default();
    ExprNode {
        is_scalar: analyzer::is_scalar(&expr),
        is_immutable: analyzer::is_immutable(&expr),
        is_any: matches!(quantifier, crate::ast::Quantifier::Any),
        is_all: matches!(quantifier, crate::ast::Quantifier::All),
        uses_source: analyzer::uses_source(&expr),
        fields: analyzer::fields(&expr),
        node_type: ty,
        source,
        expr,
    }
}

/// Parses and compiles `source`, linearizably inserting into the
/// process-wide compile cache keyed by normalized source text.
/// `parameters` is accepted for signature parity with [`compile_for_index`]
/// but is not consulted at compile time — parameter values are supplied
/// per-evaluation, not per-compile.
pub fn compile(source: &str, parameters: Option<&Document>) -> Result<Expression, Error> {
    compile_with_options(source, CompileOptions::default(), parameters)
}

pub fn compile_with_options(
    source: &str,
    options: CompileOptions,
    _parameters: Option<&Document>,
) -> Result<Expression, Error> {
    let tokens = crate::lexer::tokenize(source)?;
    let expr = crate::parser::expression::parse_expression_with_depth(&tokens, options.max_depth)?;
    validate_calls(&expr)?;
    let node = build_node(expr);
    let expression = Expression(Arc::new(node));

    if let Some(cached) = compile_cache().get(expression.source()) {
        return Ok(cached.clone());
    }
    compile_cache()
        .entry(expression.source().to_string())
        .or_insert_with(|| expression.clone());
    Ok(expression)
}

/// Compiles `source` as an index-key expression: rejects parameters,
/// user-defined function calls, `*`, and any
/// operator outside a path's bracketed filter predicate. Only paths,
/// nested paths with `[*]`/`[index]`/scalar filter predicates, and
/// document/array initializers over the same are allowed — this is the
/// restricted grammar an index's `expression` column must satisfy so it
/// can be evaluated per-document with no ambient parameters environment.
pub fn compile_for_index(source: &str) -> Result<Expression, Error> {
    let tokens = crate::lexer::tokenize(source)?;
    let expr = crate::parser::expression::parse_expression(&tokens)?;
    validate_index_value(&expr)?;
    let node = build_node(expr);
    Ok(Expression(Arc::new(node)))
}

fn reject(what: &str) -> Error {
    Error::invalid_expression_type(format!("{what} is not allowed in an index expression"))
}

/// "Value position": literals, paths, document/array initializers, and
/// `MAP`/`FILTER` over the same — anything that can appear as the key an
/// index stores. `*`, parameters, and user function calls are rejected
/// here and everywhere else in the tree.
fn validate_index_value(expr: &Expr) -> Result<(), Error> {
    match &expr.kind {
        ExprKind::Int(_) | ExprKind::Double(_) | ExprKind::Str(_) | ExprKind::Bool(_) | ExprKind::Null => Ok(()),
        ExprKind::Array(items) => items.iter().try_for_each(validate_index_value),
        ExprKind::Document(fields) => fields.iter().try_for_each(|(_, v)| validate_index_value(v)),
        ExprKind::Path { segments, .. } => {
            for segment in segments {
                if let PathSegment::Filter(predicate) = segment {
                    validate_index_predicate(predicate)?;
                }
            }
            Ok(())
        }
        ExprKind::Map { source, projection } => {
            validate_index_value(source)?;
            validate_index_value(projection)
        }
        ExprKind::Filter { source, predicate } => {
            validate_index_value(source)?;
            validate_index_predicate(predicate)
        }
        ExprKind::Paren(inner) => validate_index_value(inner),
        ExprKind::Source => Err(reject("'*'")),
        ExprKind::Parameter(_) => Err(reject("a parameter reference")),
        ExprKind::Call { .. } => Err(reject("a function call")),
        ExprKind::Unary { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Compare { .. }
        | ExprKind::Between { .. }
        | ExprKind::Like { .. }
        | ExprKind::In { .. }
        | ExprKind::Logical { .. } => Err(reject("an operator")),
    }
}

/// "Predicate position": the contents of a path's `[predicate]` filter
/// segment. Comparisons/`BETWEEN`/`LIKE`/`IN`/`AND`/`OR` are allowed here
/// as scalar predicates, but their operands still go through
/// [`validate_index_value`], so `*`/parameters/calls remain rejected even
/// inside a filter.
fn validate_index_predicate(expr: &Expr) -> Result<(), Error> {
    match &expr.kind {
        ExprKind::Compare { left, right, .. } => {
            validate_index_value(left)?;
            validate_index_value(right)
        }
        ExprKind::Between { value, low, high, .. } => {
            validate_index_value(value)?;
            validate_index_value(low)?;
            validate_index_value(high)
        }
        ExprKind::Like { value, pattern, .. } => {
            validate_index_value(value)?;
            validate_index_value(pattern)
        }
        ExprKind::In { value, set, .. } => {
            validate_index_value(value)?;
            validate_index_value(set)
        }
        ExprKind::Logical { left, right, .. } => {
            validate_index_predicate(left)?;
            validate_index_predicate(right)
        }
        ExprKind::Paren(inner) => validate_index_predicate(inner),
        _ => validate_index_value(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_caches_by_normalized_source() {
        let a = compile("Name", None).unwrap();
        let b = compile("$.Name", None).unwrap();
        assert_eq!(a.source(), b.source());
    }

    #[test]
    fn compile_for_index_accepts_plain_paths() {
        assert!(compile_for_index("$.Name").is_ok());
        assert!(compile_for_index("$.Items[*].Sku").is_ok());
        assert!(compile_for_index("$.Items[$.Qty > 0].Sku").is_ok());
    }

    #[test]
    fn compile_for_index_rejects_parameters_calls_source_and_bare_operators() {
        assert!(compile_for_index("@0").is_err());
        assert!(compile_for_index("UPPER($.Name)").is_err());
        assert!(compile_for_index("*").is_err());
        assert!(compile_for_index("$.a = 1").is_err());
    }

    #[test]
    fn compile_for_index_accepts_document_and_array_initializers_of_paths() {
        assert!(compile_for_index("{ a: $.a, b: $.b }").is_ok());
        assert!(compile_for_index("[$.a, $.b]").is_ok());
    }

    #[test]
    fn compile_rejects_unknown_function_and_bad_arity() {
        assert!(compile("NOT_A_FN(1)", None).is_err());
        assert!(compile("UPPER(1, 2)", None).is_err());
        assert!(compile("ARRAY($.items)", None).is_ok());
    }

    #[test]
    fn execute_scalar_defaults_on_empty_sequence() {
        let expr = compile("$.missing", None).unwrap();
        assert_eq!(expr.execute_scalar(None, None, None), Value::Null);
    }

    #[test]
    fn compile_rejects_unterminated_expression() {
        assert!(compile("1 +", None).is_err());
    }
}
