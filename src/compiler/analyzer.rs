//! Static metadata synthesis over a parsed `Expr`.
//!
//! Each function here is a small recursive visitor. They are kept
//! separate (rather than one combined fold) because each has a
//! different recursion shape — `fields` must look inside `Filter`
//! path segments that `is_scalar` doesn't care about, `uses_source`
//! short-circuits on the first hit, and so on.

use super::functions;
use crate::ast::{Expr, ExprKind, PathRoot, PathSegment};
use indexmap::IndexMap;
use smol_str::SmolStr;

/// True iff the expression always yields at most one value. Literals,
/// parameters, document/array initializers and
/// call results are scalar; `*`, wildcard/filter paths, and `MAP`/
/// `FILTER` projections are sequences. Operator nodes (arithmetic,
/// comparison, logical) are scalar regardless of their operands.
pub fn is_scalar(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Double(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Array(_)
        | ExprKind::Document(_)
        | ExprKind::Parameter(_)
        | ExprKind::Call { .. }
        | ExprKind::Unary { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Compare { .. }
        | ExprKind::Between { .. }
        | ExprKind::Like { .. }
        | ExprKind::In { .. }
        | ExprKind::Logical { .. } => true,

        ExprKind::Source | ExprKind::Map { .. } | ExprKind::Filter { .. } => false,

        ExprKind::Path { segments, .. } => !segments
            .iter()
            .any(|s| matches!(s, PathSegment::Wildcard | PathSegment::Filter(_))),

        ExprKind::Paren(inner) => is_scalar(inner),
    }
}

/// True iff the expression's value cannot change across two evaluations
/// against the same document: literals, field paths, document/array
/// initializers over immutable children, and
/// calls to pure functions with immutable arguments.
///
/// `Parameter` is conservatively treated as mutable — the bound value
/// can differ per execution even though the expression text doesn't.
/// `Map`/`Filter` are immutable iff both their source and projection/
/// predicate are immutable; this isn't spelled out by name in the
/// point-3 list but follows the same "children determine the parent"
/// rule the list already applies to documents and arrays.
pub fn is_immutable(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Int(_) | ExprKind::Double(_) | ExprKind::Str(_) | ExprKind::Bool(_) | ExprKind::Null => true,

        ExprKind::Path { .. } => true,

        ExprKind::Parameter(_) | ExprKind::Source => false,

        ExprKind::Array(items) => items.iter().all(is_immutable),
        ExprKind::Document(fields) => fields.iter().all(|(_, v)| is_immutable(v)),

        ExprKind::Call { name, args } => {
            let args_immutable = args.iter().all(is_immutable);
            functions::is_call_immutable(name, args.len(), args_immutable)
        }

        ExprKind::Map { source, projection } => is_immutable(source) && is_immutable(projection),
        ExprKind::Filter { source, predicate } => is_immutable(source) && is_immutable(predicate),

        ExprKind::Unary { operand, .. } => is_immutable(operand),
        ExprKind::Binary { left, right, .. } => is_immutable(left) && is_immutable(right),
        ExprKind::Compare { left, right, .. } => is_immutable(left) && is_immutable(right),
        ExprKind::Between { value, low, high, .. } => {
            is_immutable(value) && is_immutable(low) && is_immutable(high)
        }
        ExprKind::Like { value, pattern, .. } => is_immutable(value) && is_immutable(pattern),
        ExprKind::In { value, set, .. } => is_immutable(value) && is_immutable(set),
        ExprKind::Logical { left, right, .. } => is_immutable(left) && is_immutable(right),

        ExprKind::Paren(inner) => is_immutable(inner),
    }
}

/// True iff `*` (the source sequence) appears anywhere in the subtree,
/// including inside a path segment's filter predicate.
pub fn uses_source(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Source => true,

        ExprKind::Int(_)
        | ExprKind::Double(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Parameter(_) => false,

        ExprKind::Array(items) => items.iter().any(uses_source),
        ExprKind::Document(fields) => fields.iter().any(|(_, v)| uses_source(v)),
        ExprKind::Call { args, .. } => args.iter().any(uses_source),

        ExprKind::Path { segments, .. } => segments.iter().any(|s| match s {
            PathSegment::Filter(pred) => uses_source(pred),
            _ => false,
        }),

        ExprKind::Map { source, projection } => uses_source(source) || uses_source(projection),
        ExprKind::Filter { source, predicate } => uses_source(source) || uses_source(predicate),

        ExprKind::Unary { operand, .. } => uses_source(operand),
        ExprKind::Binary { left, right, .. } => uses_source(left) || uses_source(right),
        ExprKind::Compare { left, right, .. } => uses_source(left) || uses_source(right),
        ExprKind::Between { value, low, high, .. } => {
            uses_source(value) || uses_source(low) || uses_source(high)
        }
        ExprKind::Like { value, pattern, .. } => uses_source(value) || uses_source(pattern),
        ExprKind::In { value, set, .. } => uses_source(value) || uses_source(set),
        ExprKind::Logical { left, right, .. } => uses_source(left) || uses_source(right),

        ExprKind::Paren(inner) => uses_source(inner),
    }
}

/// Collects the set of root field names the expression reads, in
/// first-seen order, deduplicated case-insensitively. For example,
/// `fields("Items[$.Root = 1].Type all = Age")` is `["Items", "Root",
/// "Age"]`.
///
/// Only `$`-rooted paths and bare `*` ever contribute a field — `@`
/// paths reference the value bound by an enclosing MAP/FILTER, not a
/// document field, and contribute nothing on their own. A path's filter
/// segment is still visited (it commonly holds its own `$`-rooted
/// comparisons), which is why this single rule needs no special casing
/// for MAP/FILTER nodes: their desugared `Path`/`Filter(..)` children
/// carry the real references.
pub fn fields(expr: &Expr) -> Vec<SmolStr> {
    let mut seen: IndexMap<String, SmolStr> = IndexMap::new();
    collect_fields(expr, &mut seen);
    seen.into_values().collect()
}

fn record_field(seen: &mut IndexMap<String, SmolStr>, name: &SmolStr) {
    let key = name.to_ascii_lowercase();
    seen.entry(key).or_insert_with(|| name.clone());
}

fn collect_fields(expr: &Expr, seen: &mut IndexMap<String, SmolStr>) {
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Double(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Parameter(_) => {}

        ExprKind::Source => record_field(seen, &SmolStr::new("$")),

        ExprKind::Array(items) => items.iter().for_each(|i| collect_fields(i, seen)),
        ExprKind::Document(fields) => fields.iter().for_each(|(_, v)| collect_fields(v, seen)),
        ExprKind::Call { args, .. } => args.iter().for_each(|a| collect_fields(a, seen)),

        ExprKind::Path { root, segments } => {
            if *root == PathRoot::Root {
                match segments.first() {
                    Some(PathSegment::Field(name)) => record_field(seen, name),
                    _ => record_field(seen, &SmolStr::new("$")),
                }
            }
            for segment in segments {
                if let PathSegment::Filter(pred) = segment {
                    collect_fields(pred, seen);
                }
            }
        }

        ExprKind::Map { source, projection } => {
            collect_fields(source, seen);
            collect_fields(projection, seen);
        }
        ExprKind::Filter { source, predicate } => {
            collect_fields(source, seen);
            collect_fields(predicate, seen);
        }

        ExprKind::Unary { operand, .. } => collect_fields(operand, seen),
        ExprKind::Binary { left, right, .. } => {
            collect_fields(left, seen);
            collect_fields(right, seen);
        }
        ExprKind::Compare { left, right, .. } => {
            collect_fields(left, seen);
            collect_fields(right, seen);
        }
        ExprKind::Between { value, low, high, .. } => {
            collect_fields(value, seen);
            collect_fields(low, seen);
            collect_fields(high, seen);
        }
        ExprKind::Like { value, pattern, .. } => {
            collect_fields(value, seen);
            collect_fields(pattern, seen);
        }
        ExprKind::In { value, set, .. } => {
            collect_fields(value, seen);
            collect_fields(set, seen);
        }
        ExprKind::Logical { left, right, .. } => {
            collect_fields(left, seen);
            collect_fields(right, seen);
        }

        ExprKind::Paren(inner) => collect_fields(inner, seen),
    }
}

/// The quantifier carried by the top-level node, if it is a quantifiable
/// predicate (`Compare`/`Between`/`Like`/`In`). Used to populate
/// `ExprNode::is_any`/`is_all`.
pub fn top_level_quantifier(expr: &Expr) -> Option<crate::ast::Quantifier> {
    match &expr.kind {
        ExprKind::Compare { quantifier, .. }
        | ExprKind::Between { quantifier, .. }
        | ExprKind::Like { quantifier, .. }
        | ExprKind::In { quantifier, .. } => Some(*quantifier),
        ExprKind::Paren(inner) => top_level_quantifier(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::expression::parse_expression;

    fn parse(source: &str) -> Expr {
        let tokens = tokenize(source).expect("lexer failure in test fixture");
        parse_expression(&tokens).expect("parser failure in test fixture")
    }

    #[test]
    fn wildcard_path_is_not_scalar() {
        assert!(!is_scalar(&parse("$.items[*]")));
        assert!(is_scalar(&parse("$.items")));
    }

    #[test]
    fn source_and_map_are_not_scalar() {
        assert!(!is_scalar(&parse("*")));
        assert!(!is_scalar(&parse("MAP($.items => @.id)")));
    }

    #[test]
    fn comparisons_are_always_scalar() {
        assert!(is_scalar(&parse("$.items[*] = 1")));
    }

    #[test]
    fn field_path_is_immutable_parameter_is_not() {
        assert!(is_immutable(&parse("$.name")));
        assert!(!is_immutable(&parse("@0")));
    }

    #[test]
    fn now_call_is_not_immutable() {
        assert!(!is_immutable(&parse("NOW()")));
        assert!(is_immutable(&parse("UPPER(\"a\")")));
    }

    #[test]
    fn uses_source_detects_bare_and_nested_source() {
        assert!(uses_source(&parse("*")));
        assert!(uses_source(&parse("COUNT(*)")));
        assert!(!uses_source(&parse("$.a + 1")));
    }

    #[test]
    fn fields_collects_from_filter_segment_and_outer_comparison() {
        let expr = parse("Items[$.Root = 1].Type all = Age");
        let collected: Vec<String> = fields(&expr).iter().map(|s| s.to_string()).collect();
        assert_eq!(collected, vec!["Items", "Root", "Age"]);
    }

    #[test]
    fn fields_on_wildcard_projection() {
        let expr = parse("$.Items[*].Type");
        let collected: Vec<String> = fields(&expr).iter().map(|s| s.to_string()).collect();
        assert_eq!(collected, vec!["Items"]);
    }

    #[test]
    fn fields_dedup_is_case_insensitive_and_keeps_first_seen_case() {
        let expr = parse("$.Name = \"a\" AND $.name = \"b\"");
        let collected: Vec<String> = fields(&expr).iter().map(|s| s.to_string()).collect();
        assert_eq!(collected, vec!["Name"]);
    }

    #[test]
    fn current_path_alone_contributes_nothing() {
        let expr = parse("MAP($.items => @.id)");
        let collected: Vec<String> = fields(&expr).iter().map(|s| s.to_string()).collect();
        assert_eq!(collected, vec!["items"]);
    }

    #[test]
    fn quantifier_is_read_from_top_level_node() {
        let expr = parse("$.items[*] any = 1");
        assert_eq!(top_level_quantifier(&expr), Some(crate::ast::Quantifier::Any));
        let expr = parse("$.items[*] all = 1");
        assert_eq!(top_level_quantifier(&expr), Some(crate::ast::Quantifier::All));
    }
}
