//! The query optimizer: the fixed nine-step sequence that turns a
//! [`Query`] plus an index [`Snapshot`] into a [`QueryPlan`].

use super::cost::{self, PredicateShape};
use super::index::{IndexDescriptor, Snapshot};
use super::plan::{IndexChoice, Order, Query, QueryPlan};
use crate::ast::{CompareOp, Expr, ExprKind, LogicalOp, Quantifier};
use crate::compiler::{analyzer, Expression};
use crate::error::Error;
use crate::value::Value;
use smol_str::SmolStr;
use std::collections::HashSet;

/// Runs the optimizer with no virtual (externally supplied) index.
pub fn optimize(query: &Query, snapshot: &dyn Snapshot) -> Result<QueryPlan, Error> {
    optimize_with_virtual_index(query, snapshot, None)
}

/// Runs the optimizer, optionally short-circuiting index selection with a
/// caller-supplied virtual index: when present it is used as-is, at cost
/// 0, instead of scoring candidate indexes.
pub fn optimize_with_virtual_index(
    query: &Query,
    snapshot: &dyn Snapshot,
    virtual_index: Option<IndexChoice>,
) -> Result<QueryPlan, Error> {
    if query.group_by.is_some() && (query.order_by.is_some() || !query.includes.is_empty()) {
        return Err(Error::invalid_expression_type(
            "GROUP BY cannot be combined with ORDER BY or with includes",
        ));
    }

    // Step 1 + 2: split conjuncts, then rewrite `seq ANY = scalar_path`.
    let terms = split_where(&query.r#where)?;
    let terms: Vec<Expression> = terms.into_iter().map(rewrite_any_term).collect();

    // Step 3: fields to deserialize.
    let fields = collect_fields(query, &terms);

    // Step 4: choose index.
    let indexes = snapshot.get_indexes();
    let (choice, index_cost, index_expression, consumed) =
        choose_index(&terms, query, &fields, &indexes, virtual_index);

    // Step 5: index-key-only.
    let is_index_key_only = fields.len() == 1 && format!("$.{}", fields[0]) == index_expression;

    // Step 6: populate filters (everything but the consumed term).
    let filters: Vec<Expression> = terms
        .iter()
        .filter(|term| consumed.as_ref().map_or(true, |consumed_term| !term.ptr_eq(consumed_term)))
        .cloned()
        .collect();

    // Step 7: order-by, collapsed into the index's own order when it matches.
    let order_by = query
        .order_by
        .clone()
        .filter(|order_expr| order_expr.source() != index_expression);

    // Step 8: group-by, with a synthetic ascending sort if the index
    // doesn't already produce group-by order.
    let order_by = if let Some(group_expr) = &query.group_by {
        if group_expr.source() == index_expression {
            order_by
        } else {
            Some(group_expr.clone())
        }
    } else {
        order_by
    };

    // Step 9: partition includes.
    let (include_before, include_after) = partition_includes(&query.includes, &filters, &order_by);

    Ok(QueryPlan {
        collection: snapshot.collection_name().to_string(),
        index: choice,
        index_cost,
        index_expression,
        is_index_key_only,
        filters,
        fields,
        include_before,
        include_after,
        order_by,
        group_by: query.group_by.clone(),
        select: query.select.clone(),
        limit: query.limit,
        offset: query.offset,
        for_update: query.for_update,
    })
}

/// Step 1: walks each where-expression, recursing through top-level `AND`
/// nodes and collecting the leaves as independent terms. Rejects a `*`
/// anywhere in a term, and rejects a leaf that is neither a predicate nor
/// an `OR` of predicates.
fn split_where(where_terms: &[Expression]) -> Result<Vec<Expression>, Error> {
    let mut terms = Vec::new();
    for expr in where_terms {
        split_term(expr.clone(), &mut terms)?;
    }
    Ok(terms)
}

fn split_term(expr: Expression, out: &mut Vec<Expression>) -> Result<(), Error> {
    if let ExprKind::Logical { op: LogicalOp::And, left, right } = &expr.node().expr.kind {
        let left = Expression::from_expr((**left).clone());
        let right = Expression::from_expr((**right).clone());
        split_term(left, out)?;
        return split_term(right, out);
    }
    if expr.uses_source() {
        return Err(Error::invalid_expression_type(format!(
            "'*' is not allowed in a WHERE term: {}",
            expr.source()
        )));
    }
    if !expr.is_predicate() {
        return Err(Error::invalid_expression_type(format!(
            "'{}' is not a valid WHERE term",
            expr.source()
        )));
    }
    out.push(expr);
    Ok(())
}

/// Step 2: `seq ANY = scalar_path` becomes `scalar_path IN ARRAY(seq)`.
fn rewrite_any_term(term: Expression) -> Expression {
    let ExprKind::Compare { op: CompareOp::Equal, quantifier: Quantifier::Any, left, right } =
        &term.node().expr.kind
    else {
        return term;
    };
    if analyzer::is_scalar(left) || !matches!(right.kind, ExprKind::Path { .. }) || !analyzer::is_scalar(right) {
        return term;
    }
    let span = term.node().expr.span.clone();
    let rewritten = Expr::new(
        ExprKind::In {
            quantifier: Quantifier::Any,
            value: right.clone(),
            set: Box::new(Expr::new(
                ExprKind::Call { name: SmolStr::new("ARRAY"), args: vec![(**left).clone()] },
                span.clone(),
            )),
        },
        span,
    );
    Expression::from_expr(rewritten)
}

/// Step 3: unions the `fields` of `select`, every term, every include,
/// `group_by`, `having`, and `order_by`; clears the set entirely if it
/// contains `"$"`, meaning the whole document is needed.
fn collect_fields(query: &Query, terms: &[Expression]) -> Vec<SmolStr> {
    let mut fields: Vec<SmolStr> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    merge_fields(&query.select, &mut fields, &mut seen);
    for term in terms {
        merge_fields(term, &mut fields, &mut seen);
    }
    for include in &query.includes {
        merge_fields(include, &mut fields, &mut seen);
    }
    for extra in [&query.group_by, &query.having, &query.order_by].into_iter().flatten() {
        merge_fields(extra, &mut fields, &mut seen);
    }

    if seen.contains("$") {
        return Vec::new();
    }
    fields
}

fn merge_fields(expr: &Expression, fields: &mut Vec<SmolStr>, seen: &mut HashSet<String>) {
    for field in expr.fields() {
        if seen.insert(field.to_ascii_lowercase()) {
            fields.push(field.clone());
        }
    }
}

/// Step 4: chooses the access path. Returns the choice, its cost, the
/// normalized source of the expression it keys by, and (when a where-term
/// was consumed) that term so step 6 can exclude it from `filters`.
fn choose_index(
    terms: &[Expression],
    query: &Query,
    fields: &[SmolStr],
    indexes: &[IndexDescriptor],
    virtual_index: Option<IndexChoice>,
) -> (IndexChoice, u64, String, Option<Expression>) {
    if let Some(choice) = virtual_index {
        return (choice, 0, String::new(), None);
    }

    let mut best: Option<(Expression, IndexChoice, u64, String)> = None;
    for term in terms {
        if term.is_all() {
            continue;
        }
        let Some((choice, shape, index)) = candidate_for_term(term, indexes) else {
            continue;
        };
        let candidate_cost = cost::estimate(&shape, index);
        if best.as_ref().map_or(true, |(_, _, best_cost, _)| candidate_cost < *best_cost) {
            best = Some((term.clone(), choice, candidate_cost, index.expression.source().to_string()));
        }
    }
    if let Some((term, choice, cost, expr)) = best {
        return (choice, cost, expr, Some(term));
    }

    let preferred = (fields.len() == 1).then(|| format!("$.{}", fields[0]));
    for hint in [
        query.group_by.as_ref().map(|e| e.source().to_string()),
        query.order_by.as_ref().map(|e| e.source().to_string()),
        preferred,
    ]
    .into_iter()
    .flatten()
    {
        if let Some(index) = indexes.iter().find(|idx| idx.expression.source() == hint) {
            return (
                IndexChoice::All { field: index.name.clone(), order: query.order },
                index.key_count.max(1),
                index.expression.source().to_string(),
                None,
            );
        }
    }

    let id_cost = indexes.iter().find(|idx| idx.name == "_id").map_or(1, |idx| idx.key_count.max(1));
    (IndexChoice::All { field: "_id".to_string(), order: Order::Ascending }, id_cost, "$._id".to_string(), None)
}

/// Inspects one where-term's AST shape and matches it against `indexes`,
/// returning the access path it would produce if chosen.
fn candidate_for_term<'a>(
    term: &Expression,
    indexes: &'a [IndexDescriptor],
) -> Option<(IndexChoice, PredicateShape, &'a IndexDescriptor)> {
    match &term.node().expr.kind {
        ExprKind::Compare { op, quantifier, left, right } => {
            let (path_expr, value_expr, path_is_left) = side_roles(left, right)?;
            if !analyzer::is_scalar(path_expr) && matches!(quantifier, Quantifier::All) {
                return None;
            }
            let index = find_index(path_expr, indexes)?;
            match op {
                CompareOp::NotEqual => None,
                CompareOp::Equal => {
                    let value = literal_value(value_expr);
                    Some((IndexChoice::Equals { index: index.name.clone(), value }, PredicateShape::Equal, index))
                }
                CompareOp::Greater | CompareOp::GreaterOrEqual | CompareOp::Less | CompareOp::LessOrEqual => {
                    let value = literal_value(value_expr);
                    let inclusive = matches!(op, CompareOp::GreaterOrEqual | CompareOp::LessOrEqual);
                    let is_lower_bound = matches!(op, CompareOp::Greater | CompareOp::GreaterOrEqual) == path_is_left;
                    let (low, low_inclusive, high, high_inclusive) = if is_lower_bound {
                        (value, inclusive, Value::MaxValue, true)
                    } else {
                        (Value::MinValue, true, value, inclusive)
                    };
                    Some((
                        IndexChoice::Range { index: index.name.clone(), low, high, low_inclusive, high_inclusive },
                        PredicateShape::GreaterOrLess,
                        index,
                    ))
                }
            }
        }
        ExprKind::Between { quantifier, value, low, high } => {
            if !analyzer::is_scalar(value) && matches!(quantifier, Quantifier::All) {
                return None;
            }
            let index = find_index(value, indexes)?;
            Some((
                IndexChoice::Range {
                    index: index.name.clone(),
                    low: literal_value(low),
                    high: literal_value(high),
                    low_inclusive: true,
                    high_inclusive: true,
                },
                PredicateShape::Between,
                index,
            ))
        }
        ExprKind::In { quantifier, value, set } => {
            if !analyzer::is_scalar(value) && matches!(quantifier, Quantifier::All) {
                return None;
            }
            let index = find_index(value, indexes)?;
            let values = match literal_value(set) {
                Value::Array(items) => items,
                other => vec![other],
            };
            let key_count = values.len();
            Some((IndexChoice::Scan { index: index.name.clone(), values }, PredicateShape::In { key_count }, index))
        }
        ExprKind::Like { quantifier, value, pattern } => {
            if !analyzer::is_scalar(value) && matches!(quantifier, Quantifier::All) {
                return None;
            }
            let index = find_index(value, indexes)?;
            let Value::String(pattern_str) = literal_value(pattern) else {
                return None;
            };
            let prefix = prefix_of_pattern(&pattern_str)?;
            Some((
                IndexChoice::Range {
                    index: index.name.clone(),
                    low: Value::String(prefix.clone()),
                    high: Value::String(prefix),
                    low_inclusive: true,
                    high_inclusive: true,
                },
                PredicateShape::LikePrefix,
                index,
            ))
        }
        _ => None,
    }
}

/// Splits a comparison's two sides into "the side that could match an
/// index" (no document fields referenced other than through the path
/// itself is implied by it having *some* fields) and "the side that's a
/// plain value" (no field dependency at all — a literal or a parameter).
/// Returns `None` when both or neither side looks like a value, since
/// then there is nothing here an index could key on.
fn side_roles(left: &Expr, right: &Expr) -> Option<(&Expr, &Expr, bool)> {
    let left_is_value = analyzer::fields(left).is_empty() && !analyzer::uses_source(left);
    let right_is_value = analyzer::fields(right).is_empty() && !analyzer::uses_source(right);
    match (left_is_value, right_is_value) {
        (true, false) => Some((right, left, false)),
        (false, true) => Some((left, right, true)),
        _ => None,
    }
}

fn find_index<'a>(path_expr: &Expr, indexes: &'a [IndexDescriptor]) -> Option<&'a IndexDescriptor> {
    let normalized = crate::compiler::normalize::normalize(path_expr);
    indexes.iter().find(|idx| idx.expression.source() == normalized)
}

fn literal_value(expr: &Expr) -> Value {
    Expression::from_expr(expr.clone()).execute_scalar(None, None, None)
}

/// A `LIKE` pattern is a prefix-scan candidate iff it has no `_` wildcard
/// and at most one `%`, trailing. Anything else is a non-prefix pattern
/// and is priced as a full scan (rejected as an index candidate).
fn prefix_of_pattern(pattern: &str) -> Option<SmolStr> {
    if pattern.contains('_') {
        return None;
    }
    match pattern.find('%') {
        None => Some(SmolStr::new(pattern)),
        Some(pos) if pos == pattern.len() - 1 => Some(SmolStr::new(&pattern[..pos])),
        _ => None,
    }
}

/// Step 9: an include is needed before filtering iff its field appears in
/// a remaining filter or in `order_by`; it's needed after iff it's not
/// needed before, or it is but `order_by` is also present (the pre-sort
/// collapses the hydrated document).
fn partition_includes(
    includes: &[Expression],
    filters: &[Expression],
    order_by: &Option<Expression>,
) -> (Vec<Expression>, Vec<Expression>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    for include in includes {
        let field = include.fields().first().cloned();
        let needed_before = field.as_ref().is_some_and(|f| {
            filters.iter().any(|filter| filter.fields().iter().any(|other| other.eq_ignore_ascii_case(f)))
                || order_by.as_ref().is_some_and(|o| o.fields().iter().any(|other| other.eq_ignore_ascii_case(f)))
        });
        if needed_before {
            before.push(include.clone());
            if order_by.is_some() {
                after.push(include.clone());
            }
        } else {
            after.push(include.clone());
        }
    }
    (before, after)
}
