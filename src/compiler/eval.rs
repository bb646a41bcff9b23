//! The evaluator: runs a parsed `Expr` against a document.
//!
//! This crate evaluates by direct AST interpretation — a recursive `eval`
//! match over `ExprKind`, closing over the ambient context (source
//! sequence, root document, current value, collation, parameters) rather
//! than compiling to bytecode. Direct interpretation keeps this pipeline
//! free of a bytecode layer it would otherwise have to own end to end.

use crate::ast::{BinaryOp, CompareOp, Expr, ExprKind, LogicalOp, PathRoot, PathSegment, Quantifier, UnaryOp};
use crate::value::collation::Collation;
use crate::value::numeric::{as_decimal, as_f64, as_i64, int_literal, rank};
use crate::value::{Document, ObjectId, Value};
use smol_str::SmolStr;
use std::cmp::Ordering;

/// The ambient context threaded through every `eval` call: the source
/// sequence, root document, current value, collation, and parameters,
/// bundled so recursive calls don't have to repeat a five-argument
/// signature.
#[derive(Clone, Copy)]
pub struct EvalCtx<'a> {
    pub source_seq: &'a [Value],
    pub root: &'a Value,
    pub current: &'a Value,
    pub collation: &'a dyn Collation,
    pub parameters: &'a Document,
}

impl<'a> EvalCtx<'a> {
    pub fn with_current(&self, current: &'a Value) -> EvalCtx<'a> {
        EvalCtx { current, ..*self }
    }
}

/// Evaluates `expr` under `ctx`, returning a finite sequence of values.
/// Scalar nodes always return a one-element vector.
pub fn evaluate(expr: &Expr, ctx: EvalCtx<'_>) -> Vec<Value> {
    match &expr.kind {
        ExprKind::Int(n) => vec![int_literal(*n)],
        ExprKind::Double(d) => vec![Value::Double(*d)],
        ExprKind::Str(s) => vec![Value::String(s.clone())],
        ExprKind::Bool(b) => vec![Value::Boolean(*b)],
        ExprKind::Null => vec![Value::Null],

        ExprKind::Array(items) => {
            let values = items.iter().map(|e| scalar(evaluate(e, ctx))).collect();
            vec![Value::Array(values)]
        }
        ExprKind::Document(fields) => {
            let mut doc = Document::new();
            for (key, value) in fields {
                let _ = doc.insert(key.clone(), scalar(evaluate(value, ctx)));
            }
            vec![Value::Document(doc)]
        }

        ExprKind::Parameter(name) => vec![resolve_parameter(name, ctx.parameters)],

        ExprKind::Call { name, args } => vec![eval_call(name, args, ctx)],

        ExprKind::Path { root, segments } => eval_path(*root, segments, ctx),
        ExprKind::Source => ctx.source_seq.to_vec(),

        ExprKind::Map { source, projection } => {
            let sources = evaluate(source, ctx);
            sources
                .iter()
                .flat_map(|element| evaluate(projection, ctx.with_current(element)))
                .collect()
        }
        ExprKind::Filter { source, predicate } => {
            let sources = evaluate(source, ctx);
            sources
                .into_iter()
                .filter(|element| {
                    evaluate(predicate, ctx.with_current(element))
                        .first()
                        .is_some_and(Value::is_truthy)
                })
                .collect()
        }

        ExprKind::Unary { op, operand } => vec![eval_unary(*op, scalar(evaluate(operand, ctx)))],
        ExprKind::Binary { op, left, right } => {
            vec![eval_binary(*op, scalar(evaluate(left, ctx)), scalar(evaluate(right, ctx)))]
        }

        ExprKind::Compare { op, quantifier, left, right } => {
            let lefts = evaluate(left, ctx);
            let right_value = scalar(evaluate(right, ctx));
            vec![eval_quantified(*quantifier, &lefts, |v| {
                compare_op(*op, v, &right_value, ctx.collation)
            })]
        }
        ExprKind::Between { quantifier, value, low, high } => {
            let values = evaluate(value, ctx);
            let low = scalar(evaluate(low, ctx));
            let high = scalar(evaluate(high, ctx));
            vec![eval_quantified(*quantifier, &values, |v| {
                let order = crate::value::ordering::compare;
                order(v, &low, ctx.collation) != Ordering::Less
                    && order(v, &high, ctx.collation) != Ordering::Greater
            })]
        }
        ExprKind::Like { quantifier, value, pattern } => {
            let values = evaluate(value, ctx);
            let pattern = scalar(evaluate(pattern, ctx));
            vec![eval_quantified(*quantifier, &values, |v| like_match(v, &pattern, ctx.collation))]
        }
        ExprKind::In { quantifier, value, set } => {
            let values = evaluate(value, ctx);
            let members = match scalar(evaluate(set, ctx)) {
                Value::Array(items) => items,
                other => vec![other],
            };
            vec![eval_quantified(*quantifier, &values, |v| {
                members.iter().any(|m| crate::value::ordering::equals(v, m, ctx.collation))
            })]
        }
        ExprKind::Logical { op, left, right } => {
            let l = scalar(evaluate(left, ctx));
            let r = scalar(evaluate(right, ctx));
            vec![eval_logical(*op, &l, &r)]
        }

        ExprKind::Paren(inner) => evaluate(inner, ctx),
    }
}

/// Collapses a scalar evaluation result to its single value, or `Null` if
/// the (scalar-context) expression happened to yield no elements.
fn scalar(mut values: Vec<Value>) -> Value {
    if values.is_empty() { Value::Null } else { values.swap_remove(0) }
}

/// `ANY` (default): true iff some element satisfies `test`; `ALL`: true
/// iff every element does (vacuously true on an empty sequence).
fn eval_quantified(quantifier: Quantifier, values: &[Value], test: impl Fn(&Value) -> bool) -> Value {
    let result = match quantifier {
        Quantifier::Any => values.iter().any(&test),
        Quantifier::All => values.iter().all(&test),
    };
    Value::Boolean(result)
}

fn compare_op(op: CompareOp, a: &Value, b: &Value, collation: &dyn Collation) -> bool {
    let order = crate::value::ordering::compare(a, b, collation);
    match op {
        CompareOp::Equal => order == Ordering::Equal,
        CompareOp::NotEqual => order != Ordering::Equal,
        CompareOp::Greater => order == Ordering::Greater,
        CompareOp::GreaterOrEqual => order != Ordering::Less,
        CompareOp::Less => order == Ordering::Less,
        CompareOp::LessOrEqual => order != Ordering::Greater,
    }
}

fn eval_logical(op: LogicalOp, left: &Value, right: &Value) -> Value {
    let l = as_bool(left);
    let r = as_bool(right);
    match op {
        LogicalOp::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Null,
        },
        LogicalOp::Or => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        },
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        _ => None,
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> Value {
    if !value.is_numeric() {
        return Value::Null;
    }
    match op {
        UnaryOp::Plus => value,
        UnaryOp::Minus => match value {
            Value::Int32(n) => Value::Int32(-n),
            Value::Int64(n) => Value::Int64(-n),
            Value::Double(n) => Value::Double(-n),
            Value::Decimal(d) => Value::Decimal(-d),
            other => other,
        },
    }
}

/// Arithmetic: `+` concatenates strings; otherwise numeric widening
/// `Int32 -> Int64 -> Double -> Decimal`; `Null` or a non-numeric operand
/// (other than the string-concat case) yields `Null`.
fn eval_binary(op: BinaryOp, a: Value, b: Value) -> Value {
    if op == BinaryOp::Add {
        if let (Value::String(x), Value::String(y)) = (&a, &b) {
            return Value::String(SmolStr::new(format!("{x}{y}")));
        }
    }
    if !a.is_numeric() || !b.is_numeric() {
        return Value::Null;
    }
    if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && as_f64(&b) == 0.0 {
        return Value::Null;
    }
    match rank(&a).max(rank(&b)) {
        3 => {
            let (x, y) = (as_decimal(&a), as_decimal(&b));
            match (x, y) {
                (Some(x), Some(y)) => apply_decimal(op, x, y),
                _ => Value::Null,
            }
        }
        2 => apply_f64(op, as_f64(&a), as_f64(&b)),
        1 => Value::Int64(apply_i64(op, as_i64(&a), as_i64(&b))),
        _ => int_literal(apply_i64(op, as_i64(&a), as_i64(&b))),
    }
}

fn apply_i64(op: BinaryOp, a: i64, b: i64) -> i64 {
    match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Subtract => a.wrapping_sub(b),
        BinaryOp::Multiply => a.wrapping_mul(b),
        BinaryOp::Divide => a / b,
        BinaryOp::Modulo => a % b,
    }
}

fn apply_f64(op: BinaryOp, a: f64, b: f64) -> Value {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Modulo => a % b,
    };
    Value::Double(result)
}

fn apply_decimal(op: BinaryOp, a: rust_decimal::Decimal, b: rust_decimal::Decimal) -> Value {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Modulo => a % b,
    };
    Value::Decimal(result)
}

/// `%` matches any run (including empty), `_` matches exactly one
/// character, applied under the collation.
fn like_match(value: &Value, pattern: &Value, collation: &dyn Collation) -> bool {
    let (Value::String(text), Value::String(pattern)) = (value, pattern) else {
        return false;
    };
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    like_rec(&t, &p, collation)
}

fn like_rec(t: &[char], p: &[char], collation: &dyn Collation) -> bool {
    match p.first() {
        None => t.is_empty(),
        Some('%') => (0..=t.len()).any(|i| like_rec(&t[i..], &p[1..], collation)),
        Some('_') => !t.is_empty() && like_rec(&t[1..], &p[1..], collation),
        Some(ch) => {
            !t.is_empty() && collation.equals(&t[0].to_string(), &ch.to_string()) && like_rec(&t[1..], &p[1..], collation)
        }
    }
}

/// Navigates a `$`/`@`-rooted path. Scalar paths (no `[*]`/`[predicate]`
/// segment anywhere) yield `Null` on a missing segment; sequence paths
/// skip it instead, contributing no element.
fn eval_path(root: PathRoot, segments: &[PathSegment], ctx: EvalCtx<'_>) -> Vec<Value> {
    let scalar_mode = !segments
        .iter()
        .any(|s| matches!(s, PathSegment::Wildcard | PathSegment::Filter(_)));

    let start = match root {
        PathRoot::Root => ctx.root.clone(),
        PathRoot::Current => ctx.current.clone(),
    };
    let mut frontier = vec![start];

    for segment in segments {
        let mut next = Vec::new();
        for value in &frontier {
            match segment {
                PathSegment::Field(name) => match value {
                    Value::Document(doc) => match doc.get(name) {
                        Some(v) => next.push(v.clone()),
                        None if scalar_mode => next.push(Value::Null),
                        None => {}
                    },
                    _ if scalar_mode => next.push(Value::Null),
                    _ => {}
                },
                PathSegment::Index(i) => {
                    let found = match value {
                        Value::Array(items) if *i >= 0 => items.get(*i as usize).cloned(),
                        _ => None,
                    };
                    match found {
                        Some(v) => next.push(v),
                        None if scalar_mode => next.push(Value::Null),
                        None => {}
                    }
                }
                PathSegment::Wildcard => {
                    if let Value::Array(items) = value {
                        next.extend(items.iter().cloned());
                    }
                }
                PathSegment::Filter(predicate) => {
                    if let Value::Array(items) = value {
                        for element in items {
                            let element_ctx = ctx.with_current(element);
                            if evaluate(predicate, element_ctx).first().is_some_and(Value::is_truthy) {
                                next.push(element.clone());
                            }
                        }
                    }
                }
            }
        }
        frontier = next;
    }

    if scalar_mode && frontier.is_empty() {
        frontier.push(Value::Null);
    }
    frontier
}

/// `@i` resolves positionally to the `i`-th key of `parameters`; `@name`
/// resolves by key.
fn resolve_parameter(name: &str, parameters: &Document) -> Value {
    if let Ok(index) = name.parse::<usize>() {
        return parameters.iter().nth(index).map(|(_, v)| v.clone()).unwrap_or(Value::Null);
    }
    parameters.get(name).cloned().unwrap_or(Value::Null)
}

fn eval_call(name: &str, args: &[Expr], ctx: EvalCtx<'_>) -> Value {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "UPPER" => as_string(&scalar(evaluate(&args[0], ctx))).map(|s| Value::String(SmolStr::new(s.to_uppercase()))).unwrap_or(Value::Null),
        "LOWER" => as_string(&scalar(evaluate(&args[0], ctx))).map(|s| Value::String(SmolStr::new(s.to_lowercase()))).unwrap_or(Value::Null),
        "LENGTH" => call_length(&scalar(evaluate(&args[0], ctx))),
        "SUBSTRING" => call_substring(args, ctx),
        "ABS" => call_unary_numeric(&scalar(evaluate(&args[0], ctx)), f64::abs, |d| d.abs()),
        "CEILING" => call_unary_numeric(&scalar(evaluate(&args[0], ctx)), f64::ceil, |d| d.ceil()),
        "FLOOR" => call_unary_numeric(&scalar(evaluate(&args[0], ctx)), f64::floor, |d| d.floor()),
        "ROUND" => call_round(args, ctx),
        "GUID" => call_guid(args, ctx),
        "OBJECTID" => Value::ObjectId(ObjectId::new()),
        "NOW" => Value::DateTime(chrono::Utc::now()),
        "TODAY" => Value::DateTime(chrono::Utc::now().date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc()),
        "DATETIME" => call_datetime(args, ctx),
        "COUNT" => Value::Int64(evaluate(&args[0], ctx).len() as i64),
        "ANY" => Value::Boolean(!evaluate(&args[0], ctx).is_empty()),
        "SUM" => call_reduce(args, ctx, Value::Int32(0), |acc, v| eval_binary(BinaryOp::Add, acc, v)),
        "MIN" => call_fold_compare(args, ctx, Ordering::Less),
        "MAX" => call_fold_compare(args, ctx, Ordering::Greater),
        "AVG" => call_avg(args, ctx),
        "ARRAY" => Value::Array(evaluate(&args[0], ctx)),
        _ => Value::Null,
    }
}

fn as_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }
}

fn call_length(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::Int32(s.chars().count() as i32),
        Value::Array(items) => Value::Int32(items.len() as i32),
        Value::Document(doc) => Value::Int32(doc.len() as i32),
        Value::Null => Value::Int32(0),
        _ => Value::Null,
    }
}

fn call_substring(args: &[Expr], ctx: EvalCtx<'_>) -> Value {
    let Some(text) = as_string(&scalar(evaluate(&args[0], ctx))).map(str::to_string) else {
        return Value::Null;
    };
    let chars: Vec<char> = text.chars().collect();
    let start = as_i64(&scalar(evaluate(&args[1], ctx))).max(0) as usize;
    let len = args
        .get(2)
        .map(|e| as_i64(&scalar(evaluate(e, ctx))).max(0) as usize)
        .unwrap_or(chars.len().saturating_sub(start));
    if start >= chars.len() {
        return Value::String(SmolStr::new(""));
    }
    let end = (start + len).min(chars.len());
    Value::String(SmolStr::new(chars[start..end].iter().collect::<String>()))
}

fn call_unary_numeric(value: &Value, on_f64: impl Fn(f64) -> f64, on_decimal: impl Fn(rust_decimal::Decimal) -> rust_decimal::Decimal) -> Value {
    if !value.is_numeric() {
        return Value::Null;
    }
    match value {
        Value::Decimal(d) => Value::Decimal(on_decimal(*d)),
        Value::Double(d) => Value::Double(on_f64(*d)),
        other => other.clone(),
    }
}

fn call_round(args: &[Expr], ctx: EvalCtx<'_>) -> Value {
    let value = scalar(evaluate(&args[0], ctx));
    if !value.is_numeric() {
        return Value::Null;
    }
    let digits = args.get(1).map(|e| as_i64(&scalar(evaluate(e, ctx)))).unwrap_or(0).max(0) as u32;
    match value {
        Value::Decimal(d) => Value::Decimal(d.round_dp(digits)),
        Value::Double(d) => {
            let factor = 10f64.powi(digits as i32);
            Value::Double((d * factor).round() / factor)
        }
        other => other,
    }
}

fn call_guid(args: &[Expr], ctx: EvalCtx<'_>) -> Value {
    match args.first() {
        None => Value::Guid(uuid::Uuid::new_v4()),
        Some(arg) => match as_string(&scalar(evaluate(arg, ctx))) {
            Some(text) => uuid::Uuid::parse_str(text).map(Value::Guid).unwrap_or(Value::Null),
            None => Value::Null,
        },
    }
}

fn call_datetime(args: &[Expr], ctx: EvalCtx<'_>) -> Value {
    if args.len() == 1 {
        let Some(text) = as_string(&scalar(evaluate(&args[0], ctx))).map(str::to_string) else {
            return Value::Null;
        };
        return chrono::DateTime::parse_from_rfc3339(&text)
            .map(|dt| Value::DateTime(dt.with_timezone(&chrono::Utc)))
            .unwrap_or(Value::Null);
    }
    if args.len() >= 3 {
        let y = as_i64(&scalar(evaluate(&args[0], ctx))) as i32;
        let m = as_i64(&scalar(evaluate(&args[1], ctx))) as u32;
        let d = as_i64(&scalar(evaluate(&args[2], ctx))) as u32;
        let hh = args.get(3).map(|e| as_i64(&scalar(evaluate(e, ctx)))).unwrap_or(0) as u32;
        let mm = args.get(4).map(|e| as_i64(&scalar(evaluate(e, ctx)))).unwrap_or(0) as u32;
        let ss = args.get(5).map(|e| as_i64(&scalar(evaluate(e, ctx)))).unwrap_or(0) as u32;
        let date = chrono::NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(hh, mm, ss));
        return date.map(|dt| Value::DateTime(dt.and_utc())).unwrap_or(Value::Null);
    }
    Value::DateTime(chrono::Utc::now())
}

fn call_reduce(args: &[Expr], ctx: EvalCtx<'_>, init: Value, fold: impl Fn(Value, Value) -> Value) -> Value {
    let seq = evaluate(&args[0], ctx);
    seq.into_iter().fold(init, fold)
}

fn call_fold_compare(args: &[Expr], ctx: EvalCtx<'_>, want: Ordering) -> Value {
    let seq = evaluate(&args[0], ctx);
    let mut best: Option<Value> = None;
    for value in seq {
        best = Some(match best {
            None => value,
            Some(current) => {
                if crate::value::ordering::compare(&value, &current, ctx.collation) == want {
                    value
                } else {
                    current
                }
            }
        });
    }
    best.unwrap_or(Value::Null)
}

fn call_avg(args: &[Expr], ctx: EvalCtx<'_>) -> Value {
    let seq = evaluate(&args[0], ctx);
    let numeric: Vec<&Value> = seq.iter().filter(|v| v.is_numeric()).collect();
    if numeric.is_empty() {
        return Value::Null;
    }
    let sum: f64 = numeric.iter().map(|v| as_f64(v)).sum();
    Value::Double(sum / numeric.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::expression::parse_expression;
    use crate::value::collation::InvariantCollation;

    fn eval_source(source: &str, root: &Value, parameters: &Document) -> Value {
        let tokens = tokenize(source).expect("lexer failure in test fixture");
        let expr = parse_expression(&tokens).expect("parser failure in test fixture");
        let collation = InvariantCollation;
        let ctx = EvalCtx {
            source_seq: &[],
            root,
            current: root,
            collation: &collation,
            parameters,
        };
        scalar(evaluate(&expr, ctx))
    }

    fn doc_root() -> Value {
        let mut doc = Document::new();
        doc.insert("name", Value::from("ada")).unwrap();
        doc.insert("age", Value::Int64(36)).unwrap();
        let mut items = Vec::new();
        let mut item = Document::new();
        item.insert("price", Value::Int64(5)).unwrap();
        items.push(Value::Document(item));
        let mut item2 = Document::new();
        item2.insert("price", Value::Int64(9)).unwrap();
        items.push(Value::Document(item2));
        doc.insert("items", Value::Array(items)).unwrap();
        Value::Document(doc)
    }

    #[test]
    fn array_literal_evaluates_to_array_value() {
        let value = eval_source("[1,2]", &Value::Null, &Document::new());
        assert_eq!(value, Value::Array(vec![Value::Int32(1), Value::Int32(2)]));
    }

    #[test]
    fn arithmetic_widens_and_propagates_null() {
        assert_eq!(eval_source("1 + 1", &Value::Null, &Document::new()), Value::Int32(2));
        assert_eq!(eval_source("1 + NULL", &Value::Null, &Document::new()), Value::Null);
        assert_eq!(eval_source("\"a\" + \"b\"", &Value::Null, &Document::new()), Value::from("ab"));
    }

    #[test]
    fn missing_scalar_path_yields_null() {
        assert_eq!(eval_source("$.missing", &doc_root(), &Document::new()), Value::Null);
    }

    #[test]
    fn wildcard_projection_yields_sequence() {
        let tokens = tokenize("$.items[*].price").unwrap();
        let expr = parse_expression(&tokens).unwrap();
        let collation = InvariantCollation;
        let root = doc_root();
        let params = Document::new();
        let ctx = EvalCtx { source_seq: &[], root: &root, current: &root, collation: &collation, parameters: &params };
        let values = evaluate(&expr, ctx);
        assert_eq!(values, vec![Value::Int64(5), Value::Int64(9)]);
    }

    #[test]
    fn quantified_any_over_sequence() {
        assert_eq!(
            eval_source("$.items[*].price any = 9", &doc_root(), &Document::new()),
            Value::Boolean(true)
        );
        assert_eq!(
            eval_source("$.items[*].price all = 9", &doc_root(), &Document::new()),
            Value::Boolean(false)
        );
    }

    #[test]
    fn like_percent_and_underscore() {
        assert_eq!(eval_source("\"hello\" LIKE \"h%o\"", &Value::Null, &Document::new()), Value::Boolean(true));
        assert_eq!(eval_source("\"hello\" LIKE \"h_llo\"", &Value::Null, &Document::new()), Value::Boolean(true));
        assert_eq!(eval_source("\"hello\" LIKE \"he_o\"", &Value::Null, &Document::new()), Value::Boolean(false));
    }

    #[test]
    fn in_membership_under_collation() {
        assert_eq!(eval_source("2 IN [1,2,3]", &Value::Null, &Document::new()), Value::Boolean(true));
        assert_eq!(eval_source("5 IN [1,2,3]", &Value::Null, &Document::new()), Value::Boolean(false));
    }

    #[test]
    fn parameter_resolves_positionally_and_by_name() {
        let mut params = Document::new();
        params.insert("a", Value::Int64(1)).unwrap();
        params.insert("b", Value::Int64(2)).unwrap();
        assert_eq!(eval_source("@0", &Value::Null, &params), Value::Int64(1));
        assert_eq!(eval_source("@b", &Value::Null, &params), Value::Int64(2));
    }

    #[test]
    fn count_and_sum_over_sequence() {
        assert_eq!(eval_source("COUNT($.items[*].price)", &doc_root(), &Document::new()), Value::Int64(2));
        assert_eq!(eval_source("SUM($.items[*].price)", &doc_root(), &Document::new()), Value::Int64(14));
    }

    #[test]
    fn now_and_guid_are_non_deterministic_but_well_typed() {
        assert!(matches!(eval_source("NOW()", &Value::Null, &Document::new()), Value::DateTime(_)));
        assert!(matches!(eval_source("GUID()", &Value::Null, &Document::new()), Value::Guid(_)));
    }

    #[test]
    fn between_is_inclusive() {
        assert_eq!(eval_source("5 BETWEEN 1 AND 5", &Value::Null, &Document::new()), Value::Boolean(true));
        assert_eq!(eval_source("6 BETWEEN 1 AND 5", &Value::Null, &Document::new()), Value::Boolean(false));
    }

    #[test]
    fn logical_and_or_short_circuit_on_known_value() {
        assert_eq!(eval_source("FALSE AND NULL", &Value::Null, &Document::new()), Value::Boolean(false));
        assert_eq!(eval_source("TRUE OR NULL", &Value::Null, &Document::new()), Value::Boolean(true));
    }

    #[test]
    fn divide_and_modulo_by_zero_yield_null_for_integers() {
        assert_eq!(eval_source("5 / 0", &Value::Null, &Document::new()), Value::Null);
        assert_eq!(eval_source("5 % 0", &Value::Null, &Document::new()), Value::Null);
    }

    #[test]
    fn divide_and_modulo_by_zero_yield_null_for_doubles() {
        assert_eq!(eval_source("5.0 / 0", &Value::Null, &Document::new()), Value::Null);
        assert_eq!(eval_source("5.0 % 0", &Value::Null, &Document::new()), Value::Null);
    }

    #[test]
    fn modulo_by_zero_document_decimal_does_not_panic() {
        let mut doc = Document::new();
        doc.insert("price", Value::Decimal(rust_decimal::Decimal::new(500, 2))).unwrap();
        doc.insert("zero", Value::Decimal(rust_decimal::Decimal::ZERO)).unwrap();
        let root = Value::Document(doc);
        assert_eq!(eval_source("$.price % $.zero", &root, &Document::new()), Value::Null);
        assert_eq!(eval_source("$.price / $.zero", &root, &Document::new()), Value::Null);
    }
}
