//! Conformance tests for the concrete scenarios documented alongside the
//! expression language and query optimizer: literal evaluation, field-set
//! extraction, immutability, node typing, normalization, parse failures,
//! the `ANY`-rewrite, and the no-index planner fallback.

use docquery::compiler::compile;
use docquery::compiler::node::NodeType;
use docquery::planner::{IndexDescriptor, Query, StaticSnapshot, optimize};
use docquery::value::Value;

#[test]
fn array_literal_evaluates_to_array_value() {
    let expr = compile("[1,2]", None).unwrap();
    assert_eq!(
        expr.execute_scalar(None, None, None),
        Value::Array(vec![Value::Int32(1), Value::Int32(2)])
    );
}

#[test]
fn fields_collects_only_the_root_field() {
    let expr = compile("$.Items[*].Type", None).unwrap();
    let fields: Vec<&str> = expr.fields().iter().map(|f| f.as_str()).collect();
    assert_eq!(fields, vec!["Items"]);
}

#[test]
fn fields_collects_every_root_referenced_inside_a_filter_predicate() {
    let expr = compile("Items[$.Root = 1].Type ALL = Age", None).unwrap();
    let mut fields: Vec<&str> = expr.fields().iter().map(|f| f.as_str()).collect();
    fields.sort();
    assert_eq!(fields, vec!["Age", "Items", "Root"]);
}

#[test]
fn immutability_follows_the_least_immutable_subtree() {
    assert!(!compile("_id + DAY(NOW())", None).unwrap().is_immutable());
    assert!(compile("{ a: 1, n: UPPER(name) }", None).unwrap().is_immutable());
}

#[test]
fn parenthesization_changes_the_node_type() {
    assert_eq!(compile("(1 + 1) / 3", None).unwrap().node_type(), NodeType::Divide);
    assert_eq!(compile("1 + 1 / 3", None).unwrap().node_type(), NodeType::Add);
}

#[test]
fn normalization_renders_postfix_sugar_and_quantifiers_canonically() {
    let expr = compile("items[*].id any=5", None).unwrap();
    assert_eq!(expr.source(), "MAP($.items[*]=>@.id) ANY=5");
}

#[test]
fn malformed_expressions_fail_with_unexpected_token() {
    for source in ["5 FOO < 1", "8 ++ 9", "10 + 5)", "(25 + 15", "MAP(A => +)"] {
        assert!(compile(source, None).is_err(), "expected {source:?} to fail to compile");
    }
}

#[test]
fn planner_rewrites_any_equality_into_in_array() {
    let query = Query {
        r#where: vec![compile("ids[*] ANY = x.Id", None).unwrap()],
        ..Query::new(compile("$", None).unwrap())
    };
    let snapshot = StaticSnapshot::new("docs", vec![IndexDescriptor::primary_key(0)]);
    let plan = optimize(&query, &snapshot).unwrap();
    assert!(
        plan.filters.iter().any(|f| f.source() == "$.x.Id IN ARRAY($.ids[*])"),
        "filters were {:?}",
        plan.filters.iter().map(|f| f.source()).collect::<Vec<_>>()
    );
}

#[test]
fn planner_falls_back_to_id_scan_with_no_where_and_no_secondary_indexes() {
    let query = Query::new(compile("$", None).unwrap());
    let snapshot = StaticSnapshot::new("docs", vec![IndexDescriptor::primary_key(0)]);
    let plan = optimize(&query, &snapshot).unwrap();
    assert_eq!(plan.index_expression, "$._id");
    assert_eq!(plan.order_by.as_ref().map(|o| o.source()), None);
}
