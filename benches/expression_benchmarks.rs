//! End-to-End Expression and Planner Benchmarks
//!
//! Measures the cost of each pipeline stage — lexing, parsing, compiling,
//! evaluating, and optimizing — across a range of expression shapes.
//! Benchmarks are organized into:
//!
//! - **Simple Expressions**: literals, paths, comparisons
//! - **Predicate Expressions**: logical combinations, IN/BETWEEN/LIKE
//! - **Path Expressions**: nested field access, array wildcards, MAP/FILTER
//! - **Aggregation**: COUNT/SUM/AVG over array paths
//! - **Stress Tests**: deep nesting, wide AND chains, large IN lists
//! - **Planner**: optimizing queries against a handful of candidate indexes
//! - **Pipeline stages**: lex vs. parse vs. compile vs. evaluate
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench simple_expressions
//! cargo bench planner
//! cargo bench --features html_reports
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use docquery::compiler::compile;
use docquery::lexer::tokenize;
use docquery::parser::parse;
use docquery::planner::{IndexDescriptor, Order, Query, StaticSnapshot, optimize};
use docquery::value::{Document, Value};

fn sample_root() -> Value {
    let mut doc = Document::new();
    doc.insert("Age", Value::Int64(34)).unwrap();
    doc.insert("Name", Value::String("Alice".into())).unwrap();
    doc.insert(
        "Tags",
        Value::Array(vec![
            Value::String("admin".into()),
            Value::String("staff".into()),
        ]),
    )
    .unwrap();
    Value::Document(doc)
}

// ============================================================================
// Simple Expression Benchmarks
// ============================================================================

fn bench_simple_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_expressions");

    let expressions = vec![
        ("literal", "42"),
        ("path", "$.Age"),
        ("comparison", "$.Age > 18"),
        ("string_equality", "$.Name = 'Alice'"),
        ("arithmetic", "$.Age + 1 * 2"),
    ];

    for (name, source) in expressions {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, src| {
            b.iter(|| compile(black_box(src), None));
        });
    }

    group.finish();
}

fn bench_predicate_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate_expressions");

    let expressions = vec![
        ("and_conditions", "$.Age > 18 AND $.Age < 65"),
        ("or_conditions", "$.Age < 18 OR $.Age > 65"),
        (
            "complex_boolean",
            "($.Age > 10 AND $.Score < 20) OR ($.Name = 'Alice')",
        ),
        ("in_predicate", "$.Id IN [1, 2, 3, 4, 5]"),
        ("between_predicate", "$.Age BETWEEN 18 AND 65"),
        ("like_predicate", "$.Name LIKE 'A%'"),
    ];

    for (name, source) in expressions {
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, src| {
            b.iter(|| compile(black_box(src), None));
        });
    }

    group.finish();
}

// ============================================================================
// Path Expression Benchmarks
// ============================================================================

fn bench_path_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_expressions");

    let expressions = vec![
        ("nested_field", "$.Address.City"),
        ("array_index", "$.Tags[0]"),
        ("array_wildcard", "$.Tags[*]"),
        ("array_any", "$.Tags[*] ANY = 'admin'"),
        ("filtered_path", "$.Orders[@.Total > 100]"),
        ("map_projection", "$.Orders[*].Total"),
    ];

    for (name, source) in expressions {
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, src| {
            b.iter(|| compile(black_box(src), None));
        });
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    let expressions = vec![
        ("count", "COUNT($.Orders)"),
        ("sum", "SUM($.Orders[*].Total)"),
        ("avg", "AVG($.Orders[*].Total)"),
        ("min_max", "MIN($.Orders[*].Total) + MAX($.Orders[*].Total)"),
    ];

    for (name, source) in expressions {
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, src| {
            b.iter(|| compile(black_box(src), None));
        });
    }

    group.finish();
}

// ============================================================================
// Evaluation Benchmarks
// ============================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let root = sample_root();

    let expressions = vec![
        ("path", "$.Age"),
        ("comparison", "$.Age > 18"),
        ("array_any", "$.Tags[*] ANY = 'admin'"),
    ];

    for (name, source) in expressions {
        let expr = compile(source, None).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, e| {
            b.iter(|| e.execute_scalar(Some(black_box(&root)), None, None));
        });
    }

    group.finish();
}

// ============================================================================
// Stress Test Benchmarks
// ============================================================================

fn bench_deep_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_nesting");
    group.sample_size(50);

    for depth in [5, 10, 20, 30].iter() {
        let mut expr = String::from("$.Value");
        for i in 0..*depth {
            expr = format!("({} + {})", expr, i);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_levels", depth)),
            &expr,
            |b, src| {
                b.iter(|| compile(black_box(src), None));
            },
        );
    }

    group.finish();
}

fn bench_wide_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_predicates");
    group.sample_size(50);

    let mut many_conditions = String::new();
    for i in 0..50 {
        if i > 0 {
            many_conditions.push_str(" AND ");
        }
        many_conditions.push_str(&format!("$.Prop{} > {}", i, i));
    }

    group.bench_function("50_and_conditions", |b| {
        b.iter(|| compile(black_box(&many_conditions), None));
    });

    let mut large_in = String::from("$.Id IN [");
    for i in 0..500 {
        if i > 0 {
            large_in.push_str(", ");
        }
        large_in.push_str(&i.to_string());
    }
    large_in.push(']');

    group.bench_function("500_element_in_list", |b| {
        b.iter(|| compile(black_box(&large_in), None));
    });

    group.finish();
}

// ============================================================================
// Planner Benchmarks
// ============================================================================

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");

    let indexes = vec![
        IndexDescriptor::primary_key(10_000),
        IndexDescriptor {
            name: "ix_age".to_string(),
            expression: compile("$.Age", None).unwrap(),
            unique: false,
            key_count: 10_000,
            head_node: None,
        },
        IndexDescriptor {
            name: "ix_name".to_string(),
            expression: compile("$.Name", None).unwrap(),
            unique: true,
            key_count: 10_000,
            head_node: None,
        },
    ];
    let snapshot = StaticSnapshot::new("people", indexes);

    let cases: Vec<(&str, Query)> = vec![
        ("bare_select", Query::new(compile("$", None).unwrap())),
        ("equality_on_indexed_field", Query {
            r#where: vec![compile("$.Age = 30", None).unwrap()],
            ..Query::new(compile("$", None).unwrap())
        }),
        ("range_on_indexed_field", Query {
            r#where: vec![compile("$.Age > 18", None).unwrap()],
            ..Query::new(compile("$", None).unwrap())
        }),
        ("order_by_indexed_field", Query {
            order_by: Some(compile("$.Age", None).unwrap()),
            order: Order::Descending,
            ..Query::new(compile("$", None).unwrap())
        }),
    ];

    for (name, query) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| optimize(black_box(q), &snapshot));
        });
    }

    group.finish();
}

// ============================================================================
// Pipeline Stage Comparison (Lexer vs. Parser vs. Compiler vs. Evaluator)
// ============================================================================

fn bench_pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_stages");

    let source = "$.Age > 18 AND $.Tags[*] ANY = 'admin'";
    let root = sample_root();
    let expr = compile(source, None).unwrap();

    group.bench_function("01_lexer_only", |b| {
        b.iter(|| tokenize(black_box(source)));
    });

    group.bench_function("02_parse_only", |b| {
        b.iter(|| parse(black_box(source)));
    });

    group.bench_function("03_compile", |b| {
        b.iter(|| compile(black_box(source), None));
    });

    group.bench_function("04_evaluate", |b| {
        b.iter(|| expr.execute_scalar(Some(black_box(&root)), None, None));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_simple_expressions,
    bench_predicate_expressions,
    bench_path_expressions,
    bench_aggregation,
    bench_evaluate,
    bench_deep_nesting,
    bench_wide_predicates,
    bench_planner,
    bench_pipeline_stages,
);

criterion_main!(benches);
