//! Property-based coverage for the round-trip normalization law: for any
//! expression that compiles, re-compiling its normalized source yields the
//! same normalized source again. Table-driven `#[test]`s elsewhere pin
//! down fixed cases; this generates randomized expression shapes since the
//! property is naturally about arbitrary input rather than a fixed table.

use docquery::compiler::compile;
use proptest::prelude::*;

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Age".to_string()),
        Just("Name".to_string()),
        Just("Score".to_string()),
        Just("Total".to_string()),
    ]
}

fn arb_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1000i64..1000).prop_map(|n| n.to_string()),
        arb_field().prop_map(|f| format!("$.{f}")),
        arb_field().prop_map(|f| format!("'{f}'")),
    ]
}

fn arb_expr() -> impl Strategy<Value = String> {
    arb_leaf().prop_recursive(4, 64, 4, |inner| {
        prop_oneof![
            (inner.clone(), prop_oneof![Just("+"), Just("-"), Just("*")], inner.clone())
                .prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l} > {r})")),
        ]
    })
}

proptest! {
    #[test]
    fn normalized_source_reparses_to_itself(src in arb_expr()) {
        let compiled = compile(&src, None);
        prop_assume!(compiled.is_ok());
        let first = compiled.unwrap();

        let reparsed = compile(first.source(), None)
            .expect("normalized source must itself compile");
        prop_assert_eq!(first.source(), reparsed.source());
    }
}
