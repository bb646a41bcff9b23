//! Prebuilt expression singletons (spec.md §9): a small library of
//! expressions reused so often (`_id`, a count-of-source projection, an
//! existence check) that they are compiled once, lazily, and shared
//! read-only across the process — the idiomatic Rust answer to "lazily-
//! initialized process-wide singletons" is `std::sync::OnceLock`, not a
//! hand-rolled double-checked-lock (no extra crate needed: `OnceLock` has
//! been stable long enough to be the obvious choice here).

use super::Expression;
use std::sync::OnceLock;

/// `$._id` — the primary key path, used as the default sort/scan key
/// whenever the optimizer falls back to a full-collection scan.
pub fn id_expression() -> &'static Expression {
    static CELL: OnceLock<Expression> = OnceLock::new();
    CELL.get_or_init(|| super::compile("_id", None).expect("prebuilt expression must compile"))
}

/// `{ count: COUNT(*._id) }` — counts the documents in the evaluated
/// source sequence.
pub fn count_expression() -> &'static Expression {
    static CELL: OnceLock<Expression> = OnceLock::new();
    CELL.get_or_init(|| {
        super::compile("{ count: COUNT(*._id) }", None).expect("prebuilt expression must compile")
    })
}

/// `{ exists: ANY(*._id) }` — true iff the evaluated source sequence is
/// non-empty.
pub fn exists_expression() -> &'static Expression {
    static CELL: OnceLock<Expression> = OnceLock::new();
    CELL.get_or_init(|| {
        super::compile("{ exists: ANY(*._id) }", None).expect("prebuilt expression must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_expression_normalizes_to_dollar_id() {
        assert_eq!(id_expression().source(), "$._id");
    }

    #[test]
    fn count_and_exists_are_stable_across_calls_and_normalize_the_source_sugar() {
        let a = count_expression() as *const Expression;
        let b = count_expression() as *const Expression;
        assert_eq!(a, b);
        assert_eq!(count_expression().source(), "{count:COUNT(MAP(*=>@._id))}");
        assert_eq!(exists_expression().source(), "{exists:ANY(MAP(*=>@._id))}");
    }
}
