//! Index-cost model: scores a candidate `(index, predicate)` pair so the
//! optimizer can pick the cheapest one.

use super::index::IndexDescriptor;

/// The shape of a where-term's relationship to an index's expression,
/// abstracted away from the AST node itself — this is all the cost model
/// needs to know.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateShape {
    Equal,
    In { key_count: usize },
    Between,
    GreaterOrLess,
    LikePrefix,
    LikeNonPrefix,
    NotEqual,
}

/// Estimates the cost of satisfying `predicate` against `index`. Lower is
/// cheaper; `LikeNonPrefix` is rejected by the optimizer before this is
/// ever called (a full scan is never chosen as an indexed candidate), but
/// is scored here for completeness of the table.
pub fn estimate(predicate: &PredicateShape, index: &IndexDescriptor) -> u64 {
    let key_count = index.key_count.max(1);
    match predicate {
        PredicateShape::Equal => {
            if index.unique {
                1
            } else {
                duplicates_estimate(key_count)
            }
        }
        PredicateShape::In { key_count: n } => {
            let per_key = if index.unique { 1 } else { duplicates_estimate(key_count) };
            per_key * (*n).max(1) as u64
        }
        PredicateShape::Between => range_width_estimate(key_count),
        PredicateShape::GreaterOrLess => key_count / 2,
        PredicateShape::LikePrefix => range_width_estimate(key_count),
        PredicateShape::LikeNonPrefix | PredicateShape::NotEqual => key_count,
    }
}

/// `O(log N) + k` duplicate-lookup estimate for an equality hit on a
/// non-unique index, approximating the average bucket size as `sqrt(N)`
/// in the absence of real key-distribution statistics.
fn duplicates_estimate(key_count: u64) -> u64 {
    let log_n = (key_count as f64).log2().max(1.0);
    let avg_bucket = (key_count as f64).sqrt().max(1.0);
    (log_n + avg_bucket).ceil() as u64
}

fn range_width_estimate(key_count: u64) -> u64 {
    (key_count / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(unique: bool, key_count: u64) -> IndexDescriptor {
        IndexDescriptor {
            name: "ix".to_string(),
            expression: crate::compiler::prebuilt::id_expression().clone(),
            unique,
            key_count,
            head_node: None,
        }
    }

    #[test]
    fn equal_on_unique_index_is_cheapest() {
        assert_eq!(estimate(&PredicateShape::Equal, &index(true, 10_000)), 1);
    }

    #[test]
    fn equal_on_non_unique_index_scales_with_duplicates() {
        let cheap = estimate(&PredicateShape::Equal, &index(false, 100));
        let unique = estimate(&PredicateShape::Equal, &index(true, 100));
        assert!(cheap > unique);
    }

    #[test]
    fn not_equal_is_full_scan_cost() {
        assert_eq!(estimate(&PredicateShape::NotEqual, &index(true, 500)), 500);
    }

    #[test]
    fn in_list_sums_per_key_costs() {
        let one = estimate(&PredicateShape::Equal, &index(true, 500));
        let three = estimate(&PredicateShape::In { key_count: 3 }, &index(true, 500));
        assert_eq!(three, one * 3);
    }
}
