//! The total order across `Value` variants:
//!
//! `Null < MinValue < numeric (widened) < DateTime < String (collation) <
//! Document < Array < Binary < ObjectId < Guid < Boolean(false < true) <
//! MaxValue`.

use super::collation::Collation;
use super::numeric::{as_decimal, as_f64, as_i64};
use super::{Document, Value};
use std::cmp::Ordering;

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::MinValue => 1,
        Value::Int32(_) | Value::Int64(_) | Value::Double(_) | Value::Decimal(_) => 2,
        Value::DateTime(_) => 3,
        Value::String(_) => 4,
        Value::Document(_) => 5,
        Value::Array(_) => 6,
        Value::Binary(_) => 7,
        Value::ObjectId(_) => 8,
        Value::Guid(_) => 9,
        Value::Boolean(_) => 10,
        Value::MaxValue => 11,
    }
}

/// Compares two values under the total order, using `collation` for any
/// string comparison reached along the way (including inside nested
/// documents/arrays).
pub fn compare(a: &Value, b: &Value, collation: &dyn Collation) -> Ordering {
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Value::Null, Value::Null) | (Value::MinValue, Value::MinValue) | (Value::MaxValue, Value::MaxValue) => {
            Ordering::Equal
        }
        (a, b) if a.is_numeric() && b.is_numeric() => compare_numeric(a, b),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => collation.compare(x, y),
        (Value::Document(x), Value::Document(y)) => compare_documents(x, y, collation),
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y, collation),
        (Value::Binary(x), Value::Binary(y)) => x.cmp(y),
        (Value::ObjectId(x), Value::ObjectId(y)) => x.cmp(y),
        (Value::Guid(x), Value::Guid(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Equality follows the same order.
pub fn equals(a: &Value, b: &Value, collation: &dyn Collation) -> bool {
    compare(a, b, collation) == Ordering::Equal
}

fn compare_numeric(a: &Value, b: &Value) -> Ordering {
    if matches!(a, Value::Decimal(_)) || matches!(b, Value::Decimal(_)) {
        if let (Some(da), Some(db)) = (as_decimal(a), as_decimal(b)) {
            return da.cmp(&db);
        }
    }
    if matches!(a, Value::Double(_)) || matches!(b, Value::Double(_)) {
        return as_f64(a).partial_cmp(&as_f64(b)).unwrap_or(Ordering::Equal);
    }
    as_i64(a).cmp(&as_i64(b))
}

fn compare_documents(a: &Document, b: &Document, collation: &dyn Collation) -> Ordering {
    let mut a_entries: Vec<_> = a.iter().collect();
    let mut b_entries: Vec<_> = b.iter().collect();
    a_entries.sort_by(|x, y| x.0.cmp(y.0));
    b_entries.sort_by(|x, y| x.0.cmp(y.0));

    for (ea, eb) in a_entries.iter().zip(b_entries.iter()) {
        let key_cmp = ea.0.cmp(eb.0);
        if key_cmp != Ordering::Equal {
            return key_cmp;
        }
        let val_cmp = compare(ea.1, eb.1, collation);
        if val_cmp != Ordering::Equal {
            return val_cmp;
        }
    }
    a_entries.len().cmp(&b_entries.len())
}

fn compare_arrays(a: &[Value], b: &[Value], collation: &dyn Collation) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let cmp = compare(x, y, collation);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    a.len().cmp(&b.len())
}
