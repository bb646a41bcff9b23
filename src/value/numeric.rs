//! Shared numeric coercion helpers for the four numeric `Value` variants.
//!
//! Both the total-order comparator ([`super::ordering`]) and the
//! arithmetic evaluator (`crate::compiler::eval`) need the same widening
//! ladder (`Int32 -> Int64 -> Double -> Decimal`), so it lives here once
//! rather than being reimplemented at each call site.

use super::Value;
use rust_decimal::Decimal;

/// Widening rank used to decide which representation an arithmetic or
/// comparison result should use: the higher of the two operands' ranks
/// wins.
pub fn rank(value: &Value) -> u8 {
    match value {
        Value::Int32(_) => 0,
        Value::Int64(_) => 1,
        Value::Double(_) => 2,
        Value::Decimal(_) => 3,
        _ => 0,
    }
}

pub fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Int32(n) => *n as i64,
        Value::Int64(n) => *n,
        _ => 0,
    }
}

pub fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int32(n) => *n as f64,
        Value::Int64(n) => *n as f64,
        Value::Double(n) => *n,
        Value::Decimal(d) => d.to_string().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Int32(n) => Some(Decimal::from(*n)),
        Value::Int64(n) => Some(Decimal::from(*n)),
        Value::Double(n) => Decimal::from_f64_retain(*n),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

/// Builds an integer literal value, preferring the narrower `Int32`
/// representation when the value fits (mirrors the document-store
/// convention of not widening a small literal to `Int64` needlessly).
pub fn int_literal(value: i64) -> Value {
    match i32::try_from(value) {
        Ok(n) => Value::Int32(n),
        Err(_) => Value::Int64(value),
    }
}
