//! The runtime value model.
//!
//! `Value` is the tagged union every expression evaluates to: a flat enum
//! with one variant per storable shape, ordered and compared through
//! [`ordering`] rather than a derived `Ord` (string comparisons and
//! numeric widening both depend on injected policy, not byte order).

pub mod collation;
pub mod numeric;
pub mod object_id;
pub mod ordering;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use uuid::Uuid;

pub use object_id::ObjectId;

/// An ordered, key-unique mapping from field name to value.
///
/// Insertion order is preserved (document field order is observable:
/// `{b: 1, a: 2}` normalizes and serializes in that order), backed by
/// `indexmap` to preserve that order cheaply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document(IndexMap<SmolStr, Value>);

impl Document {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Inserts a field, rejecting keys containing `\0`.
    pub fn insert(&mut self, key: impl Into<SmolStr>, value: Value) -> Result<(), InvalidKeyError> {
        let key = key.into();
        if key.contains('\0') {
            return Err(InvalidKeyError);
        }
        self.0.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, SmolStr, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(SmolStr, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (SmolStr, Value)>>(iter: T) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// A document key contained the reserved `\0` character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyError;

impl std::fmt::Display for InvalidKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document keys may not contain the null character")
    }
}

impl std::error::Error for InvalidKeyError {}

/// Any runtime value the evaluator can produce.
///
/// `MinValue`/`MaxValue` are sentinels used by range-scan planning and by
/// tests of the total order in §6.3; they are never produced by parsing
/// literal source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int32(i32),
    Int64(i64),
    Double(f64),
    Decimal(Decimal),
    String(SmolStr),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    ObjectId(ObjectId),
    Guid(Uuid),
    Binary(Vec<u8>),
    MinValue,
    MaxValue,
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Truthiness used by predicate short-circuiting and `FILTER`/`WHERE`
    /// evaluation: only `Boolean(true)` is truthy, matching the evaluator
    /// contract's "yields `Null` on type mismatch, never panics" stance.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int32(_) | Value::Int64(_) | Value::Double(_) | Value::Decimal(_)
        )
    }

    /// The `type` tag used in diagnostics and reflection; not the same
    /// enumeration as `ExprKind`/`NodeType` (this describes data, those
    /// describe syntax).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Double(_) => "Double",
            Value::Decimal(_) => "Decimal",
            Value::String(_) => "String",
            Value::Boolean(_) => "Boolean",
            Value::DateTime(_) => "DateTime",
            Value::ObjectId(_) => "ObjectId",
            Value::Guid(_) => "Guid",
            Value::Binary(_) => "Binary",
            Value::MinValue => "MinValue",
            Value::MaxValue => "MaxValue",
            Value::Array(_) => "Array",
            Value::Document(_) => "Document",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(SmolStr::new(v))
    }
}
