//! Query (optimizer input) and QueryPlan (optimizer output) records.

use crate::compiler::Expression;
use crate::value::Value;
use smol_str::SmolStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// A user query, as handed to the optimizer.
#[derive(Debug, Clone)]
pub struct Query {
    pub select: Expression,
    pub r#where: Vec<Expression>,
    pub includes: Vec<Expression>,
    pub group_by: Option<Expression>,
    pub having: Option<Expression>,
    pub order_by: Option<Expression>,
    pub order: Order,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub for_update: bool,
}

impl Query {
    /// A bare `select` with every optional clause absent, the starting
    /// point most callers build on with struct-update syntax.
    pub fn new(select: Expression) -> Self {
        Self {
            select,
            r#where: Vec::new(),
            includes: Vec::new(),
            group_by: None,
            having: None,
            order_by: None,
            order: Order::Ascending,
            limit: None,
            offset: None,
            for_update: false,
        }
    }
}

/// The access path the optimizer chose.
#[derive(Debug, Clone)]
pub enum IndexChoice {
    /// Full ordered scan of `field`'s index, no predicate consumed.
    All { field: String, order: Order },
    /// Single-key point lookup.
    Equals { index: String, value: Value },
    /// Inclusive/exclusive bounded range scan.
    Range { index: String, low: Value, high: Value, low_inclusive: bool, high_inclusive: bool },
    /// Multi-key scan over an explicit key list (an `IN` term).
    Scan { index: String, values: Vec<Value> },
    /// An externally supplied sequence, used as-is at cost 0.
    Virtual { label: String },
}

/// The optimizer's output: an immutable execution strategy record.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub collection: String,
    pub index: IndexChoice,
    pub index_cost: u64,
    pub index_expression: String,
    pub is_index_key_only: bool,
    pub filters: Vec<Expression>,
    pub fields: Vec<SmolStr>,
    pub include_before: Vec<Expression>,
    pub include_after: Vec<Expression>,
    pub order_by: Option<Expression>,
    pub group_by: Option<Expression>,
    pub select: Expression,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub for_update: bool,
}
