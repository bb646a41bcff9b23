//! The query planner/optimizer subsystem: scores candidate indexes,
//! models a query and its resulting plan, and runs the fixed optimizer
//! sequence over both.

pub mod cost;
pub mod index;
pub mod optimizer;
pub mod plan;

pub use cost::PredicateShape;
pub use index::{IndexDescriptor, Snapshot, StaticSnapshot};
pub use optimizer::{optimize, optimize_with_virtual_index};
pub use plan::{IndexChoice, Order, Query, QueryPlan};
