//! Relational query description: a base table, single-hop inner joins
//! and AND-composed equality filters.

mod builder;

pub use builder::{Condition, Join, Query};
