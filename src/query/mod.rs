//! Query shape model: immutable value objects describing one query.

pub mod data_query;
pub mod fields;
pub mod filter;
pub mod group;
pub mod joins;
pub mod sort;
pub mod table;

pub use data_query::DataQuery;
pub use fields::{AliasAllocator, Fields, SelectColumn};
pub use filter::Filter;
pub use group::{Group, GroupField};
pub use joins::{JoinCollector, JoinCondition, JoinParams, JoinThrough, JoinType, Joins};
pub use sort::{Sort, SortField};
pub use table::Table;
