//! # Report Builder
//!
//! A query IR and SQL compiler for tenant-scoped reporting.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  DataQuery (IR)                          │
//! │   (table, joins, fields, filter, group, sort)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [generator]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SqlGenerator + SqlContext (aliases, params)       │
//! │        ├── physical tables  → FROM/JOIN by name          │
//! │        └── virtual tables   → UNION ALL sub-selects      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │            SQL text + positional parameters              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A caller builds a [`query::DataQuery`] describing what it wants; the
//! generator walks it, consulting [`sql::SqlContext`] for aliasing and the
//! [`virtuals::VirtualTables`] registry whenever a named table is not
//! physical, recursively compiling nested sub-queries and splicing the
//! resulting union in place of a table reference. Executing the generated
//! SQL is out of scope; the sole output is text plus bind values.

pub mod compile;
pub mod expr;
pub mod query;
pub mod report;
pub mod sql;
pub mod virtuals;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_query, CompileError, CompileResult, CompiledQuery};
    pub use crate::expr::{
        // Constructors
        constant,
        field,
        func,
        negate,
        raw,
        typed_field,
        // Types
        Constant,
        Expression,
        ExpressionList,
        FieldReference,
        FilterCondition,
        FilterValue,
        FunctionCall,
        ValueType,
    };
    pub use crate::query::{
        AliasAllocator, DataQuery, Fields, Filter, Group, GroupField, JoinCollector,
        JoinCondition, JoinParams, JoinThrough, JoinType, Joins, SelectColumn, Sort, SortField,
        Table,
    };
    pub use crate::report::{ChartOptions, ChartType, Definition, Section};
    pub use crate::sql::{GenerateError, GenerateResult, SqlContext, SqlGenerator};
    pub use crate::virtuals::{
        SaleLineItemTable, SalesTable, UnionSource, VirtualTable, VirtualTables,
    };
}

// Also export the compile entry points at the crate root
pub use compile::{compile_query, CompiledQuery};
