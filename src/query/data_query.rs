//! The canonical description of one query.

use serde::{Deserialize, Serialize};

use crate::query::fields::Fields;
use crate::query::filter::Filter;
use crate::query::group::Group;
use crate::query::joins::Joins;
use crate::query::sort::Sort;
use crate::query::table::Table;

/// The immutable bundle describing one SQL query's shape prior to text
/// generation.
///
/// Tenant scoping is an explicit field, never a filter condition: the
/// generator emits the tenant predicate itself, for the primary table and
/// for every virtual-table union branch. The filter list carries only
/// user-specified conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "DataQuery has no effect until compiled"]
pub struct DataQuery {
    pub table: Table,
    pub tenant_id: i64,
    pub joins: Joins,
    pub fields: Fields,
    pub filter: Filter,
    pub group: Group,
    pub sort: Sort,
    pub max_results: Option<u64>,
    /// When set, the compiler appends a synthetic `<object>_reference`
    /// column that uniquely identifies a row across virtual union tables
    /// (e.g. `invoice-123`).
    pub reference_columns: bool,
}

impl DataQuery {
    pub fn new(table: Table, tenant_id: i64) -> Self {
        Self {
            table,
            tenant_id,
            joins: Joins::default(),
            fields: Fields::default(),
            filter: Filter::default(),
            group: Group::default(),
            sort: Sort::default(),
            max_results: None,
            reference_columns: false,
        }
    }

    pub fn with_joins(mut self, joins: Joins) -> Self {
        self.joins = joins;
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = group;
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_max_results(mut self, max_results: u64) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_reference_columns(mut self) -> Self {
        self.reference_columns = true;
        self
    }
}
