//! Virtual tables: named derived tables backed by generated UNION ALL
//! sub-selects over physical source tables.
//!
//! A virtual table is stateless; invoked per-compilation, it synthesizes one
//! nested sub-query per physical source, sign-flipping columns for credit
//! documents, and returns a parenthesized union substitutable anywhere a
//! physical table name would appear.

use std::collections::HashMap;

use tracing::debug;

use crate::query::{DataQuery, Fields, JoinCollector, Table};
use crate::sql::context::SqlContext;
use crate::sql::generator::{GenerateResult, SqlGenerator};

pub mod sale_line_items;
pub mod sales;

pub use sale_line_items::SaleLineItemTable;
pub use sales::SalesTable;

/// One physical source feeding a virtual table's union.
#[derive(Debug, Clone)]
pub struct UnionSource {
    pub table: Table,
    /// Literal tag projected into the union's discriminator column.
    pub discriminator: &'static str,
    /// Whether this source contributes the negative (credit) side.
    pub negated: bool,
}

impl UnionSource {
    pub fn new(table: Table, discriminator: &'static str, negated: bool) -> Self {
        Self {
            table,
            discriminator,
            negated,
        }
    }
}

/// A named derived table that is not a physical table.
pub trait VirtualTable: Send + Sync {
    /// Logical object name callers use to reference this table.
    fn object(&self) -> &str;

    /// The physical sources unioned together, in emission order.
    fn sources(&self) -> Vec<UnionSource>;

    /// The fixed column list one source contributes to the union.
    fn columns(&self, source: &UnionSource) -> Fields;

    /// Discriminator and row-id columns used for synthetic row references.
    fn reference_columns(&self) -> (&'static str, &'static str) {
        ("type", "id")
    }

    /// Synthetic globally-unique row identifier for a union row, e.g.
    /// `CONCAT(sale_1.type, '-', sale_1.id)` yielding `invoice-123`.
    fn reference_sql(&self, alias: &str) -> String {
        let (type_column, id_column) = self.reference_columns();
        format!("CONCAT({alias}.{type_column}, '-', {alias}.{id_column})")
    }

    /// Compile the parenthesized UNION ALL sub-select that stands in for a
    /// physical table reference.
    ///
    /// `via` is the table reference through which this virtual table was
    /// reached: the query's own table when it is the report's primary
    /// object, a join's table otherwise. When primary, the user's joins and
    /// full filter are pushed into every branch (joins declared against the
    /// placeholder are re-homed onto the branch's source table). When merely
    /// joined into, each branch carries only the tenant predicate; all other
    /// restriction happens at the outer level after the union.
    fn compile(
        &self,
        outer: &DataQuery,
        via: &Table,
        generator: &SqlGenerator<'_>,
        ctx: &mut SqlContext,
    ) -> GenerateResult<String> {
        let primary = via.alias == outer.table.alias && outer.table.object == self.object();
        debug!(object = self.object(), primary, "expanding virtual table");

        let mut branches = Vec::new();
        for source in self.sources() {
            let source_alias = ctx.table_alias(&source.table);

            let mut branch = DataQuery::new(source.table.clone(), outer.tenant_id)
                .with_fields(self.columns(&source));
            if primary {
                let mut joins = JoinCollector::new();
                for join in outer.joins.iter() {
                    let join = if join.parent_table.alias == via.alias {
                        join.rehomed(source.table.clone())
                    } else {
                        join.clone()
                    };
                    joins.add(join);
                }
                joins.finalize();
                branch = branch
                    .with_joins(joins.into_joins())
                    .with_filter(outer.filter.clone());
            }

            // While the branch compiles, references to the placeholder
            // resolve to this branch's source table.
            ctx.push_alias_override(&via.alias, &source_alias);
            let sql = generator.generate(&branch, ctx);
            ctx.pop_alias_override(&via.alias);
            branches.push(sql?);
        }

        Ok(format!("({})", branches.join(" UNION ALL ")))
    }
}

/// Registry mapping logical object names to virtual table definitions.
///
/// The generator consults it whenever a referenced table is not physical.
pub struct VirtualTables {
    tables: HashMap<String, Box<dyn VirtualTable>>,
}

impl VirtualTables {
    /// A registry with no virtual tables.
    pub fn empty() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    pub fn register(&mut self, table: Box<dyn VirtualTable>) {
        self.tables.insert(table.object().to_string(), table);
    }

    pub fn get(&self, object: &str) -> Option<&dyn VirtualTable> {
        self.tables.get(object).map(|table| &**table)
    }
}

impl Default for VirtualTables {
    /// The built-in registry: `sale` and `sale_line_item`.
    fn default() -> Self {
        let mut tables = Self::empty();
        tables.register(Box::new(SalesTable));
        tables.register(Box::new(SaleLineItemTable));
        tables
    }
}
