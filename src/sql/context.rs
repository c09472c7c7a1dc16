//! Per-compilation SQL context: table-alias registry and bound parameters.

use std::collections::HashMap;

use serde_json::Value;

use crate::expr::sanitize_identifier;
use crate::query::table::Table;

/// Mutable state scoped to exactly one top-level compilation, including all
/// recursively nested virtual-table sub-compilations it is threaded through.
///
/// The alias registry is the single source of truth for how a [`Table`] is
/// referenced in emitted SQL: the compiler must never hand-construct a table
/// identifier, because virtual-table substitution relies on being able to
/// redirect one logical alias to another (see
/// [`push_alias_override`](SqlContext::push_alias_override)).
///
/// Never share or reuse a context across independent compilations; alias
/// numbering and parameter order are strictly sequential.
#[derive(Debug, Default)]
pub struct SqlContext {
    aliases: HashMap<String, String>,
    overrides: HashMap<String, String>,
    params: Vec<Value>,
}

impl SqlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable SQL identifier for the table, for the remainder of this
    /// compilation.
    ///
    /// The first call for a logical alias allocates
    /// `<sanitized-alias>_<n>` where `n` is the number of aliases allocated
    /// so far plus one; later calls return the identical identifier. Active
    /// overrides win over the registry.
    pub fn table_alias(&mut self, table: &Table) -> String {
        if let Some(forced) = self.overrides.get(&table.alias) {
            return forced.clone();
        }
        if let Some(existing) = self.aliases.get(&table.alias) {
            return existing.clone();
        }
        let generated = format!(
            "{}_{}",
            sanitize_identifier(&table.alias),
            self.aliases.len() + 1
        );
        self.aliases.insert(table.alias.clone(), generated.clone());
        generated
    }

    /// While active, `logical` resolves to `sql_alias` instead of its
    /// registry entry.
    ///
    /// A virtual table installs one around each union branch so references
    /// to its placeholder re-home onto the branch's concrete source table -
    /// structurally, never by rewriting emitted SQL text.
    pub fn push_alias_override(&mut self, logical: &str, sql_alias: &str) {
        let previous = self.overrides.insert(logical.into(), sql_alias.into());
        debug_assert!(
            previous.is_none(),
            "nested alias override for logical alias '{logical}'"
        );
    }

    pub fn pop_alias_override(&mut self, logical: &str) {
        self.overrides.remove(logical);
    }

    /// Record a value to bind positionally.
    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
    }

    pub fn add_params(&mut self, values: impl IntoIterator<Item = Value>) {
        self.params.extend(values);
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}
