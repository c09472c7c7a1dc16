//! Select columns and their alias allocation.

use serde::{Deserialize, Serialize};

use crate::expr::{Expression, ValueType};

/// Allocates auto-generated column aliases for one compilation.
///
/// Construct a fresh allocator per report compilation; two compilations must
/// never share one, or their alias numbering leaks into each other.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    next: u32,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next generated column alias (`column_1`, `column_2`, ...).
    pub fn next_alias(&mut self) -> String {
        self.next += 1;
        format!("column_{}", self.next)
    }
}

/// One projected column: an expression plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct SelectColumn {
    pub expression: Expression,
    pub display_name: Option<String>,
    pub value_type: Option<ValueType>,
    pub unit: Option<String>,
    pub summarizable: bool,
    pub hide_empty: bool,
    pub alias: Option<String>,
}

impl SelectColumn {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            display_name: None,
            value_type: None,
            unit: None,
            summarizable: false,
            hide_empty: false,
            alias: None,
        }
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn summarizable(mut self) -> Self {
        self.summarizable = true;
        self
    }

    pub fn hide_empty(mut self) -> Self {
        self.hide_empty = true;
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Declared type, falling back to the expression's inferred type.
    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type.or_else(|| self.expression.value_type())
    }

    /// The SQL alias this column projects under.
    ///
    /// Only meaningful after the column has passed through [`Fields::new`] or
    /// was given an explicit alias.
    pub fn sql_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or("")
    }
}

/// The ordered select list of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    pub columns: Vec<SelectColumn>,
}

impl Fields {
    /// Build the select list, filling any missing alias from the allocator.
    pub fn new(columns: Vec<SelectColumn>, aliases: &mut AliasAllocator) -> Self {
        let columns = columns
            .into_iter()
            .map(|mut column| {
                if column.alias.is_none() {
                    column.alias = Some(aliases.next_alias());
                }
                column
            })
            .collect();
        Self { columns }
    }

    /// Build a select list whose columns all carry explicit aliases.
    pub fn fixed(columns: Vec<SelectColumn>) -> Self {
        debug_assert!(
            columns.iter().all(|c| c.alias.is_some()),
            "fixed select lists must alias every column"
        );
        Self { columns }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
