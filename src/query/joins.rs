//! Join conditions and the deduplicating collector.

use serde::{Deserialize, Serialize};

use crate::query::table::Table;

/// Type of join. Reports default to LEFT JOIN so a missing related row never
/// drops the parent row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    #[default]
    Left,
    Inner,
    Right,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Left => "LEFT JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// Intermediate table for a many-to-many join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct JoinThrough {
    pub table: Table,
    /// Column on the through table pointing at the parent; defaults to the
    /// parent object's foreign key.
    pub parent_column: Option<String>,
    /// Column on the through table pointing at the joined object; defaults
    /// to the joined object's foreign key.
    pub join_column: Option<String>,
}

impl JoinThrough {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            parent_column: None,
            join_column: None,
        }
    }

    pub fn with_parent_column(mut self, column: &str) -> Self {
        self.parent_column = Some(column.into());
        self
    }

    pub fn with_join_column(mut self, column: &str) -> Self {
        self.join_column = Some(column.into());
        self
    }
}

/// Configuration of a single join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct JoinParams {
    pub join_type: JoinType,
    /// Parent-side column; defaults to `<joined-object>_id`.
    pub parent_column: Option<String>,
    /// Join-side column; defaults to `id`.
    pub join_column: Option<String>,
    /// Polymorphic discriminator column on the parent side, matched against
    /// the joined object's name.
    pub parent_type_column: Option<String>,
    /// Polymorphic discriminator column on the join side, matched against
    /// the parent object's name.
    pub join_type_column: Option<String>,
    pub through: Option<JoinThrough>,
}

impl JoinParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(mut self) -> Self {
        self.join_type = JoinType::Inner;
        self
    }

    pub fn with_parent_column(mut self, column: &str) -> Self {
        self.parent_column = Some(column.into());
        self
    }

    pub fn with_join_column(mut self, column: &str) -> Self {
        self.join_column = Some(column.into());
        self
    }

    pub fn with_parent_type_column(mut self, column: &str) -> Self {
        self.parent_type_column = Some(column.into());
        self
    }

    pub fn with_join_type_column(mut self, column: &str) -> Self {
        self.join_type_column = Some(column.into());
        self
    }

    pub fn through(mut self, through: JoinThrough) -> Self {
        self.through = Some(through);
        self
    }
}

/// One join between a parent table and a joined table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct JoinCondition {
    pub parent_table: Table,
    pub join_table: Table,
    pub params: JoinParams,
}

impl JoinCondition {
    pub fn new(parent_table: Table, join_table: Table) -> Self {
        Self {
            parent_table,
            join_table,
            params: JoinParams::default(),
        }
    }

    pub fn with_params(mut self, params: JoinParams) -> Self {
        self.params = params;
        self
    }

    /// The configured parent-side column, or `<joined-object>_id`.
    pub fn parent_column(&self) -> String {
        self.params
            .parent_column
            .clone()
            .unwrap_or_else(|| self.join_table.foreign_key())
    }

    /// The configured join-side column, or `id`.
    pub fn join_column(&self) -> String {
        self.params.join_column.clone().unwrap_or_else(|| "id".into())
    }

    /// The same join re-attached to a different parent table.
    pub fn rehomed(&self, parent_table: Table) -> Self {
        Self {
            parent_table,
            join_table: self.join_table.clone(),
            params: self.params.clone(),
        }
    }
}

/// An immutable, deduplicated set of joins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Joins {
    conditions: Vec<JoinCondition>,
}

impl Joins {
    pub fn iter(&self) -> impl Iterator<Item = &JoinCondition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl From<Vec<JoinCondition>> for Joins {
    /// Builds the set through a [`JoinCollector`], so duplicate join-table
    /// aliases are dropped here too.
    fn from(conditions: Vec<JoinCondition>) -> Self {
        let mut collector = JoinCollector::new();
        for condition in conditions {
            collector.add(condition);
        }
        collector.finalize();
        collector.into_joins()
    }
}

/// Mutable builder accumulating joins during compilation.
///
/// Deduplicates by join-table alias: the first join registered for an alias
/// wins and later duplicates are silently dropped. Misuse after
/// [`finalize`](JoinCollector::finalize) indicates a compiler bug and panics
/// rather than being tolerated.
#[derive(Debug, Default)]
pub struct JoinCollector {
    joins: Vec<JoinCondition>,
    finalized: bool,
}

impl JoinCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a join. A no-op when a join with the same join-table alias
    /// was already registered.
    ///
    /// # Panics
    ///
    /// Panics when called after `finalize()`.
    pub fn add(&mut self, join: JoinCondition) {
        assert!(
            !self.finalized,
            "JoinCollector::add called after finalize(); joins are frozen"
        );
        let duplicate = self
            .joins
            .iter()
            .any(|existing| existing.join_table.alias == join.join_table.alias);
        if !duplicate {
            self.joins.push(join);
        }
    }

    /// Freeze the collector.
    ///
    /// # Panics
    ///
    /// Panics when called a second time.
    pub fn finalize(&mut self) {
        assert!(
            !self.finalized,
            "JoinCollector::finalize called twice; the collector is already frozen"
        );
        self.finalized = true;
    }

    /// The collected joins.
    ///
    /// # Panics
    ///
    /// Panics when the collector has not been finalized.
    pub fn all(&self) -> &[JoinCondition] {
        assert!(
            self.finalized,
            "JoinCollector::all called before finalize(); collection is still open"
        );
        &self.joins
    }

    /// Consume the collector into an immutable [`Joins`] value.
    ///
    /// # Panics
    ///
    /// Panics when the collector has not been finalized.
    pub fn into_joins(self) -> Joins {
        assert!(
            self.finalized,
            "JoinCollector::into_joins called before finalize(); collection is still open"
        );
        Joins {
            conditions: self.joins,
        }
    }
}
