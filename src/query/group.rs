//! Grouping specification.

use serde::{Deserialize, Serialize};

use crate::expr::Expression;

/// One grouping field.
///
/// Expanded fields render as drill-down rows; collapsed fields are rolled up
/// into aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct GroupField {
    pub expression: Expression,
    pub ascending: bool,
    pub expanded: bool,
    pub display_name: Option<String>,
    pub fill_missing_data: bool,
}

impl GroupField {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            ascending: true,
            expanded: false,
            display_name: None,
            fill_missing_data: false,
        }
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    pub fn expanded(mut self) -> Self {
        self.expanded = true;
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn fill_missing_data(mut self) -> Self {
        self.fill_missing_data = true;
        self
    }
}

/// Ordered list of grouping fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub fields: Vec<GroupField>,
}

impl Group {
    pub fn new(fields: Vec<GroupField>) -> Self {
        Self { fields }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupField> {
        self.fields.iter()
    }

    /// Drill-down groups, rendered as nested rows.
    pub fn expanded(&self) -> impl Iterator<Item = &GroupField> {
        self.fields.iter().filter(|f| f.expanded)
    }

    /// Rolled-up groups.
    pub fn collapsed(&self) -> impl Iterator<Item = &GroupField> {
        self.fields.iter().filter(|f| !f.expanded)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
