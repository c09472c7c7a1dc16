//! Sort specification.

use serde::{Deserialize, Serialize};

use crate::expr::Expression;

/// One sort field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct SortField {
    pub expression: Expression,
    pub ascending: bool,
}

impl SortField {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            ascending: true,
        }
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }
}

/// Ordered list of sort fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub fields: Vec<SortField>,
}

impl Sort {
    pub fn new(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortField> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
