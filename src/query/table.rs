//! Logical table references.

use inflector::Inflector;
use serde::{Deserialize, Serialize};

/// A reference to a logical object within a query.
///
/// The alias disambiguates multiple references to the same underlying object
/// (e.g. two different joins into `invoice`). It defaults to the object name.
/// Uniqueness of the generated SQL identifiers is [`SqlContext`]'s concern,
/// not this type's.
///
/// [`SqlContext`]: crate::sql::SqlContext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct Table {
    pub object: String,
    pub alias: String,
}

impl Table {
    pub fn new(object: &str) -> Self {
        Self {
            object: object.into(),
            alias: object.into(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = alias.into();
        self
    }

    /// Physical table name for the object (`credit_note` -> `credit_notes`).
    pub fn physical_name(&self) -> String {
        self.object.to_plural()
    }

    /// Foreign-key column other tables use to point at this object
    /// (`credit_note` -> `credit_note_id`).
    pub fn foreign_key(&self) -> String {
        format!("{}_id", self.object)
    }
}
