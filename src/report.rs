//! Report definitions: sections aggregated under one tenant.
//!
//! These are data holders; the query inside each section does the work.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::DataQuery;

/// How a chart section renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    Bar,
    Line,
    Pie,
}

/// Chart rendering options for a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct ChartOptions {
    pub chart_type: ChartType,
    pub options: Value,
}

impl ChartOptions {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// One titled section of a report: a query plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct Section {
    pub title: String,
    pub query: DataQuery,
    pub chart: Option<ChartOptions>,
}

impl Section {
    pub fn new(title: &str, query: DataQuery) -> Self {
        Self {
            title: title.into(),
            query,
            chart: None,
        }
    }

    pub fn with_chart(mut self, chart: ChartOptions) -> Self {
        self.chart = Some(chart);
        self
    }
}

/// A report definition: one tenant, a title, and ordered sections.
///
/// The serialized form is computed once at build time and handed in;
/// `Display` returns it verbatim rather than re-deriving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    tenant_id: i64,
    title: String,
    sections: Vec<Section>,
    serialized: String,
}

impl Definition {
    /// Wrap already-serialized parts.
    pub fn new(tenant_id: i64, title: &str, sections: Vec<Section>, serialized: String) -> Self {
        Self {
            tenant_id,
            title: title.into(),
            sections,
            serialized,
        }
    }

    /// Build a definition, computing the serialized form once.
    pub fn build(
        tenant_id: i64,
        title: &str,
        sections: Vec<Section>,
    ) -> serde_json::Result<Self> {
        #[derive(Serialize)]
        struct Parts<'a> {
            tenant_id: i64,
            title: &'a str,
            sections: &'a [Section],
        }
        let serialized = serde_json::to_string(&Parts {
            tenant_id,
            title,
            sections: &sections,
        })?;
        Ok(Self::new(tenant_id, title, sections, serialized))
    }

    pub fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn serialized(&self) -> &str {
        &self.serialized
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}
