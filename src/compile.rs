//! End-to-end compilation from a [`DataQuery`] to executable SQL.

use serde_json::Value;
use tracing::debug;

use crate::query::DataQuery;
use crate::sql::context::SqlContext;
use crate::sql::generator::{GenerateError, SqlGenerator};
use crate::virtuals::VirtualTables;

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("SQL generation error: {0}")]
    Generate(#[from] GenerateError),
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Generated SQL plus the values to bind positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Compile one query with a fresh context.
///
/// The context lives for exactly this compilation, including every nested
/// virtual-table sub-compilation it is threaded through, so alias numbering
/// and parameter order never leak between unrelated queries. Compiling the
/// same query twice therefore yields identical SQL.
pub fn compile_query(
    query: &DataQuery,
    virtuals: &VirtualTables,
) -> CompileResult<CompiledQuery> {
    debug!(
        object = %query.table.object,
        tenant_id = query.tenant_id,
        "compiling report query"
    );
    let mut ctx = SqlContext::new();
    let generator = SqlGenerator::new(virtuals);
    let sql = generator.generate(query, &mut ctx)?;
    debug!(params = ctx.params().len(), "compiled report query");
    Ok(CompiledQuery {
        sql,
        params: ctx.into_params(),
    })
}
