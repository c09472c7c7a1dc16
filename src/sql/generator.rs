//! SQL text generation from a [`DataQuery`].
//!
//! The generator walks the query shape, consulting [`SqlContext`] for every
//! table-alias reference and recording every value that needs positional
//! binding. Clauses are built strictly in emission order so the parameter
//! list lines up with the placeholders in the final text.

use serde_json::Value;
use thiserror::Error;

use crate::expr::{Constant, Expression, FilterCondition, FilterValue};
use crate::query::{DataQuery, JoinCollector, JoinCondition};
use crate::sql::context::SqlContext;
use crate::virtuals::VirtualTables;

/// Errors that can occur while generating SQL.
///
/// These are bad-input conditions, not compiler bugs; invariant violations
/// inside the compiler itself (e.g. [`JoinCollector`] misuse) panic instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("unknown filter operator: {0}")]
    UnknownOperator(String),

    #[error("filter operator '{0}' requires a column or expression")]
    MissingExpression(String),

    #[error("filter operator '{operator}' expects {expected}")]
    MalformedValue {
        operator: String,
        expected: &'static str,
    },

    #[error("select list is empty")]
    EmptySelect,

    #[error("unsupported constant value: {0}")]
    UnsupportedConstant(Value),
}

/// Result type for SQL generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Translates a [`DataQuery`] into executable SQL text.
pub struct SqlGenerator<'a> {
    virtuals: &'a VirtualTables,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(virtuals: &'a VirtualTables) -> Self {
        Self { virtuals }
    }

    /// Generate the SQL for one query.
    ///
    /// Virtual tables compile recursively through the same context, so alias
    /// numbering stays globally consistent across nested sub-queries.
    pub fn generate(&self, query: &DataQuery, ctx: &mut SqlContext) -> GenerateResult<String> {
        if query.fields.is_empty() {
            return Err(GenerateError::EmptySelect);
        }

        // Aliases are allocated up front so numbering follows declaration
        // order regardless of which clause first mentions a table.
        let from_alias = ctx.table_alias(&query.table);
        for join in query.joins.iter() {
            if let Some(through) = &join.params.through {
                ctx.table_alias(&through.table);
            }
            ctx.table_alias(&join.join_table);
        }

        let select = self.select_sql(query, &from_alias, ctx)?;
        let from = self.from_sql(query, &from_alias, ctx)?;
        let joins = self.joins_sql(query, ctx)?;
        let where_clause = self.where_sql(query, &from_alias, ctx)?;

        let mut sql = format!("SELECT {select} FROM {from}");
        for join in joins {
            sql.push(' ');
            sql.push_str(&join);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&where_clause);

        if !query.group.is_empty() {
            let mut parts = Vec::new();
            for group in query.group.iter() {
                parts.push(self.expression_sql(&group.expression, ctx)?);
            }
            sql.push_str(" GROUP BY ");
            sql.push_str(&parts.join(", "));
        }

        if !query.sort.is_empty() {
            let mut parts = Vec::new();
            for sort in query.sort.iter() {
                let expr = self.expression_sql(&sort.expression, ctx)?;
                let direction = if sort.ascending { "ASC" } else { "DESC" };
                parts.push(format!("{expr} {direction}"));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = query.max_results {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Ok(sql)
    }

    fn select_sql(
        &self,
        query: &DataQuery,
        from_alias: &str,
        ctx: &mut SqlContext,
    ) -> GenerateResult<String> {
        let mut parts = Vec::with_capacity(query.fields.len() + 1);
        for column in query.fields.iter() {
            let expr = self.expression_sql(&column.expression, ctx)?;
            let alias = column
                .alias
                .clone()
                .unwrap_or_else(|| column.expression.select_alias());
            parts.push(format!("{expr} AS {alias}"));
        }
        if query.reference_columns {
            let reference = match self.virtuals.get(&query.table.object) {
                Some(table) => table.reference_sql(from_alias),
                None => format!("CONCAT('{}', '-', {from_alias}.id)", query.table.object),
            };
            parts.push(format!("{reference} AS {}_reference", query.table.object));
        }
        Ok(parts.join(", "))
    }

    fn from_sql(
        &self,
        query: &DataQuery,
        from_alias: &str,
        ctx: &mut SqlContext,
    ) -> GenerateResult<String> {
        match self.virtuals.get(&query.table.object) {
            Some(table) => {
                let union = table.compile(query, &query.table, self, ctx)?;
                Ok(format!("{union} AS {from_alias}"))
            }
            None => Ok(format!("{} AS {from_alias}", query.table.physical_name())),
        }
    }

    fn joins_sql(&self, query: &DataQuery, ctx: &mut SqlContext) -> GenerateResult<Vec<String>> {
        // Declared joins pass through a collector so the same logical join is
        // never emitted twice.
        let mut collector = JoinCollector::new();
        for join in query.joins.iter() {
            collector.add(join.clone());
        }
        collector.finalize();

        let mut clauses = Vec::new();
        for join in collector.all() {
            clauses.extend(self.join_sql(query, join, ctx)?);
        }
        Ok(clauses)
    }

    fn join_sql(
        &self,
        query: &DataQuery,
        join: &JoinCondition,
        ctx: &mut SqlContext,
    ) -> GenerateResult<Vec<String>> {
        let keyword = join.params.join_type.keyword();
        let parent_alias = ctx.table_alias(&join.parent_table);
        let join_alias = ctx.table_alias(&join.join_table);
        let target = match self.virtuals.get(&join.join_table.object) {
            Some(table) => table.compile(query, &join.join_table, self, ctx)?,
            None => join.join_table.physical_name(),
        };

        let mut clauses = Vec::new();
        let mut on;
        if let Some(through) = &join.params.through {
            let through_alias = ctx.table_alias(&through.table);
            let through_parent = through
                .parent_column
                .clone()
                .unwrap_or_else(|| join.parent_table.foreign_key());
            let through_join = through
                .join_column
                .clone()
                .unwrap_or_else(|| join.join_table.foreign_key());
            clauses.push(format!(
                "{keyword} {} AS {through_alias} ON {through_alias}.{through_parent} = {parent_alias}.id",
                through.table.physical_name()
            ));
            on = format!("{join_alias}.id = {through_alias}.{through_join}");
        } else {
            on = format!(
                "{join_alias}.{} = {parent_alias}.{}",
                join.join_column(),
                join.parent_column()
            );
        }
        if let Some(column) = &join.params.parent_type_column {
            on.push_str(&format!(
                " AND {parent_alias}.{column} = '{}'",
                join.join_table.object
            ));
        }
        if let Some(column) = &join.params.join_type_column {
            on.push_str(&format!(
                " AND {join_alias}.{column} = '{}'",
                join.parent_table.object
            ));
        }
        clauses.push(format!("{keyword} {target} AS {join_alias} ON {on}"));
        Ok(clauses)
    }

    fn where_sql(
        &self,
        query: &DataQuery,
        from_alias: &str,
        ctx: &mut SqlContext,
    ) -> GenerateResult<String> {
        let mut parts = vec![format!("{from_alias}.tenant_id = ?")];
        ctx.add_param(Value::from(query.tenant_id));
        for condition in query.filter.iter() {
            parts.push(self.condition_sql(condition, ctx)?);
        }
        Ok(parts.join(" AND "))
    }

    /// Translate one filter condition, recursing through `and`/`or` trees.
    pub fn condition_sql(
        &self,
        condition: &FilterCondition,
        ctx: &mut SqlContext,
    ) -> GenerateResult<String> {
        let operator = condition.operator.as_str();
        if operator == "and" || operator == "or" {
            let FilterValue::Conditions(children) = &condition.value else {
                return Err(GenerateError::MalformedValue {
                    operator: operator.into(),
                    expected: "a list of conditions",
                });
            };
            if children.is_empty() {
                return Err(GenerateError::MalformedValue {
                    operator: operator.into(),
                    expected: "a non-empty list of conditions",
                });
            }
            let joiner = if operator == "and" { " AND " } else { " OR " };
            let parts = children
                .iter()
                .map(|child| self.condition_sql(child, ctx))
                .collect::<GenerateResult<Vec<_>>>()?;
            return Ok(format!("({})", parts.join(joiner)));
        }

        let expression = condition
            .expression
            .as_ref()
            .ok_or_else(|| GenerateError::MissingExpression(operator.into()))?;
        let lhs = self.expression_sql(expression, ctx)?;

        match operator {
            "=" => {
                ctx.add_param(scalar_value(operator, &condition.value)?.clone());
                Ok(format!("{lhs} = ?"))
            }
            "!=" => {
                ctx.add_param(scalar_value(operator, &condition.value)?.clone());
                Ok(format!("{lhs} <> ?"))
            }
            "<" | "<=" | ">" | ">=" => {
                ctx.add_param(scalar_value(operator, &condition.value)?.clone());
                Ok(format!("{lhs} {operator} ?"))
            }
            "like" => {
                ctx.add_param(scalar_value(operator, &condition.value)?.clone());
                Ok(format!("{lhs} LIKE ?"))
            }
            "not_like" => {
                ctx.add_param(scalar_value(operator, &condition.value)?.clone());
                Ok(format!("{lhs} NOT LIKE ?"))
            }
            "in" | "not_in" => {
                let values = list_values(operator, &condition.value)?;
                let placeholders = vec!["?"; values.len()].join(", ");
                ctx.add_params(values.iter().cloned());
                let keyword = if operator == "in" { "IN" } else { "NOT IN" };
                Ok(format!("{lhs} {keyword} ({placeholders})"))
            }
            "between" => {
                let values = list_values(operator, &condition.value)?;
                if values.len() != 2 {
                    return Err(GenerateError::MalformedValue {
                        operator: operator.into(),
                        expected: "exactly two values",
                    });
                }
                ctx.add_params(values.iter().cloned());
                Ok(format!("{lhs} BETWEEN ? AND ?"))
            }
            "is_null" => Ok(format!("{lhs} IS NULL")),
            "is_not_null" => Ok(format!("{lhs} IS NOT NULL")),
            _ => Err(GenerateError::UnknownOperator(operator.into())),
        }
    }

    /// Translate one expression to SQL text.
    pub fn expression_sql(
        &self,
        expression: &Expression,
        ctx: &mut SqlContext,
    ) -> GenerateResult<String> {
        match expression {
            Expression::Field(f) => Ok(format!("{}.{}", ctx.table_alias(&f.table), f.field)),
            Expression::Constant(c) => constant_sql(c),
            Expression::Function(f) => {
                if f.name == "count" && f.args.items.is_empty() {
                    return Ok("COUNT(*)".into());
                }
                let args = f
                    .args
                    .items
                    .iter()
                    .map(|arg| self.expression_sql(arg, ctx))
                    .collect::<GenerateResult<Vec<_>>>()?;
                if f.name == "count_distinct" {
                    Ok(format!("COUNT(DISTINCT {})", args.join(", ")))
                } else {
                    Ok(format!("{}({})", f.name.to_uppercase(), args.join(", ")))
                }
            }
            Expression::List(list) => {
                let parts = list
                    .items
                    .iter()
                    .map(|item| self.expression_sql(item, ctx))
                    .collect::<GenerateResult<Vec<_>>>()?;
                Ok(parts.join(" "))
            }
            Expression::Condition(condition) => self.condition_sql(condition, ctx),
        }
    }
}

fn constant_sql(constant: &Constant) -> GenerateResult<String> {
    if constant.raw {
        return match &constant.value {
            Value::String(fragment) => Ok(fragment.clone()),
            other => Err(GenerateError::UnsupportedConstant(other.clone())),
        };
    }
    match &constant.value {
        Value::Null => Ok("NULL".into()),
        Value::Bool(true) => Ok("TRUE".into()),
        Value::Bool(false) => Ok("FALSE".into()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        other => Err(GenerateError::UnsupportedConstant(other.clone())),
    }
}

fn scalar_value<'v>(operator: &str, value: &'v FilterValue) -> GenerateResult<&'v Value> {
    match value {
        FilterValue::Scalar(v) => Ok(v),
        _ => Err(GenerateError::MalformedValue {
            operator: operator.into(),
            expected: "a scalar value",
        }),
    }
}

fn list_values<'v>(operator: &str, value: &'v FilterValue) -> GenerateResult<&'v [Value]> {
    match value {
        FilterValue::List(values) if !values.is_empty() => Ok(values),
        FilterValue::List(_) => Err(GenerateError::MalformedValue {
            operator: operator.into(),
            expected: "a non-empty list of values",
        }),
        _ => Err(GenerateError::MalformedValue {
            operator: operator.into(),
            expected: "a list of values",
        }),
    }
}
