//! The `sale` virtual table: invoices and credit notes as one signed table.

use crate::expr::{constant, negate, typed_field, Expression, ValueType};
use crate::query::{Fields, SelectColumn, Table};

use super::{UnionSource, VirtualTable};

/// Presents invoices and credit notes as a single `sale` table.
///
/// The credit-note side negates `balance`, `subtotal`, `total` and `amount`
/// so that sums over the union net out credits against invoiced amounts. The
/// `type` column tags each row with its source object.
pub struct SalesTable;

impl SalesTable {
    fn column(expression: Expression, alias: &str) -> SelectColumn {
        SelectColumn::new(expression).with_alias(alias)
    }
}

impl VirtualTable for SalesTable {
    fn object(&self) -> &str {
        "sale"
    }

    fn sources(&self) -> Vec<UnionSource> {
        vec![
            UnionSource::new(Table::new("invoice"), "invoice", false),
            UnionSource::new(Table::new("credit_note"), "credit_note", true),
        ]
    }

    fn columns(&self, source: &UnionSource) -> Fields {
        let table = &source.table;
        let signed = |field: &str| {
            let expression = typed_field(table, field, ValueType::Float);
            if source.negated {
                negate(expression)
            } else {
                expression
            }
        };
        Fields::fixed(vec![
            Self::column(constant(source.discriminator), "type"),
            Self::column(typed_field(table, "id", ValueType::Integer), "id"),
            Self::column(typed_field(table, "tenant_id", ValueType::Integer), "tenant_id"),
            Self::column(
                typed_field(table, "customer_id", ValueType::Integer),
                "customer_id",
            ),
            Self::column(typed_field(table, "number", ValueType::String), "number"),
            Self::column(typed_field(table, "date", ValueType::Date), "date"),
            Self::column(typed_field(table, "status", ValueType::String), "status"),
            Self::column(signed("balance"), "balance"),
            Self::column(signed("subtotal"), "subtotal"),
            Self::column(signed("total"), "total"),
            Self::column(signed("amount"), "amount"),
        ])
    }
}
