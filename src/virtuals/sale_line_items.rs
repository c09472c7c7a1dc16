//! The `sale_line_item` virtual table: invoice and credit-note line items.

use crate::expr::{constant, field, negate, typed_field, Expression, ValueType};
use crate::query::{Fields, SelectColumn, Table};

use super::{UnionSource, VirtualTable};

/// Presents invoice line items and credit-note line items as one table.
///
/// Unlike the parent documents, the credit side negates `quantity` as well
/// as `unit_cost` and `amount`. `sale_id` normalizes the per-source parent
/// key (`invoice_id`, `credit_note_id`) into one column so the union joins
/// cleanly against `sale`.
pub struct SaleLineItemTable;

impl SaleLineItemTable {
    fn column(expression: Expression, alias: &str) -> SelectColumn {
        SelectColumn::new(expression).with_alias(alias)
    }
}

impl VirtualTable for SaleLineItemTable {
    fn object(&self) -> &str {
        "sale_line_item"
    }

    fn sources(&self) -> Vec<UnionSource> {
        vec![
            UnionSource::new(Table::new("invoice_line_item"), "invoice", false),
            UnionSource::new(Table::new("credit_note_line_item"), "credit_note", true),
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
        let parent_key = format!("{}_id", source.discriminator);
        Fields::fixed(vec![
            Self::column(constant(source.discriminator), "object_type"),
            Self::column(typed_field(table, "id", ValueType::Integer), "id"),
            Self::column(field(table, &parent_key), "sale_id"),
            Self::column(typed_field(table, "tenant_id", ValueType::Integer), "tenant_id"),
            Self::column(
                typed_field(table, "product_id", ValueType::Integer),
                "product_id",
            ),
            Self::column(signed("quantity"), "quantity"),
            Self::column(signed("unit_cost"), "unit_cost"),
            Self::column(signed("amount"), "amount"),
        ])
    }

    fn reference_columns(&self) -> (&'static str, &'static str) {
        ("object_type", "sale_id")
    }
}
