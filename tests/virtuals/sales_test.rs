use report_builder::prelude::*;
use serde_json::json;

fn sale_fields(sale: &Table) -> Fields {
    let mut aliases = AliasAllocator::new();
    Fields::new(
        vec![
            SelectColumn::new(field(sale, "number")),
            SelectColumn::new(field(sale, "total")),
        ],
        &mut aliases,
    )
}

#[test]
fn test_primary_union_shape() {
    let sale = Table::new("sale");
    let query = DataQuery::new(sale.clone(), 42).with_fields(sale_fields(&sale));

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    let sql = &compiled.sql;

    // Two tagged branches, invoice side unmodified, credit side negated.
    assert!(sql.contains("'invoice' AS type"));
    assert!(sql.contains("'credit_note' AS type"));
    assert!(sql.contains("invoice_2.balance AS balance"));
    assert!(sql.contains("invoice_2.subtotal AS subtotal"));
    assert!(sql.contains("invoice_2.total AS total"));
    assert!(sql.contains("- credit_note_3.balance AS balance"));
    assert!(sql.contains("- credit_note_3.subtotal AS subtotal"));
    assert!(sql.contains("- credit_note_3.total AS total"));

    // Both branches carry the tenant predicate and nothing else.
    assert!(sql.contains("FROM invoices AS invoice_2 WHERE invoice_2.tenant_id = ? UNION ALL"));
    assert!(sql.contains("FROM credit_notes AS credit_note_3 WHERE credit_note_3.tenant_id = ?) AS sale_1"));

    // The union is parenthesized and stands in for the FROM table.
    assert!(sql.contains("FROM (SELECT"));
    assert!(sql.ends_with("WHERE sale_1.tenant_id = ?"));
    assert_eq!(compiled.params, vec![json!(42), json!(42), json!(42)]);
}

#[test]
fn test_primary_pushes_joins_and_filter_into_branches() {
    let sale = Table::new("sale");
    let customer = Table::new("customer");
    let join = JoinCondition::new(sale.clone(), customer.clone());
    let filter = Filter::new(vec![
        FilterCondition::leaf(field(&sale, "total"), ">", json!(100)),
        FilterCondition::leaf(field(&customer, "country"), "=", json!("US")),
    ]);
    let query = DataQuery::new(sale.clone(), 42)
        .with_fields(sale_fields(&sale))
        .with_joins(vec![join].into())
        .with_filter(filter);

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    let sql = &compiled.sql;

    // Joins declared against the placeholder re-home onto each source.
    assert!(sql.contains("LEFT JOIN customers AS customer_2 ON customer_2.id = invoice_3.customer_id"));
    assert!(sql.contains("LEFT JOIN customers AS customer_2 ON customer_2.id = credit_note_4.customer_id"));
    // ...and are still emitted at the outer level against the union alias.
    assert!(sql.contains("LEFT JOIN customers AS customer_2 ON customer_2.id = sale_1.customer_id"));

    // Placeholder references in the carried filter resolve to each source.
    assert!(sql.contains("invoice_3.total > ?"));
    assert!(sql.contains("credit_note_4.total > ?"));
    assert!(sql.contains("sale_1.total > ?"));

    // tenant + 2 filter values, once per branch and once at the outer level
    assert_eq!(compiled.params.len(), 9);
}

#[test]
fn test_joined_into_branches_keep_only_tenant_predicate() {
    let customer = Table::new("customer");
    let sale = Table::new("sale");
    let mut aliases = AliasAllocator::new();
    let fields = Fields::new(
        vec![
            SelectColumn::new(field(&customer, "name")),
            SelectColumn::new(func(
                "sum",
                vec![typed_field(&sale, "total", ValueType::Float)],
            )),
        ],
        &mut aliases,
    );
    let join = JoinCondition::new(customer.clone(), sale.clone()).with_params(
        JoinParams::new()
            .with_parent_column("id")
            .with_join_column("customer_id"),
    );
    let filter = Filter::new(vec![FilterCondition::leaf(
        field(&sale, "status"),
        "=",
        json!("paid"),
    )]);
    let query = DataQuery::new(customer.clone(), 42)
        .with_fields(fields)
        .with_joins(vec![join].into())
        .with_filter(filter)
        .with_group(Group::new(vec![GroupField::new(field(&customer, "name"))]));

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    let sql = &compiled.sql;

    // The union splices in as the join target.
    assert!(sql.contains("LEFT JOIN (SELECT 'invoice' AS type"));
    assert!(sql.contains(") AS sale_2 ON sale_2.customer_id = customer_1.id"));

    // Each branch restricts on tenant only; the user filter and any joins
    // apply after the union, at the outer level.
    assert!(sql.contains("FROM invoices AS invoice_3 WHERE invoice_3.tenant_id = ? UNION ALL"));
    assert!(sql.contains("FROM credit_notes AS credit_note_4 WHERE credit_note_4.tenant_id = ?) AS sale_2"));
    assert!(sql.contains("sale_2.status = ?"));
    assert!(sql.contains(" GROUP BY customer_1.name"));
    assert_eq!(
        compiled.params,
        vec![json!(42), json!(42), json!(42), json!("paid")]
    );
}

#[test]
fn test_reference_column_uses_union_discriminator() {
    let sale = Table::new("sale");
    let query = DataQuery::new(sale.clone(), 42)
        .with_fields(sale_fields(&sale))
        .with_reference_columns();

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled
        .sql
        .contains("CONCAT(sale_1.type, '-', sale_1.id) AS sale_reference"));
}

#[test]
fn test_compilation_is_deterministic_with_fresh_contexts() {
    let sale = Table::new("sale");
    let query = DataQuery::new(sale.clone(), 42)
        .with_fields(sale_fields(&sale))
        .with_filter(Filter::new(vec![FilterCondition::leaf(
            field(&sale, "total"),
            ">",
            json!(0),
        )]));

    let virtuals = VirtualTables::default();
    let first = compile_query(&query, &virtuals).unwrap();
    let second = compile_query(&query, &virtuals).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_primary_and_self_join_expand_independently() {
    // `sale` as the report subject and joined again under a distinct alias:
    // each reference expands on its own and the two cannot interfere.
    let sale = Table::new("sale");
    let related = Table::new("sale").with_alias("related_sale");
    let join = JoinCondition::new(sale.clone(), related).with_params(
        JoinParams::new()
            .with_parent_column("customer_id")
            .with_join_column("customer_id"),
    );
    let query = DataQuery::new(sale.clone(), 42)
        .with_fields(sale_fields(&sale))
        .with_joins(vec![join].into());

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    let sql = &compiled.sql;

    // Outer join attaches to the union alias; re-homed copies attach to the
    // concrete sources inside each branch.
    assert!(sql.contains("AS related_sale_2 ON related_sale_2.customer_id = sale_1.customer_id"));
    assert!(sql.contains("AS related_sale_2 ON related_sale_2.customer_id = invoice_3.customer_id"));
}
