use report_builder::prelude::*;
use serde_json::json;

fn select(table: &Table, names: &[&str]) -> Fields {
    let mut aliases = AliasAllocator::new();
    Fields::new(
        names
            .iter()
            .map(|name| SelectColumn::new(field(table, name)))
            .collect(),
        &mut aliases,
    )
}

#[test]
fn test_simple_select() {
    let table = Table::new("invoice");
    let query =
        DataQuery::new(table.clone(), 42).with_fields(select(&table, &["number", "total"]));

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    insta::assert_snapshot!(
        compiled.sql,
        @"SELECT invoice_1.number AS column_1, invoice_1.total AS column_2 FROM invoices AS invoice_1 WHERE invoice_1.tenant_id = ?"
    );
    assert_eq!(compiled.params, vec![json!(42)]);
}

#[test]
fn test_default_join_clause() {
    let invoice = Table::new("invoice");
    let customer = Table::new("customer");
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_joins(vec![JoinCondition::new(invoice.clone(), customer)].into());

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled
        .sql
        .contains("LEFT JOIN customers AS customer_2 ON customer_2.id = invoice_1.customer_id"));
}

#[test]
fn test_polymorphic_discriminators() {
    let payment = Table::new("payment");
    let invoice = Table::new("invoice");
    let join = JoinCondition::new(payment.clone(), invoice).with_params(
        JoinParams::new()
            .with_parent_column("related_id")
            .with_parent_type_column("related_type"),
    );
    let query = DataQuery::new(payment.clone(), 42)
        .with_fields(select(&payment, &["amount"]))
        .with_joins(vec![join].into());

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled
        .sql
        .contains("ON invoice_2.id = payment_1.related_id AND payment_1.related_type = 'invoice'"));
}

#[test]
fn test_join_through_intermediate_table() {
    let invoice = Table::new("invoice");
    let product = Table::new("product");
    let join = JoinCondition::new(invoice.clone(), product)
        .with_params(JoinParams::new().through(JoinThrough::new(Table::new("invoice_item"))));
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_joins(vec![join].into());

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled
        .sql
        .contains("LEFT JOIN invoice_items AS invoice_item_2 ON invoice_item_2.invoice_id = invoice_1.id"));
    assert!(compiled
        .sql
        .contains("LEFT JOIN products AS product_3 ON product_3.id = invoice_item_2.product_id"));
}

#[test]
fn test_filter_tree_and_params_order() {
    let invoice = Table::new("invoice");
    let filter = Filter::new(vec![
        FilterCondition::leaf(field(&invoice, "status"), "in", vec![json!(2), json!(3)]),
        FilterCondition::any(vec![
            FilterCondition::leaf(field(&invoice, "balance"), ">", json!(0)),
            FilterCondition::leaf(field(&invoice, "due_date"), "is_null", json!(null)),
        ]),
    ]);
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_filter(filter);

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled.sql.contains("invoice_1.status IN (?, ?)"));
    assert!(compiled
        .sql
        .contains("(invoice_1.balance > ? OR invoice_1.due_date IS NULL)"));
    // Tenant binds first, then filter values in emission order.
    assert_eq!(compiled.params, vec![json!(42), json!(2), json!(3), json!(0)]);
}

#[test]
fn test_between_and_like() {
    let invoice = Table::new("invoice");
    let filter = Filter::new(vec![
        FilterCondition::leaf(
            field(&invoice, "date"),
            "between",
            vec![json!("2026-01-01"), json!("2026-01-31")],
        ),
        FilterCondition::leaf(field(&invoice, "number"), "like", json!("INV-%")),
    ]);
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_filter(filter);

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled.sql.contains("invoice_1.date BETWEEN ? AND ?"));
    assert!(compiled.sql.contains("invoice_1.number LIKE ?"));
}

#[test]
fn test_group_sort_limit() {
    let invoice = Table::new("invoice");
    let mut aliases = AliasAllocator::new();
    let fields = Fields::new(
        vec![
            SelectColumn::new(field(&invoice, "status")),
            SelectColumn::new(func(
                "sum",
                vec![typed_field(&invoice, "total", ValueType::Float)],
            ))
            .summarizable(),
        ],
        &mut aliases,
    );
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(fields)
        .with_group(Group::new(vec![GroupField::new(field(&invoice, "status"))]))
        .with_sort(Sort::new(vec![
            SortField::new(field(&invoice, "status")),
            SortField::new(field(&invoice, "date")).descending(),
        ]))
        .with_max_results(10);

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled.sql.contains("SUM(invoice_1.total)"));
    assert!(compiled.sql.contains(" GROUP BY invoice_1.status"));
    assert!(compiled
        .sql
        .contains(" ORDER BY invoice_1.status ASC, invoice_1.date DESC"));
    assert!(compiled.sql.ends_with(" LIMIT 10"));
}

#[test]
fn test_count_star_and_count_distinct() {
    let invoice = Table::new("invoice");
    let mut aliases = AliasAllocator::new();
    let fields = Fields::new(
        vec![
            SelectColumn::new(func("count", vec![])),
            SelectColumn::new(func("count_distinct", vec![field(&invoice, "customer_id")])),
        ],
        &mut aliases,
    );
    let query = DataQuery::new(invoice.clone(), 42).with_fields(fields);

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled.sql.contains("COUNT(*) AS column_1"));
    assert!(compiled
        .sql
        .contains("COUNT(DISTINCT invoice_1.customer_id) AS column_2"));
}

#[test]
fn test_reference_column_for_physical_table() {
    let invoice = Table::new("invoice");
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_reference_columns();

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled
        .sql
        .contains("CONCAT('invoice', '-', invoice_1.id) AS invoice_reference"));
}

#[test]
fn test_empty_select_is_rejected() {
    let query = DataQuery::new(Table::new("invoice"), 42);
    let err = compile_query(&query, &VirtualTables::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Generate(GenerateError::EmptySelect)
    ));
}

#[test]
fn test_unknown_operator_is_rejected() {
    let invoice = Table::new("invoice");
    let filter = Filter::new(vec![FilterCondition::leaf(
        field(&invoice, "status"),
        "resembles",
        json!(1),
    )]);
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_filter(filter);

    let err = compile_query(&query, &VirtualTables::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Generate(GenerateError::UnknownOperator(op)) if op == "resembles"
    ));
}

#[test]
fn test_leaf_without_expression_is_rejected() {
    let invoice = Table::new("invoice");
    let filter = Filter::new(vec![FilterCondition {
        expression: None,
        operator: "=".into(),
        value: FilterValue::Scalar(json!(1)),
    }]);
    let query = DataQuery::new(invoice.clone(), 42)
        .with_fields(select(&invoice, &["number"]))
        .with_filter(filter);

    let err = compile_query(&query, &VirtualTables::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Generate(GenerateError::MissingExpression(_))
    ));
}

#[test]
fn test_string_constants_are_escaped() {
    let invoice = Table::new("invoice");
    let mut aliases = AliasAllocator::new();
    let fields = Fields::new(
        vec![SelectColumn::new(constant("O'Brien"))],
        &mut aliases,
    );
    let query = DataQuery::new(invoice, 42).with_fields(fields);

    let compiled = compile_query(&query, &VirtualTables::default()).unwrap();
    assert!(compiled.sql.contains("'O''Brien' AS column_1"));
}
