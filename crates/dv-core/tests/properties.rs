use dv_core::{
    ColumnSpec, FacetCount, FilterCriterion, FilterPredicate, GroupKey, Record, TableState,
    TableStateEngine, Value,
};

fn catalog() -> Vec<Record> {
    let rows: [(&str, &str, &str, Option<f64>, Option<f64>, &str); 8] = [
        ("Widget", "Tools", "Hand", Some(10.0), None, "2024-01-03T09:00:00Z"),
        ("Gadget", "Toys", "Puzzle", Some(20.0), Some(18.0), "2024-02-14T12:30:00Z"),
        ("Widget Pro", "Tools", "Power", Some(15.0), Some(12.0), "2024-01-20T08:00:00Z"),
        ("Doohickey", "Garden", "Hand", Some(7.5), None, "2023-12-30T16:45:00Z"),
        ("Gizmo", "Toys", "Electronic", Some(20.0), None, "not recorded"),
        ("Sprocket", "Tools", "Hand", None, Some(3.0), "2024-03-01T00:00:00Z"),
        ("Thingamajig", "Garden", "Power", Some(42.0), Some(40.0), "2024-02-29T23:59:59Z"),
        ("Whatsit", "Toys", "Puzzle", Some(10.0), None, "2024-01-03T18:00:00Z"),
    ];

    rows.iter()
        .map(|(name, category, subcategory, price, sale_price, created_at)| {
            Record::new()
                .with("name", *name)
                .with("category", *category)
                .with("subcategory", *subcategory)
                .with("price", *price)
                .with("sale_price", *sale_price)
                .with("created_at", *created_at)
        })
        .collect()
}

fn engine() -> TableStateEngine {
    TableStateEngine::new(vec![
        ColumnSpec::text("name").with_header("Name"),
        ColumnSpec::categorical("category").with_header("Category"),
        ColumnSpec::categorical("subcategory").with_header("Subcategory"),
        ColumnSpec::numeric("price").with_header("Price"),
        ColumnSpec::numeric("sale_price").with_header("Sales Price"),
        ColumnSpec::date("created_at").with_header("Created At"),
    ])
    .unwrap()
}

fn filtered(criteria: Vec<FilterCriterion>) -> Vec<usize> {
    let records = catalog();
    engine().matching_indices(&records, &TableState::new().set_filters(criteria))
}

fn date(s: &str) -> Option<chrono::NaiveDate> {
    dv_core::parse_date(s)
}

#[test]
fn test_full_bounds_range_is_a_no_op() {
    let records = catalog();
    let engine = engine();
    let facets = engine.compute_facets(&records);
    let unfiltered = engine.matching_indices(&records, &TableState::new());

    for column in ["price", "sale_price"] {
        let (min, max) = facets[column].numeric_bounds().unwrap().as_pair().unwrap();
        let state = TableState::new()
            .set_filter(FilterCriterion::new(column, FilterPredicate::numeric_range(min, max)));
        assert_eq!(engine.matching_indices(&records, &state), unfiltered, "column {column}");
    }
}

#[test]
fn test_filters_combine_as_intersection() {
    let by_category = FilterCriterion::new("category", FilterPredicate::in_set(["Tools", "Toys"]));
    let by_price = FilterCriterion::new("price", FilterPredicate::numeric_range(10.0, 18.0));
    let by_date = FilterCriterion::new("created_at", FilterPredicate::date_range(date("2024-01-01"), None));

    let pairs = [
        (by_category.clone(), by_price.clone()),
        (by_category.clone(), by_date.clone()),
        (by_price, by_date),
    ];

    for (f1, f2) in pairs {
        let left = filtered(vec![f1.clone()]);
        let right = filtered(vec![f2.clone()]);
        let expected: Vec<usize> = left.iter().copied().filter(|idx| right.contains(idx)).collect();
        assert_eq!(filtered(vec![f1, f2]), expected);
    }
}

#[test]
fn test_sort_is_stable_across_calls() {
    let records = catalog();
    let engine = engine();
    let state = TableState::new().set_sort("category", false);

    let first = engine.apply(&records, &state).indices();
    // Tools rows 0, 2, 5 keep their input order, as do Toys 1, 4, 7 and Garden 3, 6
    assert_eq!(first, vec![3, 6, 0, 2, 5, 1, 4, 7]);

    for _ in 0..5 {
        assert_eq!(engine.apply(&records, &state).indices(), first);
    }
}

#[test]
fn test_secondary_sort_key_breaks_ties() {
    let records = catalog();
    let state = TableState::new().set_sort("price", true).set_sort("name", false);
    let view = engine().apply(&records, &state);
    let names: Vec<String> = view.records().map(|r| r.get("name").to_string()).collect();

    assert_eq!(
        names,
        vec!["Thingamajig", "Gadget", "Gizmo", "Widget Pro", "Whatsit", "Widget", "Doohickey", "Sprocket"]
    );
}

#[test]
fn test_cleared_filters_equal_absent_filters() {
    let baseline = filtered(Vec::new());
    let cleared = vec![
        FilterCriterion::new("name", FilterPredicate::contains("")),
        FilterCriterion::new("category", FilterPredicate::in_set(Vec::<String>::new())),
        FilterCriterion::new("created_at", FilterPredicate::date_range(None, None)),
    ];

    for criterion in cleared {
        assert_eq!(filtered(vec![criterion]), baseline);
    }

    // Cleared criteria smuggled in through a deserialized state behave the same
    let records = catalog();
    let state: TableState = serde_json::from_str(
        r#"{"filters": {
            "name": {"kind": "text_contains", "text": ""},
            "category": {"kind": "in_set", "values": []},
            "created_at": {"kind": "date_range", "start": null, "end": null}
        }}"#,
    )
    .unwrap();
    assert_eq!(engine().matching_indices(&records, &state), baseline);
}

#[test]
fn test_facets_list_values_in_first_seen_order() {
    let records = vec![
        Record::new().with("cat", "A"),
        Record::new().with("cat", "B"),
        Record::new().with("cat", "A"),
    ];
    let engine = TableStateEngine::new(vec![ColumnSpec::categorical("cat")]).unwrap();
    let facets = engine.compute_facets(&records);

    assert_eq!(
        facets["cat"].options().unwrap().to_vec(),
        vec![FacetCount::new("A", 2), FacetCount::new("B", 1)]
    );
}

#[test]
fn test_search_then_sort_end_to_end() {
    let records = vec![
        Record::new().with("name", "Widget").with("price", 10),
        Record::new().with("name", "Gadget").with("price", 20),
        Record::new().with("name", "Widget Pro").with("price", 15),
    ];
    let engine = TableStateEngine::new(vec![ColumnSpec::text("name"), ColumnSpec::numeric("price")]).unwrap();

    let state = TableState::new().set_filter(FilterCriterion::new("name", FilterPredicate::contains("widget")));
    let view = engine.apply(&records, &state);
    let names: Vec<String> = view.records().map(|r| r.get("name").to_string()).collect();
    assert_eq!(names, vec!["Widget", "Widget Pro"]);

    let state = state.set_sort("price", true);
    let view = engine.apply(&records, &state);
    let rows: Vec<(String, Value)> = view
        .records()
        .map(|r| (r.get("name").to_string(), r.get("price").clone()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Widget Pro".to_string(), Value::Number(15.0)),
            ("Widget".to_string(), Value::Number(10.0)),
        ]
    );
}

#[test]
fn test_unknown_columns_are_ignored() {
    let records = catalog();
    let engine = engine();
    let baseline = engine.apply(&records, &TableState::new()).indices();

    let state = TableState::new()
        .set_filter(FilterCriterion::new("discontinued", FilterPredicate::contains("yes")))
        .set_filter(FilterCriterion::new("weight", FilterPredicate::numeric_range(1.0, 2.0)))
        .set_sort("rating", true)
        .set_grouping("warehouse")
        .set_column_visibility("barcode", false);
    let view = engine.apply(&records, &state);

    assert_eq!(view.indices(), baseline);
    assert!(!view.is_grouped());
    assert_eq!(view.columns.len(), engine.columns().len());
}

#[test]
fn test_grouping_keeps_sort_order_within_groups() {
    let records = vec![
        Record::new().with("id", "A1").with("group", "A"),
        Record::new().with("id", "B1").with("group", "B"),
        Record::new().with("id", "A2").with("group", "A"),
    ];
    let engine = TableStateEngine::new(vec![ColumnSpec::text("id"), ColumnSpec::categorical("group")]).unwrap();
    let view = engine.apply(&records, &TableState::new().set_grouping("group"));

    let rows: Vec<(String, Option<GroupKey>)> = view
        .rows
        .iter()
        .map(|row| (row.value("id").to_string(), row.group.clone()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("A1".to_string(), Some(GroupKey::Value("A".into()))),
            ("A2".to_string(), Some(GroupKey::Value("A".into()))),
            ("B1".to_string(), Some(GroupKey::Value("B".into()))),
        ]
    );
}

#[test]
fn test_date_range_skips_unparsable_dates() {
    let records = catalog();
    let state = TableState::new().set_filter(FilterCriterion::new(
        "created_at",
        FilterPredicate::date_range(date("2024-01-03"), date("2024-02-14")),
    ));
    let view = engine().apply(&records, &state);
    let names: Vec<String> = view.records().map(|r| r.get("name").to_string()).collect();

    assert_eq!(names, vec!["Widget", "Gadget", "Widget Pro", "Whatsit"]);
}

#[test]
fn test_sale_price_facet_ignores_missing_prices() {
    let records = catalog();
    let facets = engine().compute_facets(&records);

    assert_eq!(facets["sale_price"].numeric_bounds().unwrap().as_pair(), Some((3.0, 40.0)));
    assert_eq!(facets["price"].numeric_bounds().unwrap().as_pair(), Some((7.5, 42.0)));
}

#[test]
fn test_mixed_price_column_sorts_consistently() {
    let mut records = catalog();
    for (idx, price) in ["12", "n/a", "9.5", "call us", "100"].iter().enumerate() {
        records.push(Record::new().with("name", format!("Extra {idx}")).with("price", *price));
    }
    let engine = engine();

    for descending in [false, true] {
        let state = TableState::new().set_sort("price", descending);
        let first = engine.apply(&records, &state).indices();
        assert_eq!(first.len(), records.len());
        assert_eq!(engine.apply(&records, &state).indices(), first);
    }

    let view = engine.apply(&records, &TableState::new().set_sort("price", false));
    let prices: Vec<String> = view.records().map(|r| r.get("price").to_string()).collect();
    assert_eq!(
        prices,
        vec!["7.5", "9.5", "10", "10", "12", "15", "20", "20", "42", "100", "call us", "n/a", ""]
    );
}
