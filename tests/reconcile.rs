use pair_merge::output::{OUTPUT_COLUMNS, build_table, project};
use pair_merge::reconcile::{first_value_per_pair, positive_days_per_pair};
use pair_merge::{
    CanonicalField, ColumnOverrides, ReconcileInputs, RecordSet, SourceKind, ToolError, reconcile,
};

fn primary() -> RecordSet {
    RecordSet::new([
        "Depo Kodu",
        "Depo Adı",
        "Madde Kodu",
        "Madde Açıklaması",
        "Min_Miktar (Adet)",
    ])
    .with_row([" A ", "Merkez", "1", "Vida", "1.234,5"])
    .with_row(["B", "Şube", " 2 ", "Somun", "abc"])
    .with_row(["A", "Merkez", "3", "Pul", ""])
    .with_row(["A", "Merkez", "1", "Vida (tekrar)", "7"])
}

fn stock() -> RecordSet {
    RecordSet::new(["Mağaza Kodu", "Stok Kodu", "Envanter"])
        .with_row(["A", "1", "10"])
        .with_row(["A", "1", "99"])
        .with_row(["B", "2", "2,5"])
}

fn sales() -> RecordSet {
    RecordSet::new(["depo_kodu", "SKU", "Satış Adedi", "Genel Toplam"])
        .with_row(["B", "2", "4", "1.000"])
        .with_row(["Z", "9", "1", "5"])
}

fn movements() -> RecordSet {
    RecordSet::new(["Tarih", "Depo Kodu", "Madde Kodu", "Miktar"])
        .with_row(["01.01", "A", "1", "5"])
        .with_row(["02.01", "A", "1", "0"])
        .with_row(["03.01", "A", "1", "-2"])
        .with_row(["04.01", "A", "1", "3"])
        .with_row(["01.01", "B", "2", "0"])
}

fn all_inputs() -> ReconcileInputs {
    ReconcileInputs {
        primary: Some(primary()),
        stock: Some(stock()),
        sales: Some(sales()),
        day_count: Some(movements()),
    }
}

#[test]
fn merges_all_sources_in_primary_order() {
    let result = reconcile(all_inputs(), &ColumnOverrides::new()).expect("merge succeeds");
    let rows = project(&result.rows);

    let pairs: Vec<&str> = rows.iter().map(|row| row.pair.as_str()).collect();
    assert_eq!(pairs, vec!["A|1", "B|2", "A|3", "A|1"]);

    assert_eq!(rows[0].location_code, "A");
    assert_eq!(rows[0].location_name, "Merkez");
    assert_eq!(rows[0].item_description, "Vida");
    assert_eq!(rows[0].minimum_quantity, 1234.5);
    assert_eq!(rows[0].stock, 10.0);
    assert_eq!(rows[0].sales, 0.0);
    assert_eq!(rows[0].inventory_day_count, 2);

    assert_eq!(rows[1].item_code, "2");
    assert_eq!(rows[1].minimum_quantity, 0.0);
    assert_eq!(rows[1].stock, 2.5);
    assert_eq!(rows[1].sales, 1000.0);
    assert_eq!(rows[1].inventory_day_count, 0);

    assert_eq!(rows[2].stock, 0.0);
    assert_eq!(rows[2].inventory_day_count, 0);

    assert_eq!(rows[3].item_description, "Vida (tekrar)");
    assert_eq!(rows[3].minimum_quantity, 7.0);
    assert_eq!(rows[3].stock, 10.0);
}

#[test]
fn report_counts_duplicates_and_misses() {
    let result = reconcile(all_inputs(), &ColumnOverrides::new()).expect("merge succeeds");
    let report = &result.report;

    assert_eq!(report.primary_rows, 4);
    let stock = &report.sources[0];
    assert_eq!(stock.role, SourceKind::Stock);
    assert_eq!(stock.rows, 3);
    assert_eq!(stock.distinct_pairs, 2);
    assert_eq!(stock.duplicates_discarded, 1);
    assert_eq!(stock.unmatched_primary_rows, 1);

    let sales = &report.sources[1];
    assert_eq!(sales.unmatched_primary_rows, 3);

    let days = &report.sources[2];
    assert_eq!(days.role, SourceKind::DayCount);
    assert_eq!(days.distinct_pairs, 2);
    assert_eq!(days.duplicates_discarded, 0);
}

#[test]
fn absent_auxiliary_sources_default_to_zero() {
    let inputs = ReconcileInputs {
        primary: Some(primary()),
        ..ReconcileInputs::default()
    };
    let result = reconcile(inputs, &ColumnOverrides::new()).expect("merge succeeds");

    assert!(result.rows.iter().all(|row| row.stock.is_none()));
    assert!(result.report.sources.is_empty());

    let rows = project(&result.rows);
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.stock, 0.0);
        assert_eq!(row.sales, 0.0);
        assert_eq!(row.inventory_day_count, 0);
        assert!(!row.location_name.is_empty());
    }
}

#[test]
fn primary_source_is_required() {
    let inputs = ReconcileInputs {
        stock: Some(stock()),
        ..ReconcileInputs::default()
    };
    let error = reconcile(inputs, &ColumnOverrides::new()).unwrap_err();
    assert!(matches!(error, ToolError::MissingPrimarySource));
}

#[test]
fn missing_required_header_reports_aliases_and_headers() {
    let inputs = ReconcileInputs {
        primary: Some(primary()),
        sales: Some(RecordSet::new(["Depo Kodu", "Madde Kodu", "Satış"]).with_row(["A", "1", "3"])),
        ..ReconcileInputs::default()
    };
    let error = reconcile(inputs, &ColumnOverrides::new()).unwrap_err();

    match error {
        ToolError::HeaderNotFound {
            role,
            field,
            aliases,
            headers,
        } => {
            assert_eq!(role, SourceKind::Sales);
            assert_eq!(field, CanonicalField::SalesTotal);
            assert!(aliases.contains(&"toplam".to_string()));
            assert_eq!(headers, vec!["Depo Kodu", "Madde Kodu", "Satış"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn manual_selection_replaces_automatic_resolution() {
    let mut overrides = ColumnOverrides::new();
    overrides
        .apply_assignment("sales:sales_total=Satış")
        .expect("valid assignment");

    let inputs = ReconcileInputs {
        primary: Some(primary()),
        sales: Some(RecordSet::new(["Depo Kodu", "Madde Kodu", "Satış"]).with_row(["A", "1", "3"])),
        ..ReconcileInputs::default()
    };
    let result = reconcile(inputs, &overrides).expect("merge succeeds");
    assert_eq!(result.rows[0].sales, Some(3.0));
    assert_eq!(result.rows[1].sales, Some(0.0));
}

#[test]
fn manual_selection_must_name_an_existing_column() {
    let overrides =
        ColumnOverrides::from_json(r#"{"primary": {"location_name": "Yok"}}"#).expect("valid json");
    let inputs = ReconcileInputs {
        primary: Some(primary()),
        ..ReconcileInputs::default()
    };
    let error = reconcile(inputs, &overrides).unwrap_err();
    assert!(matches!(
        error,
        ToolError::UnknownColumn {
            role: SourceKind::Primary,
            field: CanonicalField::LocationName,
            ..
        }
    ));
}

#[test]
fn malformed_assignments_are_rejected() {
    let mut overrides = ColumnOverrides::new();
    for assignment in [
        "sales_total=Satış",
        "sales:sales_total",
        "nowhere:sales_total=X",
        "sales:price=X",
        "sales:sales_total=",
    ] {
        assert!(matches!(
            overrides.apply_assignment(assignment),
            Err(ToolError::InvalidOverride(_))
        ));
    }
    assert!(overrides.is_empty());
}

#[test]
fn first_row_wins_on_duplicate_pairs() {
    let pairs = vec!["A|1".to_string(), "A|1".to_string()];
    let (map, discarded) = first_value_per_pair(&pairs, &[10.0, 99.0]);
    assert_eq!(map["A|1"], 10.0);
    assert_eq!(discarded, 1);
}

#[test]
fn day_count_counts_strictly_positive_rows() {
    let pairs = vec!["A|1".to_string(); 4];
    let counts = positive_days_per_pair(&pairs, &[5.0, 0.0, -2.0, 3.0]);
    assert_eq!(counts["A|1"], 2);
}

#[test]
fn output_table_uses_fixed_column_order() {
    let result = reconcile(all_inputs(), &ColumnOverrides::new()).expect("merge succeeds");
    let table = build_table(&project(&result.rows));

    assert_eq!(table.sheet_name, "Output");
    assert_eq!(table.columns, OUTPUT_COLUMNS.to_vec());
    assert_eq!(table.rows.len(), 4);
    assert!(table.rows.iter().all(|row| row.len() == 9));
}
