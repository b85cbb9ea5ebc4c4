use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

use sales_dashboard::data::export::{read_tables_json, write_tables_json};
use sales_dashboard::{DashboardTables, FilterSpec, FilteredView, SalesDataset, Transaction};

fn dataset() -> SalesDataset {
    let row = |d: &str, region: &str, units: u64, revenue: f64| Transaction {
        date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
        region: region.to_string(),
        product: "Widget".to_string(),
        units_sold: units,
        revenue,
    };
    SalesDataset::from_transactions(vec![
        row("2024-01-05", "East", 10, 100.0),
        row("2024-02-07", "West", 20, 300.0),
    ])
}

#[test]
fn test_export_writes_every_table() {
    let ds = dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));
    let tables = DashboardTables::compute(&view, 10);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tables.json");
    write_tables_json(&tables, &path).unwrap();

    let value = read_tables_json(&path).unwrap();
    assert_eq!(value["row_count"], json!(2));
    assert_eq!(value["summary"]["total_units"], json!(30));
    assert_eq!(value["summary"]["total_revenue"], json!(400.0));
    assert_eq!(
        value["revenue_by_month"],
        json!([
            {"month": "2024-01", "revenue": 100.0},
            {"month": "2024-02", "revenue": 300.0}
        ])
    );
    assert_eq!(value["daily"][0]["date"], json!("2024-01-05"));
    assert_eq!(value["heatmap"]["regions"], json!(["East", "West"]));
    assert_eq!(value["revenue_distribution"]["Widget"], json!([100.0, 300.0]));
}

#[test]
fn test_empty_view_exports_null_average() {
    let ds = dataset();
    let spec = FilterSpec {
        date_range: (
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
        ),
        ..FilterSpec::full_range(&ds)
    };
    let tables = DashboardTables::compute(&FilteredView::new(&ds, &spec), 10);

    let file = tempfile::NamedTempFile::new().unwrap();
    write_tables_json(&tables, file.path()).unwrap();

    let value = read_tables_json(file.path()).unwrap();
    assert_eq!(value["summary"]["avg_revenue_per_unit"], json!(null));
    assert_eq!(value["top_products"], json!([]));
}
