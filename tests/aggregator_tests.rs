use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use sales_dashboard::data::aggregate::{
    daily_revenue_and_units, filtered_rows_newest_first, revenue_by_month,
    revenue_by_month_and_product, revenue_by_region, revenue_distribution_by_product,
    revenue_heatmap, summary_metrics, top_products_by_units, DailyTotals, MonthProductRevenue,
    MonthlyRevenue, ProductUnits, RegionRevenue,
};
use sales_dashboard::{DashboardTables, FilterSpec, FilteredView, Month, SalesDataset, Selection, Transaction};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(d: &str, region: &str, product: &str, units: u64, revenue: f64) -> Transaction {
    Transaction {
        date: date(d),
        region: region.to_string(),
        product: product.to_string(),
        units_sold: units,
        revenue,
    }
}

/// East/West, one product, two dates.
fn two_region_dataset() -> SalesDataset {
    SalesDataset::from_transactions(vec![
        tx("2024-01-05", "East", "Widget", 10, 100.0),
        tx("2024-02-07", "West", "Widget", 20, 300.0),
    ])
}

fn store_dataset() -> SalesDataset {
    SalesDataset::from_transactions(vec![
        tx("2024-01-03", "East", "Widget", 5, 50.0),
        tx("2024-01-03", "West", "Gadget", 2, 70.0),
        tx("2024-01-20", "East", "Gadget", 4, 140.0),
        tx("2024-02-01", "North", "Widget", 8, 80.0),
        tx("2024-02-14", "West", "Gizmo", 8, 24.0),
        tx("2024-03-02", "East", "Widget", 1, 10.5),
        tx("2024-03-02", "North", "Gizmo", 3, 9.0),
        tx("2024-03-30", "West", "Widget", 6, 60.25),
    ])
}

fn specs(ds: &SalesDataset) -> Vec<FilterSpec> {
    let full = FilterSpec::full_range(ds);
    let mut out = vec![full.clone()];
    for region in &ds.regions {
        out.push(FilterSpec {
            region: Selection::Only(region.clone()),
            ..full.clone()
        });
    }
    for product in &ds.products {
        out.push(FilterSpec {
            product: Selection::Only(product.clone()),
            ..full.clone()
        });
    }
    out.push(FilterSpec {
        date_range: (date("2024-01-15"), date("2024-02-28")),
        ..full.clone()
    });
    out.push(FilterSpec {
        date_range: (date("2030-01-01"), date("2030-12-31")),
        ..full
    });
    out
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn test_two_region_scenario_summary() {
    let ds = two_region_dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));
    let summary = summary_metrics(&view);

    assert_eq!(summary.total_units, 30);
    assert_eq!(summary.total_revenue, 400.0);
    let avg = summary.avg_revenue_per_unit.unwrap();
    assert_eq!(format!("{avg:.2}"), "13.33");
}

#[test]
fn test_region_filter_yields_single_region_entry() {
    let ds = two_region_dataset();
    let spec = FilterSpec {
        region: Selection::Only("East".to_string()),
        ..FilterSpec::full_range(&ds)
    };
    let view = FilteredView::new(&ds, &spec);

    assert_eq!(
        revenue_by_region(&view),
        vec![RegionRevenue {
            region: "East".to_string(),
            revenue: 100.0
        }]
    );
}

#[test]
fn test_range_excluding_everything_degrades_to_zero() {
    let ds = two_region_dataset();
    let spec = FilterSpec {
        date_range: (date("2025-01-01"), date("2025-12-31")),
        ..FilterSpec::full_range(&ds)
    };
    let view = FilteredView::new(&ds, &spec);
    assert!(view.is_empty());

    let tables = DashboardTables::compute(&view, 10);
    assert_eq!(tables.row_count, 0);
    assert_eq!(tables.summary.total_units, 0);
    assert_eq!(tables.summary.total_revenue, 0.0);
    assert_eq!(tables.summary.avg_revenue_per_unit, None);
    assert!(tables.revenue_by_month.is_empty());
    assert!(tables.top_products.is_empty());
    assert!(tables.revenue_by_region.is_empty());
    assert!(tables.heatmap.is_empty());
    assert!(tables.revenue_by_month_and_product.is_empty());
    assert!(tables.revenue_distribution.is_empty());
    assert!(tables.distribution_summaries.is_empty());
    assert!(tables.daily.is_empty());
    assert!(filtered_rows_newest_first(&view).is_empty());
}

#[test]
fn test_zero_units_has_no_average() {
    let ds = SalesDataset::from_transactions(vec![tx("2024-01-01", "East", "Widget", 0, 0.0)]);
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));
    let summary = summary_metrics(&view);
    assert_eq!(summary.total_units, 0);
    assert_eq!(summary.avg_revenue_per_unit, None);
}

#[test]
fn test_unknown_product_is_an_empty_view() {
    let ds = store_dataset();
    let spec = FilterSpec {
        product: Selection::Only("Flux Capacitor".to_string()),
        ..FilterSpec::full_range(&ds)
    };
    let view = FilteredView::new(&ds, &spec);
    assert!(view.is_empty());
    assert_eq!(summary_metrics(&view).total_revenue, 0.0);
}

#[test]
fn test_revenue_by_month_is_chronological() {
    let ds = store_dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));

    assert_eq!(
        revenue_by_month(&view),
        vec![
            MonthlyRevenue {
                month: Month { year: 2024, month: 1 },
                revenue: 260.0
            },
            MonthlyRevenue {
                month: Month { year: 2024, month: 2 },
                revenue: 104.0
            },
            MonthlyRevenue {
                month: Month { year: 2024, month: 3 },
                revenue: 79.75
            },
        ]
    );
}

#[test]
fn test_top_products_ties_keep_label_order() {
    let ds = store_dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));

    // Widget 20, Gizmo 11, Gadget 6.
    assert_eq!(
        top_products_by_units(&view, 10),
        vec![
            ProductUnits { product: "Widget".into(), units: 20 },
            ProductUnits { product: "Gizmo".into(), units: 11 },
            ProductUnits { product: "Gadget".into(), units: 6 },
        ]
    );

    let tied = SalesDataset::from_transactions(vec![
        tx("2024-01-01", "East", "Zeta", 5, 1.0),
        tx("2024-01-01", "East", "Alpha", 5, 1.0),
        tx("2024-01-01", "East", "Mid", 9, 1.0),
    ]);
    let view = FilteredView::new(&tied, &FilterSpec::full_range(&tied));
    let names: Vec<String> = top_products_by_units(&view, 2)
        .into_iter()
        .map(|p| p.product)
        .collect();
    assert_eq!(names, vec!["Mid".to_string(), "Alpha".to_string()]);
}

#[test]
fn test_top_products_respects_limit_and_order() {
    let ds = store_dataset();
    for spec in specs(&ds) {
        let view = FilteredView::new(&ds, &spec);
        for n in [0, 1, 2, 10] {
            let top = top_products_by_units(&view, n);
            assert!(top.len() <= n);
            assert!(top.windows(2).all(|w| w[0].units >= w[1].units));
        }
    }
}

#[test]
fn test_region_totals_match_summary() {
    let ds = store_dataset();
    for spec in specs(&ds) {
        let view = FilteredView::new(&ds, &spec);
        let by_region: f64 = revenue_by_region(&view).iter().map(|r| r.revenue).sum();
        assert!(close(by_region, summary_metrics(&view).total_revenue), "{spec:?}");
    }
}

#[test]
fn test_heatmap_reconciles_with_region_and_product_totals() {
    let ds = store_dataset();
    for spec in specs(&ds) {
        let view = FilteredView::new(&ds, &spec);
        let heatmap = revenue_heatmap(&view);

        let regions = revenue_by_region(&view);
        assert_eq!(heatmap.regions.len(), regions.len());
        for (total, r) in heatmap.row_totals().iter().zip(&regions) {
            assert!(close(*total, r.revenue));
        }

        let dist = revenue_distribution_by_product(&view);
        assert_eq!(heatmap.products.len(), dist.len());
        for (total, (product, values)) in heatmap.column_totals().iter().zip(&dist) {
            let expected: f64 = values.iter().sum();
            assert!(close(*total, expected), "{product}");
        }
    }
}

#[test]
fn test_heatmap_fills_missing_pairs_with_zero() {
    let ds = store_dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));
    let heatmap = revenue_heatmap(&view);

    assert_eq!(heatmap.regions, vec!["East", "North", "West"]);
    assert_eq!(heatmap.products, vec!["Gadget", "Gizmo", "Widget"]);
    assert_eq!(heatmap.get("East", "Gizmo"), Some(0.0));
    assert_eq!(heatmap.get("East", "Widget"), Some(60.5));
    assert_eq!(heatmap.get("North", "Gadget"), Some(0.0));
}

#[test]
fn test_month_product_table_is_dense() {
    let ds = store_dataset();
    let spec = FilterSpec {
        region: Selection::Only("West".to_string()),
        ..FilterSpec::full_range(&ds)
    };
    let view = FilteredView::new(&ds, &spec);
    let jan = Month { year: 2024, month: 1 };
    let feb = Month { year: 2024, month: 2 };
    let mar = Month { year: 2024, month: 3 };
    let row = |month, product: &str, revenue| MonthProductRevenue {
        month,
        product: product.to_string(),
        revenue,
    };

    assert_eq!(
        revenue_by_month_and_product(&view),
        vec![
            row(jan, "Gadget", 70.0),
            row(jan, "Gizmo", 0.0),
            row(jan, "Widget", 0.0),
            row(feb, "Gadget", 0.0),
            row(feb, "Gizmo", 24.0),
            row(feb, "Widget", 0.0),
            row(mar, "Gadget", 0.0),
            row(mar, "Gizmo", 0.0),
            row(mar, "Widget", 60.25),
        ]
    );
}

#[test]
fn test_distribution_keeps_every_row() {
    let ds = store_dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));
    let dist = revenue_distribution_by_product(&view);

    assert_eq!(dist["Widget"], vec![50.0, 80.0, 10.5, 60.25]);
    assert_eq!(dist["Gadget"], vec![70.0, 140.0]);
    assert_eq!(dist["Gizmo"], vec![24.0, 9.0]);
    assert_eq!(dist.values().map(Vec::len).sum::<usize>(), view.len());
}

#[test]
fn test_daily_totals_group_by_exact_date() {
    let ds = store_dataset();
    let spec = FilterSpec {
        date_range: (date("2024-01-01"), date("2024-01-31")),
        ..FilterSpec::full_range(&ds)
    };
    let view = FilteredView::new(&ds, &spec);

    assert_eq!(
        daily_revenue_and_units(&view),
        vec![
            DailyTotals {
                date: date("2024-01-03"),
                revenue: 120.0,
                units: 7
            },
            DailyTotals {
                date: date("2024-01-20"),
                revenue: 140.0,
                units: 4
            },
        ]
    );
}

#[test]
fn test_rows_newest_first_are_stable() {
    let ds = store_dataset();
    let view = FilteredView::new(&ds, &FilterSpec::full_range(&ds));
    assert_eq!(filtered_rows_newest_first(&view), vec![7, 5, 6, 4, 3, 2, 0, 1]);
}

#[test]
fn test_recomputing_is_idempotent() {
    let ds = store_dataset();
    for spec in specs(&ds) {
        let view = FilteredView::new(&ds, &spec);
        assert_eq!(DashboardTables::compute(&view, 10), DashboardTables::compute(&view, 10));
    }
}

#[test]
fn test_view_is_a_subset_of_the_dataset() {
    let ds = store_dataset();
    for spec in specs(&ds) {
        let view = FilteredView::new(&ds, &spec);
        assert!(view.indices().iter().all(|&i| i < ds.len()));
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
        assert!(view.iter().all(|tx| spec.matches(tx)));
    }
}
