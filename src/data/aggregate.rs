//! The sales aggregator: every table the dashboard displays.
//!
//! All functions here are pure functions of a [`FilteredView`]. Grouped
//! tables iterate their keys in sorted order, so ties and output order are
//! deterministic and recomputing on the same view yields identical results.
//! Groups with no rows contribute zero; only the per-product distribution
//! keeps individual rows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilteredView;
use super::model::Month;

/// Number of products shown in the "top products" ranking.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_units: u64,
    pub total_revenue: f64,
    /// `None` when no units were sold.
    pub avg_revenue_per_unit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: Month,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductUnits {
    pub product: String,
    pub units: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRevenue {
    pub region: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthProductRevenue {
    pub month: Month,
    pub product: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub revenue: f64,
    pub units: u64,
}

/// Revenue per product, one entry per row of the view.
pub type RevenueDistribution = BTreeMap<String, Vec<f64>>;

/// Revenue matrix: one row per region, one column per product.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RevenueHeatmap {
    pub regions: Vec<String>,
    pub products: Vec<String>,
    /// `cells[r][p]` is the revenue of `regions[r]` × `products[p]`.
    pub cells: Vec<Vec<f64>>,
}

impl RevenueHeatmap {
    pub fn get(&self, region: &str, product: &str) -> Option<f64> {
        let r = self.regions.iter().position(|x| x == region)?;
        let p = self.products.iter().position(|x| x == product)?;
        Some(self.cells[r][p])
    }

    /// Total revenue per region, in `regions` order.
    pub fn row_totals(&self) -> Vec<f64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    /// Total revenue per product, in `products` order.
    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.products.len())
            .map(|p| self.cells.iter().map(|row| row[p]).sum())
            .collect()
    }

    /// Largest cell, used to scale the colour gradient.
    pub fn max_cell(&self) -> f64 {
        self.cells
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

pub fn summary_metrics(view: &FilteredView<'_>) -> SummaryMetrics {
    let (total_units, total_revenue) = view
        .iter()
        .fold((0u64, 0.0f64), |(u, r), tx| (u + tx.units_sold, r + tx.revenue));

    let avg_revenue_per_unit = if total_units == 0 {
        None
    } else {
        Some(total_revenue / total_units as f64)
    };

    SummaryMetrics {
        total_units,
        total_revenue,
        avg_revenue_per_unit,
    }
}

/// Revenue summed per calendar month, oldest first.
pub fn revenue_by_month(view: &FilteredView<'_>) -> Vec<MonthlyRevenue> {
    let mut by_month: BTreeMap<Month, f64> = BTreeMap::new();
    for tx in view.iter() {
        *by_month.entry(tx.month()).or_default() += tx.revenue;
    }
    by_month
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}

/// The `n` best-selling products by units, largest first.
///
/// Ties keep product label order (the sort is stable).
pub fn top_products_by_units(view: &FilteredView<'_>, n: usize) -> Vec<ProductUnits> {
    let mut by_product: BTreeMap<&str, u64> = BTreeMap::new();
    for tx in view.iter() {
        *by_product.entry(tx.product.as_str()).or_default() += tx.units_sold;
    }

    let mut ranked: Vec<ProductUnits> = by_product
        .into_iter()
        .map(|(product, units)| ProductUnits {
            product: product.to_string(),
            units,
        })
        .collect();
    ranked.sort_by(|a, b| b.units.cmp(&a.units));
    ranked.truncate(n);
    ranked
}

pub fn revenue_by_region(view: &FilteredView<'_>) -> Vec<RegionRevenue> {
    let mut by_region: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in view.iter() {
        *by_region.entry(tx.region.as_str()).or_default() += tx.revenue;
    }
    by_region
        .into_iter()
        .map(|(region, revenue)| RegionRevenue {
            region: region.to_string(),
            revenue,
        })
        .collect()
}

/// Regions × products present in the view; absent pairs are 0.
pub fn revenue_heatmap(view: &FilteredView<'_>) -> RevenueHeatmap {
    let regions: BTreeSet<&str> = view.iter().map(|tx| tx.region.as_str()).collect();
    let products: BTreeSet<&str> = view.iter().map(|tx| tx.product.as_str()).collect();

    let regions: Vec<String> = regions.into_iter().map(str::to_string).collect();
    let products: Vec<String> = products.into_iter().map(str::to_string).collect();
    let mut cells = vec![vec![0.0; products.len()]; regions.len()];

    for tx in view.iter() {
        // Both labels were collected from this view, so the lookups succeed.
        if let (Ok(r), Ok(p)) = (
            regions.binary_search(&tx.region),
            products.binary_search(&tx.product),
        ) {
            cells[r][p] += tx.revenue;
        }
    }

    RevenueHeatmap {
        regions,
        products,
        cells,
    }
}

/// Revenue per (month, product), dense over the months and products in the view.
pub fn revenue_by_month_and_product(view: &FilteredView<'_>) -> Vec<MonthProductRevenue> {
    let mut sums: BTreeMap<(Month, &str), f64> = BTreeMap::new();
    let mut products: BTreeSet<&str> = BTreeSet::new();
    let mut months: BTreeSet<Month> = BTreeSet::new();

    for tx in view.iter() {
        months.insert(tx.month());
        products.insert(tx.product.as_str());
        *sums.entry((tx.month(), tx.product.as_str())).or_default() += tx.revenue;
    }

    months
        .iter()
        .flat_map(|&month| {
            let sums = &sums;
            products.iter().map(move |&product| MonthProductRevenue {
                month,
                product: product.to_string(),
                revenue: sums.get(&(month, product)).copied().unwrap_or(0.0),
            })
        })
        .collect()
}

/// Individual revenue values grouped by product, rows in view order.
pub fn revenue_distribution_by_product(view: &FilteredView<'_>) -> RevenueDistribution {
    let mut dist = RevenueDistribution::new();
    for tx in view.iter() {
        dist.entry(tx.product.clone()).or_default().push(tx.revenue);
    }
    dist
}

/// Revenue and units per exact date, oldest first.
pub fn daily_revenue_and_units(view: &FilteredView<'_>) -> Vec<DailyTotals> {
    let mut by_date: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();
    for tx in view.iter() {
        let entry = by_date.entry(tx.date).or_default();
        entry.0 += tx.revenue;
        entry.1 += tx.units_sold;
    }
    by_date
        .into_iter()
        .map(|(date, (revenue, units))| DailyTotals {
            date,
            revenue,
            units,
        })
        .collect()
}

/// Dataset row indices of the view, newest sale first.
///
/// Rows sharing a date keep their file order.
pub fn filtered_rows_newest_first(view: &FilteredView<'_>) -> Vec<usize> {
    let rows = &view.dataset().transactions;
    let mut indices = view.indices().to_vec();
    indices.sort_by(|&a, &b| rows[b].date.cmp(&rows[a].date));
    indices
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values outside the whiskers, ascending.
    pub outliers: Vec<f64>,
    pub count: usize,
}

impl BoxSummary {
    /// Quartiles use linear interpolation between closest ranks. Whiskers
    /// reach the most extreme values within 1.5 × IQR of the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - fence, q3 + fence);

        let lower_whisker = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
            count: sorted.len(),
        })
    }
}

/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Everything the dashboard renders for one filter
// ---------------------------------------------------------------------------

/// All derived tables for one [`FilteredView`], computed in a single pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardTables {
    pub row_count: usize,
    pub summary: SummaryMetrics,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub top_products: Vec<ProductUnits>,
    pub revenue_by_region: Vec<RegionRevenue>,
    pub heatmap: RevenueHeatmap,
    pub revenue_by_month_and_product: Vec<MonthProductRevenue>,
    pub revenue_distribution: RevenueDistribution,
    pub distribution_summaries: BTreeMap<String, BoxSummary>,
    pub daily: Vec<DailyTotals>,
}

impl Default for SummaryMetrics {
    fn default() -> Self {
        SummaryMetrics {
            total_units: 0,
            total_revenue: 0.0,
            avg_revenue_per_unit: None,
        }
    }
}

impl DashboardTables {
    pub fn compute(view: &FilteredView<'_>, top_n: usize) -> Self {
        let revenue_distribution = revenue_distribution_by_product(view);
        let distribution_summaries = revenue_distribution
            .iter()
            .filter_map(|(product, values)| {
                BoxSummary::from_values(values).map(|s| (product.clone(), s))
            })
            .collect();

        DashboardTables {
            row_count: view.len(),
            summary: summary_metrics(view),
            revenue_by_month: revenue_by_month(view),
            top_products: top_products_by_units(view, top_n),
            revenue_by_region: revenue_by_region(view),
            heatmap: revenue_heatmap(view),
            revenue_by_month_and_product: revenue_by_month_and_product(view),
            revenue_distribution,
            distribution_summaries,
            daily: daily_revenue_and_units(view),
        }
    }
}
