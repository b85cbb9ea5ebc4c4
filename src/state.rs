use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use sales_dashboard::data::aggregate::filtered_rows_newest_first;
use sales_dashboard::data::export::write_tables_json;
use sales_dashboard::{DashboardTables, FilterSpec, FilteredView, SalesDataset};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A message shown in the top bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup and shared for the whole process.
    pub dataset: &'static SalesDataset,

    /// Current region / product / date selection.
    pub filter: FilterSpec,

    /// How many products the ranking shows.
    pub top_n: usize,

    /// Derived tables for the current filter (cached until it changes).
    pub tables: DashboardTables,

    /// Matching dataset rows, newest first, for the raw data table.
    pub rows_newest_first: Vec<usize>,

    pub region_colors: ColorMap,
    pub product_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(dataset: &'static SalesDataset, top_n: usize) -> Self {
        let mut state = Self {
            dataset,
            filter: FilterSpec::full_range(dataset),
            top_n,
            tables: DashboardTables::default(),
            rows_newest_first: Vec::new(),
            region_colors: ColorMap::new(&dataset.regions),
            product_colors: ColorMap::new(&dataset.products),
            status: None,
        };
        state.recompute();
        state
    }

    /// One full pass: filter the dataset, then rebuild every table.
    pub fn recompute(&mut self) {
        let view = FilteredView::new(self.dataset, &self.filter);
        self.tables = DashboardTables::compute(&view, self.top_n);
        self.rows_newest_first = filtered_rows_newest_first(&view);
        log::debug!(
            "Recomputed tables: {} of {} rows match {:?}",
            view.len(),
            self.dataset.len(),
            self.filter
        );
    }

    /// Replace the filter; recompute only if it actually changed.
    pub fn apply_filter(&mut self, filter: FilterSpec) -> bool {
        if filter == self.filter {
            return false;
        }
        if filter.is_reversed() && !self.filter.is_reversed() {
            let (start, end) = filter.date_range;
            log::warn!("Start date {start} is after end date {end}; no rows will match");
        }
        self.filter = filter;
        self.recompute();
        true
    }

    /// Back to all regions, all products, full date range.
    pub fn reset_filters(&mut self) -> bool {
        self.apply_filter(FilterSpec::full_range(self.dataset))
    }

    /// Date bounds for the pickers.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.dataset.date_bounds()
    }

    /// Write the current tables to `path` and record the outcome.
    pub fn export_tables(&mut self, path: &Path) -> Result<()> {
        let result = write_tables_json(&self.tables, path)
            .with_context(|| format!("exporting tables to {}", path.display()));
        self.status = Some(match &result {
            Ok(()) => Status::Info(format!("Exported tables to {}", path.display())),
            Err(e) => Status::Error(format!("Error: {e:#}")),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_dashboard::{Selection, Transaction};

    fn leaked_dataset() -> &'static SalesDataset {
        let row = |d: &str, region: &str, units: u64, revenue: f64| Transaction {
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            region: region.to_string(),
            product: "Widget".to_string(),
            units_sold: units,
            revenue,
        };
        Box::leak(Box::new(SalesDataset::from_transactions(vec![
            row("2024-01-01", "East", 10, 100.0),
            row("2024-01-02", "West", 20, 300.0),
        ])))
    }

    #[test]
    fn starts_with_everything_selected() {
        let state = AppState::new(leaked_dataset(), 10);
        assert_eq!(state.tables.row_count, 2);
        assert_eq!(state.tables.summary.total_units, 30);
        assert_eq!(state.rows_newest_first, vec![1, 0]);
    }

    #[test]
    fn unchanged_filter_does_not_recompute() {
        let mut state = AppState::new(leaked_dataset(), 10);
        let same = state.filter.clone();
        assert!(!state.apply_filter(same));
    }

    #[test]
    fn narrowing_and_resetting() {
        let mut state = AppState::new(leaked_dataset(), 10);
        let east = FilterSpec {
            region: Selection::Only("East".to_string()),
            ..state.filter.clone()
        };
        assert!(state.apply_filter(east));
        assert_eq!(state.tables.row_count, 1);
        assert_eq!(state.tables.revenue_by_region.len(), 1);

        assert!(state.reset_filters());
        assert_eq!(state.tables.row_count, 2);
    }

    #[test]
    fn reversed_range_empties_every_table() {
        let mut state = AppState::new(leaked_dataset(), 10);
        let (start, end) = state.filter.date_range;
        let reversed = FilterSpec {
            date_range: (end, start),
            ..state.filter.clone()
        };
        assert!(state.apply_filter(reversed));
        assert!(state.filter.is_reversed());
        assert_eq!(state.tables.row_count, 0);
        assert_eq!(state.tables.summary.total_units, 0);
        assert!(state.tables.revenue_by_region.is_empty());
        assert!(state.rows_newest_first.is_empty());
    }

    #[test]
    fn export_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("tables.json");
        let mut state = AppState::new(leaked_dataset(), 10);

        state.export_tables(&path).unwrap();
        assert!(path.exists());
        assert!(matches!(state.status, Some(Status::Info(_))));
    }
}
