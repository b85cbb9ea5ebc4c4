use std::fmt;

use chrono::NaiveDate;

use super::model::{SalesDataset, Transaction};

// ---------------------------------------------------------------------------
// Filter predicate: region, product and an inclusive date range
// ---------------------------------------------------------------------------

/// A categorical selector: every label, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// A label that is not in the dataset matches nothing.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(label) => label == value,
        }
    }

    /// Build from the selector's text, where `"All"` means no constraint.
    pub fn from_label(label: &str) -> Self {
        if label == "All" {
            Selection::All
        } else {
            Selection::Only(label.to_string())
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "All"),
            Selection::Only(label) => write!(f, "{label}"),
        }
    }
}

/// User-selected constraints narrowing the dataset for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub region: Selection,
    pub product: Selection,
    /// Inclusive on both ends. A reversed range selects nothing.
    pub date_range: (NaiveDate, NaiveDate),
}

impl FilterSpec {
    /// All regions, all products, the full date span of the data.
    ///
    /// An empty dataset gets a degenerate range that still matches nothing.
    pub fn full_range(dataset: &SalesDataset) -> Self {
        let date_range = dataset
            .date_bounds()
            .unwrap_or((NaiveDate::MAX, NaiveDate::MIN));
        FilterSpec {
            region: Selection::All,
            product: Selection::All,
            date_range,
        }
    }

    /// A start date after the end date; such a filter matches no rows.
    pub fn is_reversed(&self) -> bool {
        self.date_range.0 > self.date_range.1
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        let (start, end) = self.date_range;
        self.region.matches(&tx.region)
            && self.product.matches(&tx.product)
            && start <= tx.date
            && tx.date <= end
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows matching the current FilterSpec
// ---------------------------------------------------------------------------

/// Indices of the transactions passing a [`FilterSpec`], in dataset order.
///
/// Every derived table is computed from a view, never from the dataset
/// directly, so all displayed figures agree under the same filter.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a SalesDataset, spec: &FilterSpec) -> Self {
        let indices = dataset
            .transactions
            .iter()
            .enumerate()
            .filter(|(_, tx)| spec.matches(tx))
            .map(|(i, _)| i)
            .collect();
        FilteredView { dataset, indices }
    }

    pub fn dataset(&self) -> &'a SalesDataset {
        self.dataset
    }

    /// Positions of the matching rows in the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let rows = &self.dataset.transactions;
        self.indices.iter().map(move |&i| &rows[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
