use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Transaction – one row of the sales file
// ---------------------------------------------------------------------------

/// A single sales record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub region: String,
    pub product: String,
    pub units_sold: u64,
    pub revenue: f64,
}

impl Transaction {
    /// Calendar month the sale falls in.
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }
}

// ---------------------------------------------------------------------------
// Month – grouping key for monthly series
// ---------------------------------------------------------------------------

/// A calendar month, ordered chronologically and shown as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, handy as a continuous plot axis.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// Inverse of [`Month::ordinal`].
    pub fn from_ordinal(ordinal: i64) -> Self {
        Month {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed catalogues for the filter widgets.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All transactions in file order.
    pub transactions: Vec<Transaction>,
    /// Sorted unique region labels.
    pub regions: BTreeSet<String>,
    /// Sorted unique product labels.
    pub products: BTreeSet<String>,
    /// Earliest sale date (`None` only for an empty dataset).
    pub min_date: Option<NaiveDate>,
    /// Latest sale date.
    pub max_date: Option<NaiveDate>,
}

impl SalesDataset {
    /// Build catalogues and date bounds from the loaded transactions.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut regions = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut min_date: Option<NaiveDate> = None;
        let mut max_date: Option<NaiveDate> = None;

        for tx in &transactions {
            if !regions.contains(&tx.region) {
                regions.insert(tx.region.clone());
            }
            if !products.contains(&tx.product) {
                products.insert(tx.product.clone());
            }
            min_date = Some(min_date.map_or(tx.date, |d| d.min(tx.date)));
            max_date = Some(max_date.map_or(tx.date, |d| d.max(tx.date)));
        }

        SalesDataset {
            transactions,
            regions,
            products,
            min_date,
            max_date,
        }
    }

    /// Inclusive date bounds of the data, if any rows exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.min_date?, self.max_date?))
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
