use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Date32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{SalesDataset, Transaction};
use crate::error::LoadError;

/// Columns every sales file must provide. Any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "region", "product", "units_sold", "revenue"];

/// Days from 0001-01-01 (CE) to the Unix epoch, for Arrow `Date32` values.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the [`REQUIRED_COLUMNS`]
/// * `.json`    – `[{ "date": "2024-01-31", "region": ..., ... }, ...]`
/// * `.parquet` – one column per field, `date` as Date32 or text
///
/// Every row is validated; a single bad row fails the whole load.
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let transactions = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    if transactions.is_empty() {
        return Err(LoadError::NoRows);
    }
    check_unit_total(&transactions)?;

    log::debug!(
        "Parsed {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(SalesDataset::from_transactions(transactions))
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Transaction>, LoadError> {
    let file = open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let mut idx = [0usize; 5];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))?;
    }
    let [date_idx, region_idx, product_idx, units_idx, revenue_idx] = idx;

    let mut transactions = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let cell = |col: usize| record.get(col).unwrap_or("");

        transactions.push(Transaction {
            date: parse_date(row, cell(date_idx))?,
            region: parse_label(row, "region", cell(region_idx))?,
            product: parse_label(row, "product", cell(product_idx))?,
            units_sold: parse_units(row, cell(units_idx))?,
            revenue: parse_revenue(row, cell(revenue_idx))?,
        });
    }

    Ok(transactions)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
fn load_json(path: &Path) -> Result<Vec<Transaction>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::JsonShape(json_kind(&root)))?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let row = i + 1;
            let obj = rec
                .as_object()
                .ok_or_else(|| LoadError::invalid_row(row, "not a JSON object"))?;

            Ok(Transaction {
                date: parse_date(row, &json_field(obj, row, "date")?)?,
                region: parse_label(row, "region", &json_field(obj, row, "region")?)?,
                product: parse_label(row, "product", &json_field(obj, row, "product")?)?,
                units_sold: parse_units(row, &json_field(obj, row, "units_sold")?)?,
                revenue: parse_revenue(row, &json_field(obj, row, "revenue")?)?,
            })
        })
        .collect()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn json_field(obj: &Map<String, JsonValue>, row: usize, name: &str) -> Result<String, LoadError> {
    match obj.get(name) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        Some(JsonValue::Null) | None => Err(LoadError::invalid_row(row, format!("missing '{name}'"))),
        Some(other) => Err(LoadError::invalid_row(
            row,
            format!("'{name}' has unexpected value {other}"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// Accepted column types:
/// - `date`: Date32, Date64 or text
/// - `region`, `product`: any string type (including dictionary-encoded)
/// - `units_sold`: any integer type
/// - `revenue`: any numeric type
fn load_parquet(path: &Path) -> Result<Vec<Transaction>, LoadError> {
    let file = open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut transactions = Vec::new();
    let mut row = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let column = |name: &'static str| -> Result<ArrayRef, LoadError> {
            let i = schema
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name))?;
            Ok(batch.column(i).clone())
        };

        let dates = DateColumn::new(column("date")?)?;
        let regions = cast(&column("region")?, &DataType::Utf8)?;
        let products = cast(&column("product")?, &DataType::Utf8)?;

        let units_col = column("units_sold")?;
        if !units_col.data_type().is_integer() {
            return Err(LoadError::invalid_row(
                row + 1,
                format!("'units_sold' has type {:?}, expected an integer", units_col.data_type()),
            ));
        }
        let units = cast(&units_col, &DataType::Int64)?;

        let revenue_col = column("revenue")?;
        if !revenue_col.data_type().is_numeric() {
            return Err(LoadError::invalid_row(
                row + 1,
                format!("'revenue' has type {:?}, expected a number", revenue_col.data_type()),
            ));
        }
        let revenues = cast(&revenue_col, &DataType::Float64)?;

        let regions = regions.as_string::<i32>();
        let products = products.as_string::<i32>();
        let units = units.as_primitive::<Int64Type>();
        let revenues = revenues.as_primitive::<Float64Type>();

        for i in 0..batch.num_rows() {
            row += 1;
            if regions.is_null(i) || products.is_null(i) || units.is_null(i) || revenues.is_null(i) {
                return Err(LoadError::invalid_row(row, "null value"));
            }
            transactions.push(Transaction {
                date: dates.value(row, i)?,
                region: parse_label(row, "region", regions.value(i))?,
                product: parse_label(row, "product", products.value(i))?,
                units_sold: check_units(row, units.value(i))?,
                revenue: check_revenue(row, revenues.value(i))?,
            });
        }
    }

    Ok(transactions)
}

/// The `date` column, either native Arrow dates or text to be parsed.
enum DateColumn {
    Native(Date32Array),
    Text(ArrayRef),
}

impl DateColumn {
    fn new(col: ArrayRef) -> Result<Self, LoadError> {
        match col.data_type() {
            DataType::Date32 | DataType::Date64 => {
                let days = cast(&col, &DataType::Date32)?;
                Ok(DateColumn::Native(days.as_primitive::<Date32Type>().clone()))
            }
            _ => Ok(DateColumn::Text(cast(&col, &DataType::Utf8)?)),
        }
    }

    fn value(&self, row: usize, i: usize) -> Result<NaiveDate, LoadError> {
        match self {
            DateColumn::Native(days) => {
                if days.is_null(i) {
                    return Err(LoadError::invalid_row(row, "null date"));
                }
                NaiveDate::from_num_days_from_ce_opt(days.value(i) + UNIX_EPOCH_DAYS_FROM_CE)
                    .ok_or_else(|| LoadError::invalid_row(row, "date out of range"))
            }
            DateColumn::Text(text) => {
                if text.is_null(i) {
                    return Err(LoadError::invalid_row(row, "null date"));
                }
                parse_date(row, text.as_string::<i32>().value(i))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Parse a calendar date. Date-time values are truncated to their date.
pub fn parse_date(row: usize, s: &str) -> Result<NaiveDate, LoadError> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| LoadError::invalid_row(row, format!("'{s}' is not a date")))
}

fn parse_label(row: usize, col: &str, s: &str) -> Result<String, LoadError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(LoadError::invalid_row(row, format!("empty '{col}'")));
    }
    Ok(s.to_string())
}

fn parse_units(row: usize, s: &str) -> Result<u64, LoadError> {
    let s = s.trim();
    let units: i64 = s
        .parse()
        .map_err(|_| LoadError::invalid_row(row, format!("units_sold '{s}' is not an integer")))?;
    check_units(row, units)
}

fn check_units(row: usize, units: i64) -> Result<u64, LoadError> {
    u64::try_from(units)
        .map_err(|_| LoadError::invalid_row(row, format!("units_sold {units} is negative")))
}

/// Every view is a subset of the dataset, so a dataset-wide unit total that
/// fits in `u64` keeps every aggregate sum in range.
fn check_unit_total(transactions: &[Transaction]) -> Result<u64, LoadError> {
    transactions
        .iter()
        .enumerate()
        .try_fold(0u64, |total, (i, tx)| {
            total.checked_add(tx.units_sold).ok_or_else(|| {
                LoadError::invalid_row(i + 1, "units_sold total exceeds the supported range")
            })
        })
}

fn parse_revenue(row: usize, s: &str) -> Result<f64, LoadError> {
    let s = s.trim();
    let revenue: f64 = s
        .parse()
        .map_err(|_| LoadError::invalid_row(row, format!("revenue '{s}' is not a number")))?;
    check_revenue(row, revenue)
}

fn check_revenue(row: usize, revenue: f64) -> Result<f64, LoadError> {
    if !revenue.is_finite() || revenue < 0.0 {
        return Err(LoadError::invalid_row(
            row,
            format!("revenue {revenue} must be a non-negative number"),
        ));
    }
    Ok(revenue)
}
