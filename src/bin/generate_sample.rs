//! Write a deterministic year of sales to `sales.csv` (or the given
//! `.csv` / `.parquet` path).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use parquet::arrow::ArrowWriter;

use sales_dashboard::config::DEFAULT_DATA_PATH;
use sales_dashboard::Transaction;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64() as usize % items.len()]
    }
}

const REGIONS: [&str; 4] = ["East", "North", "South", "West"];

/// Product name and list price.
const PRODUCTS: [(&str, f64); 8] = [
    ("Widget", 19.99),
    ("Gadget", 34.50),
    ("Gizmo", 12.75),
    ("Doohickey", 8.25),
    ("Sprocket", 4.99),
    ("Thingamajig", 59.00),
    ("Whatsit", 23.40),
    ("Contraption", 129.00),
];

fn generate(rng: &mut SimpleRng) -> Result<Vec<Transaction>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let mut rows = Vec::new();

    for day in 0..366 {
        let date = start + Duration::days(day);
        // Quieter weekends, busier end of year.
        let base = match date.weekday() {
            Weekday::Sat | Weekday::Sun => 2,
            _ => 4,
        };
        let orders = base + if date.month() >= 11 { 3 } else { 0 };

        for _ in 0..rng.range(orders / 2, orders) {
            let region = *rng.pick(&REGIONS);
            let (product, price) = *rng.pick(&PRODUCTS);
            let units = rng.range(1, 40);
            let discount = 0.85 + 0.15 * rng.next_f64();
            let revenue = (units as f64 * price * discount * 100.0).round() / 100.0;

            rows.push(Transaction {
                date,
                region: region.to_string(),
                product: product.to_string(),
                units_sold: units,
                revenue,
            });
        }
    }

    Ok(rows)
}

fn write_csv(rows: &[Transaction], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(rows: &[Transaction], path: &Path) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;

    let dates = Date32Array::from(
        rows.iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let regions = StringArray::from(rows.iter().map(|r| r.region.as_str()).collect::<Vec<_>>());
    let products = StringArray::from(rows.iter().map(|r| r.product.as_str()).collect::<Vec<_>>());
    let units = Int64Array::from(rows.iter().map(|r| r.units_sold as i64).collect::<Vec<_>>());
    let revenue = Float64Array::from(rows.iter().map(|r| r.revenue).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units_sold", DataType::Int64, false),
        Field::new("revenue", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(dates),
            Arc::new(regions),
            Arc::new(products),
            Arc::new(units),
            Arc::new(revenue),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating Parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output_path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng)?;

    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&rows, &output_path)?,
        "parquet" | "pq" => write_parquet(&rows, &output_path)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} sales rows to {}", rows.len(), output_path.display());
    Ok(())
}
