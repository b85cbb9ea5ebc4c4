//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::data::aggregate::DEFAULT_TOP_N;

/// Default location of the sales file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "sales.csv";

/// Interactive sales dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "sales-dashboard")]
#[command(version, about, long_about = None)]
pub struct DashboardConfig {
    /// Sales file to load (.csv, .json or .parquet)
    #[arg(short, long, env = "SALES_DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Number of products in the "top products" ranking
    #[arg(long, env = "SALES_DASHBOARD_TOP_N", default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
