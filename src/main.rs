mod app;
mod color;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use env_logger::Env;

use app::SalesDashboardApp;
use sales_dashboard::config::DashboardConfig;
use sales_dashboard::data::cache;
use state::AppState;

fn main() -> Result<()> {
    let config = DashboardConfig::parse();

    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    // A missing or malformed data file is fatal: fail before opening a window.
    let dataset = cache::dataset(&config.data)
        .with_context(|| format!("loading sales data from {}", config.data.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;

    let state = AppState::new(dataset, config.top_n);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}
