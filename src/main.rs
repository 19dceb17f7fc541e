//! City Population Dashboard
//!
//! Fetches a CSV of population figures by region and shows a selectable bar
//! chart, the data table and the dataset README.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::{anyhow, Context, Result};
use config::DashboardConfig;
use eframe::egui;
use gui::PopulationApp;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = DashboardConfig::load().context("failed to load dashboard configuration")?;
    info!(csv_url = %config.csv_url, "startup");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("City Population Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "City Population Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(PopulationApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("{}", e))
}
