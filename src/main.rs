use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use launch_dash::app::LaunchDashApp;
use launch_dash::data::loader::load_file;

/// SpaceX launch records dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Launch records file (.csv, .json or .parquet).
    #[arg(default_value = "spacex_launch_dash.csv")]
    dataset: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = match load_file(&args.dataset) {
        Ok(ds) => Arc::new(ds),
        Err(e) => {
            log::error!("Failed to load {}: {e}", args.dataset.display());
            return Err(e).with_context(|| format!("loading {}", args.dataset.display()));
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 860.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SpaceX Launch Records Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(LaunchDashApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
