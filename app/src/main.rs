mod app;
mod charts;
mod ui;

use std::path::PathBuf;

use adclick::{Config, Dataset, DEFAULT_CONFIG_PATH};
use anyhow::{anyhow, Context, Result};
use app::DashboardApp;
use clap::Parser;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adclick-dashboard")]
#[command(about = "Facebook ads analytics dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Without a dataset there is nothing to show: stop before opening a window.
    let dataset = Dataset::load(&config.data.csv_path)
        .with_context(|| format!("loading {}", config.data.csv_path.display()))?;

    let title = config.ui.window_title.clone();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([1280.0, 900.0]),
        ..Default::default()
    };

    info!("starting dashboard");
    let app = DashboardApp::new(config, dataset);
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
