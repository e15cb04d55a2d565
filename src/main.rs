//! Command line companion of the dashboard: trains the model artifact and runs
//! one-off predictions without opening a window.

use std::path::PathBuf;

use adclick::{ClickModel, Column, Config, Dataset, DEFAULT_CONFIG_PATH};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adclick")]
#[command(about = "Train and query the Facebook ads click model", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the scaler and classifier on the dataset and write the model artifact
    Train {
        /// Where to write the artifact (overrides `model.artifact_path`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Predict whether a viewer clicks the ad
    Predict {
        /// Time spent on the website, in minutes
        #[arg(long, allow_negative_numbers = true)]
        time: f64,
        /// Salary of the viewer
        #[arg(long, allow_negative_numbers = true)]
        salary: f64,
    },
    /// Print the first rows of the dataset
    Preview {
        #[arg(short, long)]
        rows: Option<usize>,
    },
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

    match cli.command {
        Command::Train { output } => {
            let dataset = Dataset::load(&config.data.csv_path).context("loading dataset")?;
            let model = ClickModel::train(&dataset, &config.training).context("training model")?;
            let output = output.unwrap_or_else(|| config.model.artifact_path.clone());
            model.save(&output)?;

            let report = model.report();
            println!(
                "Trained on {} rows, train accuracy {:.3}",
                report.train_rows, report.train_accuracy
            );
            if let Some(accuracy) = report.test_accuracy {
                println!("Held out {} rows, test accuracy {:.3}", report.test_rows, accuracy);
            }
            println!("Model written to {}", output.display());
        }
        Command::Predict { time, salary } => {
            let model = ClickModel::load(&config.model.artifact_path)
                .context("loading model artifact (run `adclick train` first)")?;
            let verdict = model.predict(time, salary)?;
            println!("{}", verdict);
        }
        Command::Preview { rows } => {
            let dataset = Dataset::load(&config.data.csv_path).context("loading dataset")?;
            let rows = rows.unwrap_or(config.ui.preview_rows);
            info!(rows, total = dataset.len(), "previewing dataset");

            println!("{}", dataset.columns().join("\t"));
            for record in dataset.head(rows) {
                let cells: Vec<String> = Column::ALL.iter().map(|&c| record.cell(c)).collect();
                println!("{}", cells.join("\t"));
            }
        }
    }

    Ok(())
}
