mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::RelianceExplorerApp;
use clap::Parser;
use eframe::egui;
use state::{AppState, DEFAULT_PAGE_SIZE};

/// Loaded at startup when no path is given and the file exists.
const DEFAULT_INPUT: &str = "data_transformed.xlsx";

/// Explore how explanation design in XAI studies relates to user reliance.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Review spreadsheet (.xlsx, .xlsm, .xls, .ods, .csv, .json or .parquet).
    path: Option<PathBuf>,

    /// Rows per page in the data table.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

impl Cli {
    /// The explicit path, or the default file when it is present.
    fn input(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            let fallback = PathBuf::from(DEFAULT_INPUT);
            fallback.exists().then_some(fallback)
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState {
        page_size: cli.page_size.max(1),
        ..AppState::default()
    };
    if let Some(path) = cli.input() {
        // A bad startup file is fatal; File → Open failures are not.
        state.load_path(&path)?;
    } else {
        log::info!("No input file; waiting for File → Open");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Reliance Explorer – XAI Explanation Design",
        options,
        Box::new(|_cc| Ok(Box::new(RelianceExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))?;
    Ok(())
}
