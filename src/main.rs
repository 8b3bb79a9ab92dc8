mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod report;
mod state;
mod stats;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use env_logger::Env;

use app::DashboardApp;
use config::DashboardConfig;
use dashboard::{run_cycle, FixedSelection};
use data::filter::{AmountRange, Choice, FilterOptions, FilterSet};
use data::loader::load_file;
use report::TextReport;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Transactions file (.csv, .tsv, .json or .parquet)
    data: Option<PathBuf>,

    /// JSON configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print a text report to stdout instead of opening the window
    #[clap(long)]
    report: bool,

    /// Only include this country
    #[clap(long)]
    country: Option<String>,

    /// Only include these transaction types (repeatable)
    #[clap(long = "type")]
    types: Vec<String>,

    /// Lower bound of the amount range (USD)
    #[clap(long)]
    min_amount: Option<f64>,

    /// Upper bound of the amount range (USD)
    #[clap(long)]
    max_amount: Option<f64>,

    /// Number of histogram bins
    #[clap(long)]
    bins: Option<usize>,
}

impl Cli {
    /// Configuration file values with command-line overrides applied.
    fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load_from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(path) = &self.data {
            config.data_path = Some(path.clone());
        }
        if let Some(bins) = self.bins {
            config.histogram_bins = bins;
        }
        config.validate()?;
        Ok(config)
    }

    /// Filter set described by the flags; unset flags select everything.
    fn selection(&self, options: &FilterOptions) -> FilterSet {
        let country = match &self.country {
            Some(c) if c != "All" => Choice::Only(c.clone()),
            _ => Choice::All,
        };
        let types = self.types.iter().map(|t| match t.as_str() {
            "All" => Choice::All,
            other => Choice::Only(other.to_string()),
        });
        let bounds = options.amount_bounds.unwrap_or_else(AmountRange::unbounded);
        let range = AmountRange::new(
            self.min_amount.unwrap_or(bounds.lo),
            self.max_amount.unwrap_or(bounds.hi),
        );
        FilterSet::new(country, types, range)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.report {
        run_report(&cli, &config)
    } else {
        run_gui(config)
    }
}

fn run_report(cli: &Cli, config: &DashboardConfig) -> Result<()> {
    let path = config
        .data_path
        .as_deref()
        .context("--report needs a data file")?;
    let table = load_file(path, config.row_policy)
        .with_context(|| format!("loading {}", path.display()))?;

    let options = FilterOptions::from_table(&table);
    let filters = cli.selection(&options);
    let mut report = TextReport::new(&config.title).with_filters(&filters);
    let mut source = FixedSelection {
        filters: Some(filters),
    };
    run_cycle(&table, &mut source, &mut report, &config.derive_settings());

    print!("{}", report.into_string());
    Ok(())
}

fn run_gui(config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the sidebar logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DashboardApp::new(config)))
        }),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
