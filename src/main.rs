// Entry point and high-level CLI flow.
//
// One invocation is one report: the workbook is loaded, validated and
// split into its sheets, every metric is computed once, and the dashboard
// is printed (and optionally exported) top to bottom.
mod config;
mod dashboard;
mod error;
mod loader;
mod metrics;
mod output;
mod reports;
mod types;
mod util;

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use config::RootCauseCatalog;
use dashboard::Dashboard;
use error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "service-report",
    about = "Service portfolio overview from a customer incident and availability workbook"
)]
struct Cli {
    /// Workbook holding the Customer Information, Incident Data and Availability Data sheets.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON catalog of customer- and vendor-caused root causes.
    #[arg(short, long)]
    classification: Option<PathBuf>,

    /// Directory to write CSV tables and summary.json into.
    #[arg(short, long)]
    export_dir: Option<PathBuf>,

    /// Rows shown per long table on the console.
    #[arg(long, default_value_t = 50)]
    max_rows: usize,
}

fn run(cli: &Cli) -> Result<()> {
    let catalog = match &cli.classification {
        Some(path) => RootCauseCatalog::load(path)?,
        None => RootCauseCatalog::default(),
    };
    let classifier = catalog.classifier()?;

    let bytes = match &cli.input {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };
    let workbook = loader::load(bytes.as_deref())?;
    loader::validate_required_sheets(&workbook)?;
    let sheets = loader::extract(workbook)?;

    let dashboard = Dashboard::build(&sheets, &classifier)?;
    dashboard.print(cli.max_rows);

    if let Some(dir) = &cli.export_dir {
        dashboard.export(dir)?;
        println!("(Full tables exported to {})", dir.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    info!("Starting report with {:?}", cli);
    if let Err(err) = run(&cli) {
        error!("Report failed: {}", err);
        eprintln!("{err}");
        std::process::exit(1);
    }
}
