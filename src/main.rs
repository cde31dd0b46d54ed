//! edfin_report - run the school district finance report.

use anyhow::Result;
use clap::Parser;
use edfin_report::config::ReportConfig;
use edfin_report::report;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "edfin-report", about = "School district finance report generator")]
struct Cli {
    /// Path to the delimited finance export.
    input: PathBuf,

    /// Directory for the report HTML and chart PNGs.
    #[arg(short, long, default_value = "report")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    let config = ReportConfig::new(cli.input, cli.out_dir);
    report::run(&config)
}
