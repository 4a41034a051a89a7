use clap::{Parser, Subcommand};

use crate::report::ReportKind;

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

#[derive(Parser, Debug)]
#[command(name = "cms-reports")]
#[command(about = "State-level disease reports over CMS population and claims (DuckDB)", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the cmspop/cmsclaims tables and load them from CSV.
    Load(LoadArgs),
    /// Run one report and print its JSON.
    Report(ReportArgs),
    /// Run all five reports with their stock indicators.
    Demo(DemoArgs),
    /// Serve the reports over HTTP (requires a completed load).
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct LoadArgs {
    /// Data directory (DuckDB file and source CSVs).
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Population CSV with a header row (defaults to <data-dir>/source/cmspop.csv).
    #[arg(long)]
    pub population: Option<String>,

    /// Claims CSV with a header row (defaults to <data-dir>/source/cmsclaims.csv).
    #[arg(long)]
    pub claims: Option<String>,

    /// Drop and reload tables even if they already exist.
    #[arg(long)]
    pub rebuild: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Data directory holding cms.duckdb.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    #[arg(value_enum)]
    pub kind: ReportKind,

    /// Disease indicator column (alz_rel_sen, heart_fail, chronic_kidney, cancer, depression).
    pub disease: String,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DemoArgs {
    /// Data directory holding cms.duckdb.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Data directory holding cms.duckdb.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8787)]
    pub port: u16,
}
