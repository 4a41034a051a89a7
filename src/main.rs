use anyhow::Context;
use clap::Parser;

use cms_reports::{cli, load, server, show};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.cmd {
        cli::Command::Load(cmd) => load::run(cmd).context("load failed"),
        cli::Command::Report(cmd) => show::run(cmd).context("report failed"),
        cli::Command::Demo(cmd) => show::demo(cmd).context("demo failed"),
        cli::Command::Serve(cmd) => server::run(cmd).await.context("serve failed"),
    }
}
