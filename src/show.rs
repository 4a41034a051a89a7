use anyhow::{Context, anyhow};

use crate::cli::{DemoArgs, ReportArgs};
use crate::executor::{DuckDbExecutor, ExecutorConfig};
use crate::report::{ReportEngine, ReportKind};
use crate::storage::{StoragePaths, file_present_nonempty};

/// Report/indicator pairs printed by `demo`.
const DEMO: &[(ReportKind, &str, &str)] = &[
    (
        ReportKind::AgeAtDeath,
        "alz_rel_sen",
        "States in descending order of the average age of death for Alzheimer's Disease:",
    ),
    (
        ReportKind::ReimbursementVsResponsibility,
        "cancer",
        "States in descending order of the average beneficiary responsibility, including the average carrier reimbursement for cancer:",
    ),
    (
        ReportKind::SexRatio,
        "depression",
        "States in descending order of the ratio of male to female patients for depression:",
    ),
    (
        ReportKind::RaceBreakdown,
        "cancer",
        "Percentage of total reimbursement and percentage of total deaths by race, grouped by state for cancer:",
    ),
    (
        ReportKind::DeathCounts,
        "heart_fail",
        "States in descending order of the total number of deaths, youngest age at death, and oldest age at death for heart failure:",
    ),
];

pub fn run(opts: ReportArgs) -> anyhow::Result<()> {
    let engine = open_engine(&opts.data_dir)?;
    let result = if opts.pretty {
        engine.run_json_pretty(opts.kind, &opts.disease)
    } else {
        engine.run_json(opts.kind, &opts.disease)
    };
    let json = result
        .with_context(|| format!("{} report for {:?}", opts.kind.as_str(), opts.disease))?;
    println!("{json}");
    Ok(())
}

pub fn demo(opts: DemoArgs) -> anyhow::Result<()> {
    let engine = open_engine(&opts.data_dir)?;
    for (kind, disease, heading) in DEMO {
        let json = engine
            .run_json(*kind, disease)
            .with_context(|| format!("{} report for {disease}", kind.as_str()))?;
        println!("{heading}");
        println!("{json}");
    }
    Ok(())
}

fn open_engine(data_dir: &str) -> anyhow::Result<ReportEngine<DuckDbExecutor>> {
    let paths = StoragePaths::new(data_dir);
    if !file_present_nonempty(&paths.duckdb_path) {
        return Err(anyhow!(
            "DuckDB not found at {}. Run: cms-reports load",
            paths.duckdb_path.display()
        ));
    }
    let cfg = ExecutorConfig {
        duckdb_path: paths.duckdb_path,
        read_only: true,
    };
    let executor = DuckDbExecutor::open(&cfg)?;
    Ok(ReportEngine::new(executor))
}
