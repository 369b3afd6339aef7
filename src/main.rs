use anyhow::{Context, Result};
use glob::glob;
use planparser::{
    grid::{self, ExtractedTable},
    output,
    parse::{self, ParseConfig},
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configure dirs ───────────────────────────────────────────
    let grids_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("grids"));
    let extracted_dir = PathBuf::from("extracted");
    let output_dir = PathBuf::from("output");
    let run_ts = output::run_timestamp();
    info!(%run_ts, grids = %grids_dir.display(), "run configuration");

    // ─── 3) discover extracted grid CSVs ─────────────────────────────
    let pattern = format!("{}/*.csv", grids_dir.display());
    let mut grid_files: Vec<PathBuf> = Vec::new();
    for entry in glob(&pattern).context("invalid glob pattern for grid discovery")? {
        match entry {
            Ok(p) => grid_files.push(p),
            Err(e) => warn!("cannot read glob entry: {:?}", e),
        }
    }
    if grid_files.is_empty() {
        info!("no grid CSVs in {}; exit", grids_dir.display());
        return Ok(());
    }
    info!("{} grid files to parse", grid_files.len());

    // ─── 4) parse every document; each grid is independent ───────────
    let cfg = ParseConfig::default();
    let results: Vec<bool> = grid_files
        .par_iter()
        .map(|path| match parse_one(path, &cfg, &run_ts, &extracted_dir, &output_dir) {
            Ok(valid) => valid,
            Err(e) => {
                error!("{} failed: {:#}", path.display(), e);
                false
            }
        })
        .collect();

    let parsed = results.iter().filter(|ok| **ok).count();
    info!(
        total = grid_files.len(),
        parsed,
        skipped = grid_files.len() - parsed,
        "all done"
    );
    Ok(())
}

/// Parse one grid CSV end to end. Returns Ok(false) when the document's
/// structure could not be located; that is a skip, not an error.
fn parse_one(
    path: &Path,
    cfg: &ParseConfig,
    run_ts: &str,
    extracted_dir: &Path,
    output_dir: &Path,
) -> Result<bool> {
    let year_hint = grid::year_hint_from_path(path).unwrap_or_else(|| "unknown".to_string());
    info!(path = %path.display(), %year_hint, "parsing grid");

    let raw = grid::load_grid_csv(path)?;
    let table = ExtractedTable::new(raw, year_hint.clone());

    let Some(report) = parse::parse_table(&table, cfg) else {
        warn!(path = %path.display(), "structure not found; skipping");
        return Ok(false);
    };

    let years: Vec<String> = report.records.iter().map(|r| r.period.clone()).collect();
    output::dump_extraction(&table, &years, run_ts, extracted_dir)?;
    output::write_report(&report, &year_hint, run_ts, output_dir)?;

    for record in &report.records {
        info!(
            period = %record.period,
            total_assets = record.total_assets,
            categories = record.allocations.len(),
            "extracted period"
        );
    }
    Ok(report.all_valid())
}
