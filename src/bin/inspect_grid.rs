//! Parse a single extracted-grid CSV and pretty-print what the classifier
//! made of it. Handy when a new report edition shifts its layout.

use anyhow::{bail, Context, Result};
use planparser::{
    grid::{self, ExtractedTable},
    parse::{self, codes::AssetCode, ParseConfig},
};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: inspect_grid <grid.csv>");
    };

    let raw = grid::load_grid_csv(&path).with_context(|| format!("loading {path}"))?;
    let year_hint = grid::year_hint_from_path(&path).unwrap_or_else(|| "unknown".to_string());
    println!(
        "{}: {} rows x {} cols (year hint {})",
        path,
        raw.n_rows(),
        raw.n_cols(),
        year_hint
    );

    let table = ExtractedTable::new(raw, year_hint);
    let Some(report) = parse::parse_table(&table, &ParseConfig::default()) else {
        bail!("structure not found: no two date columns or no data bounds");
    };

    for (record, validation) in report.records.iter().zip(&report.validation) {
        println!("\nYear: {}", record.period);
        match record.total_assets {
            Some(t) => println!("Total assets: {t} USD millions"),
            None => println!("Total assets: not found"),
        }
        for code in AssetCode::LEAVES.iter().chain(AssetCode::COMPOSITES.iter()) {
            if let Some(v) = record.allocations.get(code) {
                let marker = if code.is_composite() { " (calculated)" } else { "" };
                println!("  {code}: {v}%{marker}");
            }
        }
        println!(
            "Validation: {}",
            if validation.valid { "ok" } else { "INVALID" }
        );
        for warning in &validation.warnings {
            println!("  warning: {warning}");
        }
    }
    Ok(())
}
