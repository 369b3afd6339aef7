// src/output/mod.rs
//
// Run-scoped bookkeeping around the parser: diagnostic dumps of what the
// extraction step handed over, and the structured records for downstream
// consumers. Every run writes under its own timestamp so reruns never
// clobber each other.

use crate::grid::ExtractedTable;
use crate::parse::ParsedReport;
use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// One timestamp per process run, `YYYYMMDD_HHMMSS`.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Sidecar describing one extraction, written next to the grid dump.
#[derive(Debug, Serialize)]
pub struct ExtractionMeta<'a> {
    pub extraction_timestamp: &'a str,
    pub page_number: Option<u32>,
    /// (rows, columns) of the raw grid.
    pub table_shape: (usize, usize),
    pub accuracy: Option<f64>,
    pub years: Vec<String>,
}

/// Dump the raw grid as CSV plus a JSON metadata sidecar under
/// `<base>/<run_ts>/<year_hint>/`. Purely diagnostic; parsing never reads
/// these back.
pub fn dump_extraction(
    table: &ExtractedTable,
    years: &[String],
    run_ts: &str,
    base: &Path,
) -> Result<PathBuf> {
    let dir = base.join(run_ts).join(&table.year_hint);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create extract dir {}", dir.display()))?;

    let csv_path = dir.join(format!("benefit_plans_table_{}.csv", table.year_hint));
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .from_path(&csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    for row in table.grid.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    info!(path = %csv_path.display(), "saved extracted table");

    let meta = ExtractionMeta {
        extraction_timestamp: run_ts,
        page_number: table.page_number,
        table_shape: table.grid.shape(),
        accuracy: table.accuracy,
        years: years.to_vec(),
    };
    let meta_path = dir.join(format!("extraction_metadata_{}.json", table.year_hint));
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
        .with_context(|| format!("Failed to write {}", meta_path.display()))?;
    info!(path = %meta_path.display(), "saved extraction metadata");

    Ok(csv_path)
}

/// Write a document's two aggregated records and their validation reports
/// as one JSON file under `<base>/<run_ts>/`.
pub fn write_report(
    report: &ParsedReport,
    year_hint: &str,
    run_ts: &str,
    base: &Path,
) -> Result<PathBuf> {
    let dir = base.join(run_ts);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output dir {}", dir.display()))?;

    let path = dir.join(format!("benefit_plans_{year_hint}.json"));
    fs::write(&path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote parsed records");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RawGrid;
    use crate::parse::{parse_table, ParseConfig};
    use tempfile::tempdir;

    fn tiny_table() -> ExtractedTable {
        let grid = RawGrid::new(vec![
            vec!["".into(), "31.12.24".into(), "x".into()],
            vec!["Cash and cash equivalents".into(), "1,200".into(), "5".into()],
        ]);
        let mut table = ExtractedTable::new(grid, "2024");
        table.accuracy = Some(97.3);
        table.page_number = Some(412);
        table
    }

    #[test]
    fn dump_writes_csv_and_sidecar() -> Result<()> {
        let dir = tempdir()?;
        let table = tiny_table();
        let csv_path = dump_extraction(
            &table,
            &["2024".to_string(), "2023".to_string()],
            "20260829_120000",
            dir.path(),
        )?;

        assert!(csv_path.ends_with("20260829_120000/2024/benefit_plans_table_2024.csv"));
        let csv_text = fs::read_to_string(&csv_path)?;
        assert!(csv_text.contains("Cash and cash equivalents"));
        assert!(csv_text.contains("\"1,200\""));

        let meta_path = csv_path.with_file_name("extraction_metadata_2024.json");
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(meta_path)?)?;
        assert_eq!(meta["table_shape"][0], 2);
        assert_eq!(meta["accuracy"], 97.3);
        assert_eq!(meta["years"][1], "2023");
        Ok(())
    }

    #[test]
    fn report_json_round_trips_codes() -> Result<()> {
        // Build a real report through the pipeline so the serialized shape
        // is the one downstream consumers will see.
        let rows = vec![
            vec!["", "31.12.24", "allocation %", "31.12.23", "allocation %"],
            vec!["Cash and cash equivalents", "12000", "5", "11000", "4"],
            vec!["Total fair value of plan assets", "24000", "", "22000", ""],
        ];
        let grid = RawGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        let table = ExtractedTable::new(grid, "2024");
        let report = parse_table(&table, &ParseConfig::default()).unwrap();

        let dir = tempdir()?;
        let path = write_report(&report, "2024", "20260829_120000", dir.path())?;
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;

        assert_eq!(json["records"][0]["period"], "2024");
        assert_eq!(json["records"][0]["allocations"]["CASH"], 5.0);
        assert_eq!(json["records"][0]["total_assets"], 24000.0);
        assert_eq!(json["validation"][0]["valid"], false); // equities missing
        Ok(())
    }
}
