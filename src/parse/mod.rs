// src/parse/mod.rs
//
// The table-interpretation pipeline: locate each period's columns, locate
// the data region, classify every row, derive composites, validate. The
// whole pass is a pure function of the grid; structural failure is a
// normal `None` return, never a panic or a propagated error.

pub mod aggregate;
pub mod bounds;
pub mod classify;
pub mod codes;
pub mod columns;
pub mod numbers;
pub mod validate;

use crate::grid::ExtractedTable;
use self::codes::AssetCode;
use self::validate::ValidationReport;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Tuning knobs the source format never documents tolerances for. The
/// defaults match every report edition seen so far; override per call if a
/// future edition shifts.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Date-column → allocation-column offset used when auto-detection
    /// finds no "allocation %" header.
    pub fallback_allocation_offset: usize,
    /// A value in the total column below this is a stray small number,
    /// not a plan total (totals are in the tens of thousands of millions).
    pub total_assets_floor: f64,
    /// Leaf percentages drifting further than this from 100 draw a warning.
    pub percentage_tolerance: f64,
    /// Drifting further than this invalidates the period record.
    pub hard_percentage_tolerance: f64,
    /// Plausible total-assets range, USD millions.
    pub plausible_total_min: f64,
    pub plausible_total_max: f64,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            fallback_allocation_offset: 2,
            total_assets_floor: 10_000.0,
            percentage_tolerance: 2.0,
            hard_percentage_tolerance: 5.0,
            plausible_total_min: 1_000.0,
            plausible_total_max: 1_000_000.0,
        }
    }
}

/// One reporting period: the 4-digit year from its date cell, the plan
/// total, and whichever allocation percentages were present. Absent keys
/// are absent values; a parsed value is always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRecord {
    pub period: String,
    pub total_assets: Option<f64>,
    pub allocations: BTreeMap<AssetCode, f64>,
}

/// Full result for one document: two aggregated period records (younger
/// period first, as laid out in the table) and their validation reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedReport {
    pub records: Vec<PeriodRecord>,
    pub validation: Vec<ValidationReport>,
}

impl ParsedReport {
    pub fn all_valid(&self) -> bool {
        self.validation.iter().all(|r| r.valid)
    }
}

/// Run the whole pipeline over one extracted table. Returns `None` when
/// the grid's structure cannot be located (missing date columns or data
/// bounds); the caller logs and moves on to the next document.
#[tracing::instrument(level = "info", skip(table, cfg), fields(doc = %table.year_hint))]
pub fn parse_table(table: &ExtractedTable, cfg: &ParseConfig) -> Option<ParsedReport> {
    let grid = &table.grid;

    let Some(columns) = columns::find_date_columns(grid, cfg) else {
        warn!("could not find date columns; skipping document");
        return None;
    };
    let Some(data_bounds) = bounds::find_data_bounds(grid) else {
        warn!("could not find data bounds; skipping document");
        return None;
    };

    let (mut year1, mut year2) = classify::classify_rows(grid, &columns, data_bounds, cfg);
    aggregate::aggregate(&mut year1);
    aggregate::aggregate(&mut year2);

    let records = vec![year1, year2];
    let validation = validate::validate_records(&records, cfg);
    for report in &validation {
        if !report.valid {
            warn!(period = %report.period, warnings = ?report.warnings, "period failed validation");
        }
    }

    info!(
        years = ?records.iter().map(|r| r.period.as_str()).collect::<Vec<_>>(),
        "parsed document"
    );
    Some(ParsedReport {
        records,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RawGrid;

    fn canonical_table() -> ExtractedTable {
        let rows: Vec<Vec<&str>> = vec![
            vec!["Composition and fair value of plan assets", "", "", "", "", "", ""],
            vec!["", "", "31.12.24", "", "", "31.12.23", ""],
            vec!["", "", "Fair value", "Plan asset allocation %", "", "Fair value", "Plan asset allocation %"],
            vec!["USD million", "", "", "", "", "", ""],
            vec!["Cash and cash equivalents", "", "1,238", "5", "", "950", "4"],
            vec!["Equity securities", "", "", "", "", "", ""],
            vec!["Domestic", "", "495", "2", "", "475", "2"],
            vec!["Foreign", "", "2,476", "10", "", "2,611", "11"],
            vec!["Bonds", "", "", "", "", "", ""],
            vec!["Domestic, AAA to BBB–", "", "1,238", "5", "", "1,424", "6"],
            vec!["Foreign, AAA to BBB–", "", "6,190", "25", "", "5,698", "24"],
            vec!["Real estate / property", "", "", "", "", "", ""],
            vec!["Domestic", "", "2,971", "12", "", "2,848", "12"],
            vec!["Foreign", "", "248", "1", "", "237", "1"],
            vec!["Investment funds", "", "", "", "", "", ""],
            vec!["Equity", "", "", "", "", "", ""],
            vec!["Domestic", "", "990", "4", "", "950", "4"],
            vec!["Foreign", "", "2,228", "9", "", "2,136", "9"],
            vec!["Bonds1", "", "", "", "", "", ""],
            vec!["Domestic, AAA to BBB–", "", "743", "3", "", "712", "3"],
            vec!["Domestic, below BBB–", "", "248", "1", "", "237", "1"],
            vec!["Foreign, AAA to BBB–", "", "2,476", "10", "", "2,373", "10"],
            vec!["Foreign, below BBB–", "", "495", "2", "", "475", "2"],
            vec!["Real estate", "", "", "", "", "", ""],
            vec!["Domestic", "", "990", "4", "", "950", "4"],
            vec!["Foreign", "", "248", "1", "", "237", "1"],
            vec!["Other", "", "743", "3", "", "712", "3"],
            vec!["Other investments", "", "743", "3", "", "950", "4"],
            vec!["Total fair value of plan assets", "", "24,760", "100", "", "23,740", "100"],
        ];
        let grid = RawGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        ExtractedTable::new(grid, "2024")
    }

    #[test]
    fn full_pipeline_on_canonical_table() {
        let table = canonical_table();
        let report = parse_table(&table, &ParseConfig::default()).unwrap();

        assert_eq!(report.records.len(), 2);
        let y1 = &report.records[0];
        let y2 = &report.records[1];
        assert_eq!(y1.period, "2024");
        assert_eq!(y2.period, "2023");
        assert_eq!(y1.total_assets, Some(24_760.0));
        assert_eq!(y2.total_assets, Some(23_740.0));

        // 17 leaves + 3 composites per period.
        assert_eq!(y1.allocations.len(), 20);
        assert_eq!(y2.allocations.len(), 20);
        assert_eq!(y1.allocations[&AssetCode::Bonds], 30.0);
        assert_eq!(y1.allocations[&AssetCode::Equities], 12.0);
        assert_eq!(y1.allocations[&AssetCode::RealEstate], 13.0);
        assert_eq!(y2.allocations[&AssetCode::Bonds], 30.0);

        assert!(report.all_valid());
        assert!(report.validation.iter().all(|r| r.warnings.is_empty()));
    }

    #[test]
    fn structural_failure_returns_none() {
        let grid = RawGrid::new(vec![vec!["Cash and cash equivalents".into(), "5".into()]]);
        let table = ExtractedTable::new(grid, "2024");
        assert!(parse_table(&table, &ParseConfig::default()).is_none());
    }

    #[test]
    fn pipeline_is_deterministic() {
        let table = canonical_table();
        let cfg = ParseConfig::default();
        let a = parse_table(&table, &cfg).unwrap();
        let b = parse_table(&table, &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
