use crate::parse::codes::AssetCode;
use crate::parse::{ParseConfig, PeriodRecord};
use serde::Serialize;
use tracing::{info, warn};

/// Leaves every well-formed edition of the table carries; their absence
/// means the classifier missed part of the data region.
const REQUIRED_LEAVES: [AssetCode; 3] = [
    AssetCode::Cash,
    AssetCode::DomesticEquitySecurities,
    AssetCode::ForeignEquitySecurities,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub period: String,
    pub valid: bool,
    pub warnings: Vec<String>,
}

/// Sanity-check one aggregated period record. Annotates only: nothing in
/// here halts the pipeline or mutates the record.
///
/// A leaf-percentage sum drifting past `percentage_tolerance` is only a
/// warning (rounding in the source makes exact 100s rare), but drifting
/// past `hard_percentage_tolerance` means rows were misread and the record
/// cannot be trusted.
pub fn validate_record(record: &PeriodRecord, cfg: &ParseConfig) -> ValidationReport {
    let mut warnings = Vec::new();
    let mut valid = true;
    let period = record.period.clone();

    // (a) leaf percentages should approximate 100
    let total_pct: f64 = AssetCode::LEAVES
        .iter()
        .filter_map(|code| record.allocations.get(code))
        .sum();
    let deviation = (total_pct - 100.0).abs();
    if deviation > cfg.percentage_tolerance {
        warn!(%period, total_pct, "percentage total off 100");
        warnings.push(format!(
            "{period}: percentage total is {total_pct}% (expected ~100%)"
        ));
        if deviation > cfg.hard_percentage_tolerance {
            valid = false;
        }
    } else {
        info!(%period, total_pct, "percentage validation passed");
    }

    // (b) plausible total assets
    let total_assets = record.total_assets.unwrap_or(0.0);
    if total_assets < cfg.plausible_total_min || total_assets > cfg.plausible_total_max {
        warn!(%period, total_assets, "total assets outside plausible range");
        warnings.push(format!(
            "{period}: total assets {total_assets}M seems unusual (expected {}-{}M)",
            cfg.plausible_total_min, cfg.plausible_total_max
        ));
    }

    // (c) required leaves
    let missing: Vec<&str> = REQUIRED_LEAVES
        .iter()
        .filter(|code| !record.allocations.contains_key(code))
        .map(|code| code.as_str())
        .collect();
    if !missing.is_empty() {
        warn!(%period, ?missing, "missing required asset classes");
        warnings.push(format!(
            "{period}: missing required asset classes: {}",
            missing.join(", ")
        ));
        valid = false;
    }

    // (d) composites must exist
    if AssetCode::COMPOSITES
        .iter()
        .any(|code| !record.allocations.contains_key(code))
    {
        warn!(%period, "missing aggregated percentages");
        warnings.push(format!("{period}: missing aggregated percentages"));
        valid = false;
    }

    ValidationReport {
        period,
        valid,
        warnings,
    }
}

pub fn validate_records(records: &[PeriodRecord], cfg: &ParseConfig) -> Vec<ValidationReport> {
    records.iter().map(|r| validate_record(r, cfg)).collect()
}
