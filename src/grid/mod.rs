// src/grid/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use regex::Regex;
use std::{fs::File, path::Path};

/// The table exactly as the extraction step handed it over: rows of text
/// cells in document order. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        RawGrid { rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row. Extracted grids are usually ragged on the
    /// right, so callers index through `cell` instead of the rows directly.
    pub fn n_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    /// Cell text at (row, col), `""` when the position is out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// One extracted table plus the context the extraction step reported
/// alongside it. `accuracy` and `page_number` are informational only;
/// `year_hint` labels diagnostics and output files, never the parsed
/// periods themselves (those come from date cells inside the grid).
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub grid: RawGrid,
    pub accuracy: Option<f64>,
    pub page_number: Option<u32>,
    pub year_hint: String,
}

impl ExtractedTable {
    pub fn new(grid: RawGrid, year_hint: impl Into<String>) -> Self {
        ExtractedTable {
            grid,
            accuracy: None,
            page_number: None,
            year_hint: year_hint.into(),
        }
    }
}

/// Load an extracted-table CSV (one cell per field, no header semantics)
/// into a `RawGrid`. Rows are kept in file order and may have differing
/// field counts.
pub fn load_grid_csv<P: AsRef<Path>>(path: P) -> Result<RawGrid> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open grid CSV: {:?}", path.as_ref()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| {
            format!("CSV parse error in {:?} at record {}", path.as_ref(), idx)
        })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(RawGrid::new(rows))
}

/// First 4-digit group in the file stem, e.g. "benefit_plans_table_2024.csv"
/// → "2024". Used only to label a document's diagnostics.
pub fn year_hint_from_path<P: AsRef<Path>>(path: P) -> Option<String> {
    let stem = path.as_ref().file_stem()?.to_string_lossy().to_string();
    let re = Regex::new(r"(\d{4})").ok()?;
    re.captures(&stem).map(|c| c[1].to_string())
}
