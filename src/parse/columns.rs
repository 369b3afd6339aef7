use crate::grid::RawGrid;
use crate::parse::ParseConfig;
use regex::Regex;
use tracing::{debug, info, warn};

/// Where one period's data lives in the grid. The total column always sits
/// immediately left of the allocation column in this table family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Four-digit year derived from the two-digit date cell.
    pub year: String,
    pub date_col: usize,
    pub allocation_col: usize,
    pub total_col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub year1: ColumnMapping,
    pub year2: ColumnMapping,
    /// Date-column → allocation-column offset detected for this grid.
    pub offset: usize,
}

/// Probe offsets +1/+2/+3 from the first date cell for a header cell that
/// reads like "Plan asset allocation %". The offset is a property of the
/// whole table layout, so it is detected once and reused. Falls back to
/// the configured default when nothing matches.
fn detect_allocation_offset(
    grid: &RawGrid,
    date_row: usize,
    date_col: usize,
    cfg: &ParseConfig,
) -> usize {
    let row_lo = date_row.saturating_sub(2);
    let row_hi = (date_row + 5).min(grid.n_rows());

    for offset in 1..=3 {
        let test_col = date_col + offset;
        if test_col >= grid.n_cols() {
            continue;
        }
        for check_row in row_lo..row_hi {
            let cell = grid.cell(check_row, test_col).trim().to_lowercase();
            if cell.contains("allocation") && cell.contains('%') {
                info!(offset, col = test_col, "auto-detected allocation % column");
                return offset;
            }
        }
    }

    warn!(
        fallback = cfg.fallback_allocation_offset,
        "could not auto-detect allocation column, using default offset"
    );
    cfg.fallback_allocation_offset
}

/// Scan the grid in row-major order for "31.12.YY" date cells and map the
/// first two distinct matches to period columns. Returns `None` when fewer
/// than two periods are present; the document is then unparseable.
pub fn find_date_columns(grid: &RawGrid, cfg: &ParseConfig) -> Option<ColumnMap> {
    let date_re = Regex::new(r"31\.12\.(\d{2})").ok()?;

    let mut offset: Option<usize> = None;
    let mut found: Vec<ColumnMapping> = Vec::new();

    'scan: for row in 0..grid.n_rows() {
        for col in 0..grid.n_cols() {
            let cell = grid.cell(row, col).trim();
            let Some(caps) = date_re.captures(cell) else {
                continue;
            };
            let year = format!("20{}", &caps[1]);

            // Layout property of the whole table, detected on first match.
            let off = *offset.get_or_insert_with(|| {
                detect_allocation_offset(grid, row, col, cfg)
            });

            let allocation_col = col + off;
            debug!(%year, date_col = col, allocation_col, "found period column");
            found.push(ColumnMapping {
                year,
                date_col: col,
                allocation_col,
                total_col: allocation_col - 1,
            });

            if found.len() == 2 {
                break 'scan;
            }
        }
    }

    if found.len() < 2 {
        warn!(matches = found.len(), "fewer than two date columns found");
        return None;
    }

    let year2 = found.pop()?;
    let year1 = found.pop()?;
    Some(ColumnMap {
        year1,
        year2,
        offset: offset?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&[&str]]) -> RawGrid {
        RawGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn maps_two_periods_with_detected_offset() {
        // Dates at cols 1 and 4, "allocation %" marker two to the right.
        let grid = grid_from(&[
            &["", "31.12.24", "", "Plan asset allocation %", "31.12.23", "", "Plan asset allocation %"],
            &["Cash and cash equivalents", "", "5", "", "", "4", ""],
        ]);
        let map = find_date_columns(&grid, &ParseConfig::default()).unwrap();
        assert_eq!(map.offset, 2);
        assert_eq!(map.year1.year, "2024");
        assert_eq!(map.year1.date_col, 1);
        assert_eq!(map.year1.allocation_col, 3);
        assert_eq!(map.year1.total_col, 2);
        assert_eq!(map.year2.year, "2023");
        assert_eq!(map.year2.allocation_col, 6);
    }

    #[test]
    fn prefers_offset_with_allocation_marker() {
        // Marker only at +2: +1 and +3 hold other header text.
        let grid = grid_from(&[
            &["", "Fair value", "USD m", ""],
            &["", "31.12.24", "Fair value", "allocation %", "USD m"],
        ]);
        let map_offset =
            detect_allocation_offset(&grid, 1, 1, &ParseConfig::default());
        assert_eq!(map_offset, 2);
    }

    #[test]
    fn falls_back_to_default_offset() {
        let grid = grid_from(&[
            &["", "31.12.24", "", "", "31.12.23", "", ""],
            &["Cash and cash equivalents", "", "5", "", "", "4", ""],
        ]);
        let map = find_date_columns(&grid, &ParseConfig::default()).unwrap();
        assert_eq!(map.offset, 2);
    }

    #[test]
    fn fails_with_zero_or_one_date() {
        let cfg = ParseConfig::default();
        let none = grid_from(&[&["Cash and cash equivalents", "5"]]);
        assert!(find_date_columns(&none, &cfg).is_none());

        let one = grid_from(&[&["", "31.12.24", "", "allocation %"]]);
        assert!(find_date_columns(&one, &cfg).is_none());
    }
}
