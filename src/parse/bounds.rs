use crate::grid::RawGrid;
use tracing::{info, warn};

/// Inclusive row range holding the asset rows, from the Cash row down to
/// the Total row. Everything above `first` is header noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBounds {
    pub first: usize,
    pub last: usize,
}

/// Locate the data region from the two anchor labels every edition of the
/// table carries: "Cash and cash equivalents" opens it, "Total fair value
/// of plan assets" closes it. `None` when either anchor is missing.
pub fn find_data_bounds(grid: &RawGrid) -> Option<DataBounds> {
    let mut first = None;

    for row in 0..grid.n_rows() {
        let label = grid.cell(row, 0).trim().to_lowercase();

        if first.is_none() && label.contains("cash and cash equivalents") {
            info!(row, "first data row (Cash)");
            first = Some(row);
        }

        if first.is_some() && label.contains("total fair value of plan assets") {
            info!(row, "last data row (Total)");
            return Some(DataBounds {
                first: first?,
                last: row,
            });
        }
    }

    warn!(found_first = first.is_some(), "data bounds not found");
    None
}
