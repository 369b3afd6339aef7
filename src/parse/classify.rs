//! Row classification for the two-period allocation table.
//!
//! Extraction strips indentation and emphasis, so the only signal left is
//! each row's label text and strict row order. The table is a rooted tree
//! of sibling groups: two rows (domestic/foreign) under the top-level
//! sections, four rows (rated/junk × domestic/foreign) under the bond
//! subsection of "Investment funds". A section or subsection is opened by
//! its header row and closed by its final sibling ("foreign", or the
//! foreign below-BBB row in the four-row group) — there is no other way to
//! know a branch has ended.

use crate::grid::RawGrid;
use crate::parse::bounds::DataBounds;
use crate::parse::codes::AssetCode;
use crate::parse::columns::ColumnMap;
use crate::parse::numbers::clean_number;
use crate::parse::{ParseConfig, PeriodRecord};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    EquitySecurities,
    Bonds,
    RealEstate,
    InvestmentFunds,
}

/// Subsections only exist under "Investment funds".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsection {
    Equity,
    Bonds,
    RealEstate,
}

/// Cursor over the classification pass. Carried across the whole row
/// range; both fields reset to `None` when a sibling group closes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseState {
    pub section: Option<Section>,
    pub subsection: Option<Subsection>,
}

/// What a single row contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// The grand-total row; values come from the total columns.
    Total,
    /// A leaf category; values come from the allocation columns.
    Leaf(AssetCode),
    /// Header, decorative, or swallowed by an open group.
    Nothing,
}

/// Classify one row label and advance the state machine. Rules fire in a
/// fixed precedence order and the first match wins; a label matching none
/// of them is decorative. An active subsection always outranks its
/// enclosing "Investment funds" dispatch.
///
/// Known hazard: the four-row bond group only closes on its foreign
/// below-BBB sibling. An edition that omits that row would leave the
/// subsection open and misattribute whatever comes next; no edition seen
/// so far does, and there is no label-only signal to detect it.
pub fn classify_label(state: &mut ParseState, label: &str) -> RowOutcome {
    let label = label.trim().to_lowercase();

    if label.contains("total fair value of plan assets") {
        return RowOutcome::Total;
    }
    if label.contains("other investments") {
        return RowOutcome::Leaf(AssetCode::OtherInvestments);
    }
    if label.contains("cash and cash equivalents") {
        return RowOutcome::Leaf(AssetCode::Cash);
    }

    if label == "equity securities" {
        state.section = Some(Section::EquitySecurities);
        return RowOutcome::Nothing;
    }
    if state.section == Some(Section::EquitySecurities) {
        if label.contains("domestic") {
            return RowOutcome::Leaf(AssetCode::DomesticEquitySecurities);
        }
        if label.contains("foreign") {
            state.section = None;
            return RowOutcome::Leaf(AssetCode::ForeignEquitySecurities);
        }
        return RowOutcome::Nothing;
    }

    // Inside "Investment funds" the bond group header is also spelled
    // "Bonds" (often with a footnote marker, hence starts-with below); the
    // top-level section must not reopen there.
    if label == "bonds" && state.section != Some(Section::InvestmentFunds) {
        state.section = Some(Section::Bonds);
        return RowOutcome::Nothing;
    }
    if state.section == Some(Section::Bonds) {
        if label.contains("domestic") && label.contains("aaa to bbb") {
            return RowOutcome::Leaf(AssetCode::NonInvestDomesticBonds);
        }
        if label.contains("foreign") && label.contains("aaa to bbb") {
            state.section = None;
            return RowOutcome::Leaf(AssetCode::NonInvestForeignBondsRated);
        }
        return RowOutcome::Nothing;
    }

    if label.contains("real estate") && label.contains("property") {
        state.section = Some(Section::RealEstate);
        return RowOutcome::Nothing;
    }
    if state.section == Some(Section::RealEstate) {
        if label.contains("domestic") {
            return RowOutcome::Leaf(AssetCode::DomesticRealEstate);
        }
        if label.contains("foreign") {
            state.section = None;
            return RowOutcome::Leaf(AssetCode::ForeignRealEstate);
        }
        return RowOutcome::Nothing;
    }

    if label.contains("investment funds") {
        state.section = Some(Section::InvestmentFunds);
        return RowOutcome::Nothing;
    }

    // Subsection rules outrank the "Investment funds" dispatch below.
    match state.subsection {
        Some(Subsection::Equity) => {
            if label.contains("domestic") {
                return RowOutcome::Leaf(AssetCode::DomesticEquities);
            }
            if label.contains("foreign") {
                state.subsection = None;
                return RowOutcome::Leaf(AssetCode::ForeignEquities);
            }
            return RowOutcome::Nothing;
        }
        Some(Subsection::Bonds) => {
            if label.contains("domestic") && label.contains("aaa to bbb") {
                return RowOutcome::Leaf(AssetCode::DomesticBonds);
            }
            if label.contains("domestic") && label.contains("below bbb") {
                return RowOutcome::Leaf(AssetCode::DomesticBondsJunk);
            }
            if label.contains("foreign") && label.contains("aaa to bbb") {
                return RowOutcome::Leaf(AssetCode::ForeignBondsRated);
            }
            if label.contains("foreign") && label.contains("below bbb") {
                // Fourth sibling of the four-row group.
                state.subsection = None;
                return RowOutcome::Leaf(AssetCode::ForeignBondsJunk);
            }
            return RowOutcome::Nothing;
        }
        Some(Subsection::RealEstate) => {
            if label.contains("domestic") {
                return RowOutcome::Leaf(AssetCode::DomesticRealEstateInvestments);
            }
            if label.contains("foreign") {
                state.subsection = None;
                return RowOutcome::Leaf(AssetCode::ForeignRealEstateInvestments);
            }
            return RowOutcome::Nothing;
        }
        None => {}
    }

    if state.section == Some(Section::InvestmentFunds) {
        if label == "equity" {
            state.subsection = Some(Subsection::Equity);
        } else if label.starts_with("bonds") {
            state.subsection = Some(Subsection::Bonds);
        } else if label == "real estate" {
            state.subsection = Some(Subsection::RealEstate);
        } else if label == "other" {
            // Terminal leaf of the funds section, opens no subsection.
            return RowOutcome::Leaf(AssetCode::Other);
        }
        return RowOutcome::Nothing;
    }

    RowOutcome::Nothing
}

/// Walk rows `[first..=last]` with one `ParseState`, reading each period's
/// values from that period's own columns. A leaf missing its value in one
/// period never suppresses the other period's value, and a value only
/// lands under the leaf the label matched.
pub fn classify_rows(
    grid: &RawGrid,
    columns: &ColumnMap,
    bounds: DataBounds,
    cfg: &ParseConfig,
) -> (PeriodRecord, PeriodRecord) {
    let mut year1 = PeriodRecord {
        period: columns.year1.year.clone(),
        total_assets: None,
        allocations: BTreeMap::new(),
    };
    let mut year2 = PeriodRecord {
        period: columns.year2.year.clone(),
        total_assets: None,
        allocations: BTreeMap::new(),
    };

    let mut state = ParseState::default();

    for row in bounds.first..=bounds.last.min(grid.n_rows().saturating_sub(1)) {
        let label = grid.cell(row, 0).trim();
        if label.is_empty() || label.eq_ignore_ascii_case("nan") {
            continue;
        }

        let pct1 = clean_number(grid.cell(row, columns.year1.allocation_col).trim());
        let pct2 = clean_number(grid.cell(row, columns.year2.allocation_col).trim());

        match classify_label(&mut state, label) {
            RowOutcome::Total => {
                let total1 = clean_number(grid.cell(row, columns.year1.total_col).trim());
                let total2 = clean_number(grid.cell(row, columns.year2.total_col).trim());
                // Floor keeps a stray small number in the total column from
                // being mistaken for a multi-billion plan total.
                if let Some(t) = total1.filter(|t| *t > cfg.total_assets_floor) {
                    year1.total_assets = Some(t);
                }
                if let Some(t) = total2.filter(|t| *t > cfg.total_assets_floor) {
                    year2.total_assets = Some(t);
                }
            }
            RowOutcome::Leaf(code) => {
                debug!(row, label, %code, pct1, pct2, "classified row");
                if let Some(v) = pct1 {
                    year1.allocations.insert(code, v);
                }
                if let Some(v) = pct2 {
                    year2.allocations.insert(code, v);
                }
            }
            RowOutcome::Nothing => {}
        }
    }

    (year1, year2)
}
