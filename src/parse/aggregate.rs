use crate::parse::codes::AssetCode;
use crate::parse::PeriodRecord;
use tracing::info;

/// Composite → the top-level leaves it sums. Indirect exposure through
/// pooled vehicles (the "Investment funds" sub-allocations) is counted
/// separately and deliberately excluded here.
const COMPOSITE_PARTS: [(AssetCode, [AssetCode; 2]); 3] = [
    (
        AssetCode::Bonds,
        [
            AssetCode::NonInvestDomesticBonds,
            AssetCode::NonInvestForeignBondsRated,
        ],
    ),
    (
        AssetCode::Equities,
        [
            AssetCode::DomesticEquitySecurities,
            AssetCode::ForeignEquitySecurities,
        ],
    ),
    (
        AssetCode::RealEstate,
        [AssetCode::DomesticRealEstate, AssetCode::ForeignRealEstate],
    ),
];

/// Add the three composite percentages to a period record. A missing leaf
/// contributes 0, so composites are always present after this call.
pub fn aggregate(record: &mut PeriodRecord) {
    for (composite, parts) in COMPOSITE_PARTS {
        let total: f64 = parts
            .iter()
            .map(|leaf| record.allocations.get(leaf).copied().unwrap_or(0.0))
            .sum();
        record.allocations.insert(composite, total);
    }

    info!(
        period = %record.period,
        bonds = record.allocations[&AssetCode::Bonds],
        equities = record.allocations[&AssetCode::Equities],
        real_estate = record.allocations[&AssetCode::RealEstate],
        "calculated aggregated percentages"
    );
}
