use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed vocabulary of asset categories: 17 leaf codes read straight off
/// table rows plus 3 composites derived from them. Unknown codes are
/// rejected at construction, so a typo can never travel as a string key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetCode {
    Cash,
    DomesticEquitySecurities,
    ForeignEquitySecurities,
    NonInvestDomesticBonds,
    NonInvestForeignBondsRated,
    DomesticRealEstate,
    ForeignRealEstate,
    DomesticEquities,
    ForeignEquities,
    DomesticBonds,
    DomesticBondsJunk,
    ForeignBondsRated,
    ForeignBondsJunk,
    DomesticRealEstateInvestments,
    ForeignRealEstateInvestments,
    Other,
    OtherInvestments,
    // Composites, calculated rather than read from the table.
    Bonds,
    Equities,
    RealEstate,
}

impl AssetCode {
    /// The 17 terminal categories, in table order.
    pub const LEAVES: [AssetCode; 17] = [
        AssetCode::Cash,
        AssetCode::DomesticEquitySecurities,
        AssetCode::ForeignEquitySecurities,
        AssetCode::NonInvestDomesticBonds,
        AssetCode::NonInvestForeignBondsRated,
        AssetCode::DomesticRealEstate,
        AssetCode::ForeignRealEstate,
        AssetCode::DomesticEquities,
        AssetCode::ForeignEquities,
        AssetCode::DomesticBonds,
        AssetCode::DomesticBondsJunk,
        AssetCode::ForeignBondsRated,
        AssetCode::ForeignBondsJunk,
        AssetCode::DomesticRealEstateInvestments,
        AssetCode::ForeignRealEstateInvestments,
        AssetCode::Other,
        AssetCode::OtherInvestments,
    ];

    pub const COMPOSITES: [AssetCode; 3] =
        [AssetCode::Bonds, AssetCode::Equities, AssetCode::RealEstate];

    pub fn is_composite(self) -> bool {
        matches!(
            self,
            AssetCode::Bonds | AssetCode::Equities | AssetCode::RealEstate
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetCode::Cash => "CASH",
            AssetCode::DomesticEquitySecurities => "DOMESTICEQUITYSECURITIES",
            AssetCode::ForeignEquitySecurities => "FOREIGNEQUITYSECURITIES",
            AssetCode::NonInvestDomesticBonds => "NONINVESTDOMESTICBONDS",
            AssetCode::NonInvestForeignBondsRated => "NONINVESTFOREIGNBONDSRATED",
            AssetCode::DomesticRealEstate => "DOMESTICREALESTATE",
            AssetCode::ForeignRealEstate => "FOREIGNREALESTATE",
            AssetCode::DomesticEquities => "DOMESTICEQUITIES",
            AssetCode::ForeignEquities => "FOREIGNEQUITIES",
            AssetCode::DomesticBonds => "DOMESTICBONDS",
            AssetCode::DomesticBondsJunk => "DOMESTICBONDSJUNK",
            AssetCode::ForeignBondsRated => "FOREIGNBONDSRATED",
            AssetCode::ForeignBondsJunk => "FOREIGNBONDSJUNK",
            AssetCode::DomesticRealEstateInvestments => "DOMESTICREALESTATEINVESTMENTS",
            AssetCode::ForeignRealEstateInvestments => "FOREIGNREALESTATEINVESTMENTS",
            AssetCode::Other => "OTHER",
            AssetCode::OtherInvestments => "OTHERINVESTMENTS",
            AssetCode::Bonds => "BONDS",
            AssetCode::Equities => "EQUITIES",
            AssetCode::RealEstate => "REALESTATE",
        }
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for code in AssetCode::LEAVES.iter().chain(AssetCode::COMPOSITES.iter()) {
            if code.as_str() == s {
                return Ok(*code);
            }
        }
        bail!("unknown asset code: {s:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_code() {
        for code in AssetCode::LEAVES.iter().chain(AssetCode::COMPOSITES.iter()) {
            assert_eq!(code.as_str().parse::<AssetCode>().unwrap(), *code);
        }
    }

    #[test]
    fn rejects_unknown_code() {
        assert!("DOMESTICGOLD".parse::<AssetCode>().is_err());
        assert!("cash".parse::<AssetCode>().is_err());
    }

    #[test]
    fn composites_are_not_leaves() {
        assert!(AssetCode::Bonds.is_composite());
        assert!(!AssetCode::DomesticBonds.is_composite());
        assert!(AssetCode::LEAVES.iter().all(|c| !c.is_composite()));
    }

    #[test]
    fn serializes_as_flat_code() {
        let json = serde_json::to_string(&AssetCode::NonInvestForeignBondsRated).unwrap();
        assert_eq!(json, "\"NONINVESTFOREIGNBONDSRATED\"");
    }
}
