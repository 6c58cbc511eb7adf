//! Scenario weight tables for the health score.
//!
//! Which table applies is decided purely by which criteria the stock data API sent:
//! REITs get a gearing-ratio criterion, physical-goods businesses get a cash
//! conversion cycle criterion, everything else is scored on the standard table.
//! Every table sums to 100 over its complete criteria set. "Net Income Increasing" and
//! "Operating Income Increasing" are alternatives (the API sends one or the other), so
//! they share one slot.

use moat_core::{Criterion, ECONOMIC_MOAT};
use serde::{Deserialize, Serialize};

pub const HISTORICAL_TREND: &str = "Historical Trend (20Y)";
pub const NET_INCOME_INCREASING: &str = "Net Income Increasing";
pub const OPERATING_INCOME_INCREASING: &str = "Operating Income Increasing";
pub const OPERATING_CASH_FLOW_INCREASING: &str = "Operating Cash Flow Increasing";
pub const REVENUE_INCREASING: &str = "Revenue Increasing";
pub const GROSS_MARGIN_STABLE: &str = "Gross Margin Stable/Increasing";
pub const NET_MARGIN_STABLE: &str = "Net Margin Stable/Increasing";
pub const ROE_ABOVE: &str = "ROE > 12-15%";
pub const ROIC_ABOVE: &str = "ROIC > 12-15%";
pub const REVENUE_VS_RECEIVABLES: &str = "Revenue > AR or Growing Faster";
pub const CCC_STABLE: &str = "CCC Stable/Reducing";
pub const DEBT_TO_EBITDA: &str = "Debt/EBITDA < 3";
pub const DEBT_SERVICING_RATIO: &str = "Debt Servicing Ratio < 30%";
pub const CURRENT_RATIO: &str = "Current Ratio > 1.5";
pub const GEARING_RATIO: &str = "Gearing Ratio < 45%";

type WeightTable = &'static [(&'static str, u32)];

const STANDARD_WEIGHTS: WeightTable = &[
    (HISTORICAL_TREND, 5),
    (NET_INCOME_INCREASING, 5),
    (OPERATING_INCOME_INCREASING, 5),
    (OPERATING_CASH_FLOW_INCREASING, 10),
    (REVENUE_INCREASING, 5),
    (GROSS_MARGIN_STABLE, 10),
    (NET_MARGIN_STABLE, 5),
    (ROE_ABOVE, 10),
    (ROIC_ABOVE, 15),
    (REVENUE_VS_RECEIVABLES, 5),
    (ECONOMIC_MOAT, 20),
    (DEBT_TO_EBITDA, 5),
    (DEBT_SERVICING_RATIO, 2),
    (CURRENT_RATIO, 3),
];

const CCC_WEIGHTS: WeightTable = &[
    (HISTORICAL_TREND, 10),
    (NET_INCOME_INCREASING, 5),
    (OPERATING_INCOME_INCREASING, 5),
    (OPERATING_CASH_FLOW_INCREASING, 5),
    (REVENUE_INCREASING, 10),
    (GROSS_MARGIN_STABLE, 10),
    (NET_MARGIN_STABLE, 5),
    (ROE_ABOVE, 5),
    (ROIC_ABOVE, 15),
    (REVENUE_VS_RECEIVABLES, 1),
    (CCC_STABLE, 3),
    (ECONOMIC_MOAT, 20),
    (DEBT_TO_EBITDA, 5),
    (DEBT_SERVICING_RATIO, 1),
    (CURRENT_RATIO, 5),
];

const REIT_WEIGHTS: WeightTable = &[
    (HISTORICAL_TREND, 10),
    (NET_INCOME_INCREASING, 3),
    (OPERATING_INCOME_INCREASING, 3),
    (OPERATING_CASH_FLOW_INCREASING, 3),
    (REVENUE_INCREASING, 3),
    (GROSS_MARGIN_STABLE, 5),
    (NET_MARGIN_STABLE, 5),
    (ROE_ABOVE, 10),
    (ROIC_ABOVE, 15),
    (REVENUE_VS_RECEIVABLES, 1),
    (ECONOMIC_MOAT, 5),
    (DEBT_TO_EBITDA, 15),
    (DEBT_SERVICING_RATIO, 15),
    (CURRENT_RATIO, 5),
    (GEARING_RATIO, 5),
];

/// Which weight table a criteria list is scored against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    Reit,
    CashConversionCycle,
    Standard,
}

impl Scenario {
    /// Pick the scenario from the criterion names present. REIT wins over CCC.
    pub fn detect(criteria: &[Criterion]) -> Self {
        let has = |name: &str| criteria.iter().any(|c| c.name == name);
        if has(GEARING_RATIO) {
            Scenario::Reit
        } else if has(CCC_STABLE) {
            Scenario::CashConversionCycle
        } else {
            Scenario::Standard
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Scenario::Reit => "REIT",
            Scenario::CashConversionCycle => "Cash Conversion Cycle",
            Scenario::Standard => "Standard",
        }
    }
}

/// Criterion-name to weight lookup for one scenario
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    scenario: Scenario,
    table: WeightTable,
}

impl ScoreWeights {
    pub fn for_scenario(scenario: Scenario) -> Self {
        let table = match scenario {
            Scenario::Reit => REIT_WEIGHTS,
            Scenario::CashConversionCycle => CCC_WEIGHTS,
            Scenario::Standard => STANDARD_WEIGHTS,
        };
        Self { scenario, table }
    }

    pub fn for_criteria(criteria: &[Criterion]) -> Self {
        Self::for_scenario(Scenario::detect(criteria))
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Weight for a criterion name. Unknown names weigh 0.
    pub fn weight(&self, name: &str) -> u32 {
        let key = lookup_key(name);
        self.table
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.table.iter().copied()
    }
}

/// Map display variants of a criterion name onto the table key.
///
/// The API decorates some names (e.g. "Historical Trend (10Y) increasing"), so those
/// are matched by substring.
fn lookup_key(name: &str) -> &str {
    if name.contains("Historical Trend") {
        HISTORICAL_TREND
    } else if name.contains(NET_INCOME_INCREASING) {
        NET_INCOME_INCREASING
    } else if name.contains(OPERATING_INCOME_INCREASING) {
        OPERATING_INCOME_INCREASING
    } else {
        name
    }
}
