//! Offline moat estimate from reported financials.
//!
//! Each factor is approximated by one metric:
//! brand monopoly by gross margin, barriers to entry by ROIC, economies of scale by
//! revenue, network effect by net margin and switching cost by revenue growth.
//! The result is an ordinary `MoatEvaluation`, so it goes through the same aggregation
//! and pass rule as a model-generated one.

use serde::{Deserialize, Serialize};

use crate::types::{MoatEvaluation, MoatRating};

/// Latest-period financial metrics used as moat proxies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialProxies {
    /// Gross margin in percent (e.g. 45.0)
    pub gross_margin_pct: Option<f64>,
    /// Return on invested capital as a fraction (e.g. 0.18)
    pub roic: Option<f64>,
    /// Annual revenue in currency units
    pub revenue: Option<f64>,
    /// Net margin in percent
    pub net_margin_pct: Option<f64>,
    /// Year-over-year revenue growth as a fraction
    pub revenue_growth: Option<f64>,
}

fn tier(value: Option<f64>, high_above: f64, low_above: f64) -> MoatRating {
    match value {
        Some(v) if v > high_above => MoatRating::High,
        Some(v) if v > low_above => MoatRating::Low,
        _ => MoatRating::None,
    }
}

pub fn estimate_from_financials(proxies: &FinancialProxies) -> MoatEvaluation {
    MoatEvaluation {
        brand_monopoly: tier(proxies.gross_margin_pct, 40.0, 20.0),
        network_effect: tier(proxies.net_margin_pct, 20.0, 10.0),
        economy_of_scale: tier(proxies.revenue, 100e9, 10e9),
        high_barrier_to_entry: tier(proxies.roic, 0.15, 0.10),
        high_switching_cost: tier(proxies.revenue_growth, 0.15, 0.05),
        description: "Estimated from financial proxies: gross margin, ROIC, revenue scale, \
                      net margin and revenue growth."
            .to_string(),
    }
}
