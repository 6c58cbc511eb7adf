//! Health Score Module
//!
//! Turns the stock data API's pass/fail criteria into a single 0-100 score, after the
//! "Economic Moat" criterion has been brought in line with the current moat evaluation.

pub mod calculator;
pub mod overrides;
pub mod weights;

pub use calculator::{HealthScoreBreakdown, HealthScoreCalculator, WeightedCriterion};
pub use overrides::apply_moat_override;
pub use weights::{Scenario, ScoreWeights};
