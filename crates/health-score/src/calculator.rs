use moat_core::Criterion;
use serde::Serialize;

use crate::weights::{Scenario, ScoreWeights};

const MAX_SCORE: u32 = 100;

/// A criterion together with the weight it carries in the active scenario
#[derive(Debug, Clone, Serialize)]
pub struct WeightedCriterion {
    #[serde(flatten)]
    pub criterion: Criterion,
    pub weight: u32,
}

/// Full scoring detail for display
#[derive(Debug, Clone, Serialize)]
pub struct HealthScoreBreakdown {
    pub scenario: Scenario,
    /// Weighted score, 0-100
    pub total: u32,
    /// Highest score reachable with the criteria that were present
    pub max: u32,
    pub criteria: Vec<WeightedCriterion>,
}

/// Weighted health score over a list of pass/fail criteria
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthScoreCalculator;

impl HealthScoreCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Sum the scenario weight of every passing criterion, clamped to 0-100.
    pub fn score(&self, criteria: &[Criterion]) -> u32 {
        let weights = ScoreWeights::for_criteria(criteria);
        let total: u32 = criteria
            .iter()
            .filter(|c| c.is_pass())
            .map(|c| weights.weight(&c.name))
            .sum();
        total.min(MAX_SCORE)
    }

    pub fn breakdown(&self, criteria: &[Criterion]) -> HealthScoreBreakdown {
        let weights = ScoreWeights::for_criteria(criteria);
        let weighted: Vec<WeightedCriterion> = criteria
            .iter()
            .map(|c| WeightedCriterion {
                criterion: c.clone(),
                weight: weights.weight(&c.name),
            })
            .collect();

        let max: u32 = weighted.iter().map(|w| w.weight).sum();
        let total: u32 = weighted
            .iter()
            .filter(|w| w.criterion.is_pass())
            .map(|w| w.weight)
            .sum();

        tracing::debug!(
            "Health score ({}): {}/{} over {} criteria",
            weights.scenario().to_label(),
            total,
            max,
            criteria.len()
        );

        HealthScoreBreakdown {
            scenario: weights.scenario(),
            total: total.min(MAX_SCORE),
            max: max.min(MAX_SCORE),
            criteria: weighted,
        }
    }
}
