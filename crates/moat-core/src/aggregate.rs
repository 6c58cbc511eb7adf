use crate::types::{AggregatedMoatResult, MoatEvaluation, MoatType};

/// Reduce the five factor ratings to a 0-5 score and a moat tier.
///
/// High counts 1.0, Low 0.5, None 0.0. Scores above 3 are a wide moat, 2 through 3
/// (inclusive) a narrow moat, anything below 2 no moat.
pub fn aggregate(evaluation: &MoatEvaluation) -> AggregatedMoatResult {
    let total_score: f64 = evaluation
        .ratings()
        .iter()
        .map(|(_, rating)| rating.points())
        .sum();

    AggregatedMoatResult {
        total_score,
        moat_type: MoatType::from_score(total_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoatRating;
    use approx::assert_relative_eq;

    fn evaluation(ratings: [&str; 5]) -> MoatEvaluation {
        MoatEvaluation {
            brand_monopoly: MoatRating::normalize(ratings[0]),
            network_effect: MoatRating::normalize(ratings[1]),
            economy_of_scale: MoatRating::normalize(ratings[2]),
            high_barrier_to_entry: MoatRating::normalize(ratings[3]),
            high_switching_cost: MoatRating::normalize(ratings[4]),
            description: "test".to_string(),
        }
    }

    #[test]
    fn test_all_high_is_wide_moat() {
        let result = aggregate(&evaluation(["High"; 5]));
        assert_relative_eq!(result.total_score, 5.0);
        assert_eq!(result.moat_type, MoatType::WideMoat);
    }

    #[test]
    fn test_all_none_is_no_moat() {
        let result = aggregate(&evaluation(["None"; 5]));
        assert_relative_eq!(result.total_score, 0.0);
        assert_eq!(result.moat_type, MoatType::NoMoat);
    }

    #[test]
    fn test_mixed_case_and_whitespace() {
        let messy = aggregate(&evaluation([" high ", "LOW", "hIgH", "low ", "none"]));
        let clean = aggregate(&evaluation(["High", "Low", "High", "Low", "None"]));
        assert_relative_eq!(messy.total_score, clean.total_score);
        assert_relative_eq!(messy.total_score, 3.0);
        assert_eq!(messy.moat_type, MoatType::NarrowMoat);
    }

    #[test]
    fn test_unrecognized_values_contribute_nothing() {
        let result = aggregate(&evaluation(["Medium", "Very High", "N/A", "", "High"]));
        assert_relative_eq!(result.total_score, 1.0);
        assert_eq!(result.moat_type, MoatType::NoMoat);
    }

    #[test]
    fn test_boundaries() {
        // 4 High + 1 Low = 4.5
        let result = aggregate(&evaluation(["High", "High", "High", "High", "Low"]));
        assert_relative_eq!(result.total_score, 4.5);
        assert_eq!(result.moat_type, MoatType::WideMoat);

        // 2 Low + 3 None = 1.0
        let result = aggregate(&evaluation(["Low", "Low", "None", "None", "None"]));
        assert_relative_eq!(result.total_score, 1.0);
        assert_eq!(result.moat_type, MoatType::NoMoat);

        // 2 High + 2 None + 1 Low = 2.5
        let result = aggregate(&evaluation(["High", "None", "High", "None", "Low"]));
        assert_relative_eq!(result.total_score, 2.5);
        assert_eq!(result.moat_type, MoatType::NarrowMoat);

        // Exactly 2 and exactly 3 are both narrow
        let result = aggregate(&evaluation(["High", "High", "None", "None", "None"]));
        assert_eq!(result.moat_type, MoatType::NarrowMoat);
        let result = aggregate(&evaluation(["High", "High", "High", "None", "None"]));
        assert_eq!(result.moat_type, MoatType::NarrowMoat);

        // 1.5 is just under narrow
        let result = aggregate(&evaluation(["High", "Low", "None", "None", "None"]));
        assert_eq!(result.moat_type, MoatType::NoMoat);
    }
}
