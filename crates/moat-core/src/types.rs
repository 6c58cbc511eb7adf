use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Name of the criterion whose status is driven by the moat evaluation.
pub const ECONOMIC_MOAT: &str = "Economic Moat";

/// Pass/fail state of a single health criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionStatus {
    Pass,
    Fail,
    #[serde(rename = "Pending Evaluation")]
    PendingEvaluation,
    #[serde(rename = "Analyzing...")]
    Analyzing,
    /// Anything the upstream sends that we don't recognise. Never counts as passing.
    #[serde(other)]
    Unknown,
}

impl CriterionStatus {
    pub fn to_label(&self) -> &'static str {
        match self {
            CriterionStatus::Pass => "Pass",
            CriterionStatus::Fail => "Fail",
            CriterionStatus::PendingEvaluation => "Pending Evaluation",
            CriterionStatus::Analyzing => "Analyzing...",
            CriterionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

/// A named health check with a display value, as served by the stock data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub status: CriterionStatus,
    #[serde(default)]
    pub value: String,
}

impl Criterion {
    pub fn new(name: impl Into<String>, status: CriterionStatus, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            value: value.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == CriterionStatus::Pass
    }
}

/// Rating of a single moat factor.
///
/// Parsing is total: trimmed, case-insensitive `high` and `low` are recognised and
/// everything else (unknown words, numbers, null, missing) becomes `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "serde_json::Value")]
pub enum MoatRating {
    High,
    Low,
    #[default]
    None,
}

impl MoatRating {
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("high") {
            MoatRating::High
        } else if trimmed.eq_ignore_ascii_case("low") {
            MoatRating::Low
        } else {
            MoatRating::None
        }
    }

    /// Contribution of this rating to the 0-5 moat score
    pub fn points(&self) -> f64 {
        match self {
            MoatRating::High => 1.0,
            MoatRating::Low => 0.5,
            MoatRating::None => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoatRating::High => "High",
            MoatRating::Low => "Low",
            MoatRating::None => "None",
        }
    }
}

impl From<serde_json::Value> for MoatRating {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => MoatRating::normalize(&s),
            _ => MoatRating::None,
        }
    }
}

impl From<MoatRating> for String {
    fn from(rating: MoatRating) -> Self {
        rating.as_str().to_string()
    }
}

impl fmt::Display for MoatRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five factors a moat is rated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoatFactor {
    BrandMonopoly,
    NetworkEffect,
    EconomyOfScale,
    HighBarrierToEntry,
    HighSwitchingCost,
}

impl MoatFactor {
    pub const ALL: [MoatFactor; 5] = [
        MoatFactor::BrandMonopoly,
        MoatFactor::NetworkEffect,
        MoatFactor::EconomyOfScale,
        MoatFactor::HighBarrierToEntry,
        MoatFactor::HighSwitchingCost,
    ];

    /// Human-readable name, as used in prompts and reports
    pub fn to_label(&self) -> &'static str {
        match self {
            MoatFactor::BrandMonopoly => "Brand Monopoly",
            MoatFactor::NetworkEffect => "Network Effect",
            MoatFactor::EconomyOfScale => "Economy of Scale",
            MoatFactor::HighBarrierToEntry => "High Barrier to Entry",
            MoatFactor::HighSwitchingCost => "High Switching Cost",
        }
    }

    /// JSON field name in a `MoatEvaluation`
    pub fn json_key(&self) -> &'static str {
        match self {
            MoatFactor::BrandMonopoly => "brandMonopoly",
            MoatFactor::NetworkEffect => "networkEffect",
            MoatFactor::EconomyOfScale => "economyOfScale",
            MoatFactor::HighBarrierToEntry => "highBarrierToEntry",
            MoatFactor::HighSwitchingCost => "highSwitchingCost",
        }
    }
}

/// Moat factor ratings plus the model's rationale for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoatEvaluation {
    #[serde(default)]
    pub brand_monopoly: MoatRating,
    #[serde(default)]
    pub network_effect: MoatRating,
    #[serde(default)]
    pub economy_of_scale: MoatRating,
    #[serde(default)]
    pub high_barrier_to_entry: MoatRating,
    #[serde(default)]
    pub high_switching_cost: MoatRating,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
}

/// `null` reads as empty text, other non-string values as their JSON form.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

impl MoatEvaluation {
    pub fn rating(&self, factor: MoatFactor) -> MoatRating {
        match factor {
            MoatFactor::BrandMonopoly => self.brand_monopoly,
            MoatFactor::NetworkEffect => self.network_effect,
            MoatFactor::EconomyOfScale => self.economy_of_scale,
            MoatFactor::HighBarrierToEntry => self.high_barrier_to_entry,
            MoatFactor::HighSwitchingCost => self.high_switching_cost,
        }
    }

    pub fn ratings(&self) -> [(MoatFactor, MoatRating); 5] {
        MoatFactor::ALL.map(|factor| (factor, self.rating(factor)))
    }
}

/// Three-tier moat classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoatType {
    #[serde(rename = "No Moat")]
    NoMoat,
    #[serde(rename = "Narrow Moat")]
    NarrowMoat,
    #[serde(rename = "Wide Moat")]
    WideMoat,
}

impl MoatType {
    /// Classify a 0-5 moat score
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s > 3.0 => MoatType::WideMoat,
            s if s >= 2.0 => MoatType::NarrowMoat,
            _ => MoatType::NoMoat,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            MoatType::NoMoat => "No Moat",
            MoatType::NarrowMoat => "Narrow Moat",
            MoatType::WideMoat => "Wide Moat",
        }
    }

    /// Whether the "Economic Moat" criterion passes. Only a wide moat does.
    pub fn is_passing(&self) -> bool {
        matches!(self, MoatType::WideMoat)
    }
}

impl fmt::Display for MoatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMoatResult {
    pub total_score: f64,
    pub moat_type: MoatType,
}

/// What is currently known about a ticker's moat, as far as the criteria list cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoatState {
    NotEvaluated,
    Evaluating,
    Resolved(MoatType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_normalization() {
        assert_eq!(MoatRating::normalize(" high "), MoatRating::High);
        assert_eq!(MoatRating::normalize("LOW"), MoatRating::Low);
        assert_eq!(MoatRating::normalize("None"), MoatRating::None);
        assert_eq!(MoatRating::normalize("medium"), MoatRating::None);
        assert_eq!(MoatRating::normalize(""), MoatRating::None);
    }

    #[test]
    fn test_evaluation_deserialize_normalizes() {
        let json = r#"{
            "brandMonopoly": " high ",
            "networkEffect": "LOW",
            "economyOfScale": "Moderate",
            "highBarrierToEntry": 3,
            "description": "Strong brand."
        }"#;
        let eval: MoatEvaluation = serde_json::from_str(json).unwrap();
        assert_eq!(eval.brand_monopoly, MoatRating::High);
        assert_eq!(eval.network_effect, MoatRating::Low);
        assert_eq!(eval.economy_of_scale, MoatRating::None);
        assert_eq!(eval.high_barrier_to_entry, MoatRating::None);
        // Missing field defaults to None
        assert_eq!(eval.high_switching_cost, MoatRating::None);
        assert_eq!(eval.description, "Strong brand.");
    }

    #[test]
    fn test_null_description_reads_as_empty() {
        let eval: MoatEvaluation =
            serde_json::from_str(r#"{"brandMonopoly":"High","description":null}"#).unwrap();
        assert_eq!(eval.brand_monopoly, MoatRating::High);
        assert_eq!(eval.description, "");

        let eval: MoatEvaluation = serde_json::from_str(r#"{"description":42}"#).unwrap();
        assert_eq!(eval.description, "42");
    }

    #[test]
    fn test_evaluation_serializes_canonical_strings() {
        let eval = MoatEvaluation {
            brand_monopoly: MoatRating::High,
            network_effect: MoatRating::Low,
            economy_of_scale: MoatRating::None,
            high_barrier_to_entry: MoatRating::High,
            high_switching_cost: MoatRating::Low,
            description: String::new(),
        };
        let value = serde_json::to_value(&eval).unwrap();
        assert_eq!(value["brandMonopoly"], "High");
        assert_eq!(value["highSwitchingCost"], "Low");
        assert_eq!(value["economyOfScale"], "None");
    }

    #[test]
    fn test_criterion_status_strings() {
        let c: Criterion =
            serde_json::from_str(r#"{"name":"Economic Moat","status":"Analyzing...","value":"Pending"}"#)
                .unwrap();
        assert_eq!(c.status, CriterionStatus::Analyzing);

        let c: Criterion =
            serde_json::from_str(r#"{"name":"ROE > 12-15%","status":"Pending Evaluation"}"#).unwrap();
        assert_eq!(c.status, CriterionStatus::PendingEvaluation);
        assert_eq!(c.value, "");

        let c: Criterion = serde_json::from_str(r#"{"name":"X","status":"Maybe","value":"?"}"#).unwrap();
        assert_eq!(c.status, CriterionStatus::Unknown);
        assert!(!c.is_pass());
    }

    #[test]
    fn test_moat_type_thresholds() {
        assert_eq!(MoatType::from_score(5.0), MoatType::WideMoat);
        assert_eq!(MoatType::from_score(3.5), MoatType::WideMoat);
        assert_eq!(MoatType::from_score(3.0), MoatType::NarrowMoat);
        assert_eq!(MoatType::from_score(2.0), MoatType::NarrowMoat);
        assert_eq!(MoatType::from_score(1.5), MoatType::NoMoat);
        assert_eq!(MoatType::from_score(0.0), MoatType::NoMoat);
    }

    #[test]
    fn test_only_wide_moat_passes() {
        assert!(MoatType::WideMoat.is_passing());
        assert!(!MoatType::NarrowMoat.is_passing());
        assert!(!MoatType::NoMoat.is_passing());
    }
}
