use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use moat_core::MoatEvaluation;

use crate::config::GeminiConfig;
use crate::error::{EvaluationError, ModelError};
use crate::model::{GeminiModel, GenerativeModel};
use crate::parse::parse_with_strategy;
use crate::prompt::build_prompt;

/// Anything that can produce a moat evaluation for a ticker
#[async_trait]
pub trait MoatEvaluator: Send + Sync {
    async fn evaluate(&self, ticker: &str) -> Result<MoatEvaluation, EvaluationError>;
}

/// Asks a generative model to rate a ticker's moat, falling back to a second model once.
///
/// No caching and no request deduplication: every call hits the model. Callers that
/// must avoid overlapping requests for one symbol track that themselves.
pub struct MoatEvaluationClient<M: GenerativeModel> {
    backend: M,
    primary_model: String,
    fallback_model: String,
}

impl MoatEvaluationClient<GeminiModel> {
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(
            GeminiModel::new(config),
            config.primary_model.clone(),
            config.fallback_model.clone(),
        )
    }
}

impl<M: GenerativeModel> MoatEvaluationClient<M> {
    pub fn new(backend: M, primary_model: impl Into<String>, fallback_model: impl Into<String>) -> Self {
        Self {
            backend,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    /// Evaluate `ticker` with a prompt dated `date`.
    ///
    /// The primary model is tried first; on any failure the fallback model is tried
    /// exactly once. The two attempts never overlap.
    pub async fn evaluate_on(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<MoatEvaluation, EvaluationError> {
        if !self.backend.is_configured() {
            return Err(EvaluationError::Configuration(
                "GEMINI_API_KEY not found in environment variables.".to_string(),
            ));
        }

        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(EvaluationError::InvalidTicker(ticker));
        }

        let prompt = build_prompt(&ticker, date);

        match self.attempt(&self.primary_model, &prompt).await {
            Ok(evaluation) => return Ok(evaluation),
            Err(e) => {
                tracing::warn!(
                    "Moat evaluation for {} failed on {}, falling back to {}: {}",
                    ticker,
                    self.primary_model,
                    self.fallback_model,
                    e
                );
            }
        }

        match self.attempt(&self.fallback_model, &prompt).await {
            Ok(evaluation) => Ok(evaluation),
            Err(e) => {
                tracing::warn!("Moat evaluation for {} failed on {}: {}", ticker, self.fallback_model, e);
                Err(EvaluationError::Exhausted {
                    model: self.fallback_model.clone(),
                    source: e,
                })
            }
        }
    }

    async fn attempt(&self, model: &str, prompt: &str) -> Result<MoatEvaluation, ModelError> {
        let text = self.backend.generate(model, prompt).await?;
        let (evaluation, strategy) = parse_with_strategy(&text)?;
        tracing::debug!(
            "Parsed {} response from {} via {:?}",
            model,
            self.backend.backend_name(),
            strategy
        );
        Ok(evaluation)
    }
}

#[async_trait]
impl<M: GenerativeModel> MoatEvaluator for MoatEvaluationClient<M> {
    async fn evaluate(&self, ticker: &str) -> Result<MoatEvaluation, EvaluationError> {
        self.evaluate_on(ticker, Local::now().date_naive()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelResult;
    use moat_core::MoatRating;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const GOOD: &str = r#"{"brandMonopoly":"High","networkEffect":"High","economyOfScale":"High","highBarrierToEntry":"Low","highSwitchingCost":"None","description":"Scale and brand."}"#;

    /// Replays canned responses and records which models were asked
    struct ScriptedModel {
        responses: Mutex<VecDeque<ModelResult<String>>>,
        calls: Mutex<Vec<String>>,
        configured: bool,
    }

    impl ScriptedModel {
        fn new(responses: Vec<ModelResult<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                configured: true,
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::new(Vec::new())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, model: &str, _prompt: &str) -> ModelResult<String> {
            self.calls.lock().unwrap().push(model.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::ServiceUnavailable("script exhausted".to_string())))
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn client(responses: Vec<ModelResult<String>>) -> MoatEvaluationClient<ScriptedModel> {
        MoatEvaluationClient::new(ScriptedModel::new(responses), "primary", "fallback")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let client = client(vec![Ok(GOOD.to_string())]);
        let eval = client.evaluate_on("aapl", date()).await.unwrap();
        assert_eq!(eval.brand_monopoly, MoatRating::High);
        assert_eq!(client.backend.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_primary_error_falls_back_once() {
        let client = client(vec![
            Err(ModelError::ServiceUnavailable("HTTP 503".to_string())),
            Ok(GOOD.to_string()),
        ]);
        let eval = client.evaluate_on("AAPL", date()).await.unwrap();
        assert_eq!(eval.high_barrier_to_entry, MoatRating::Low);
        assert_eq!(client.backend.calls(), vec!["primary", "fallback"]);
    }

    #[tokio::test]
    async fn test_unparseable_primary_falls_back() {
        let client = client(vec![
            Ok("I'm sorry, I can't help with that.".to_string()),
            Ok(format!("```json\n{}\n```", GOOD)),
        ]);
        let eval = client.evaluate_on("AAPL", date()).await.unwrap();
        assert_eq!(eval.description, "Scale and brand.");
        assert_eq!(client.backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_both_fail_surfaces_fallback_error() {
        let client = client(vec![
            Err(ModelError::ServiceUnavailable("primary down".to_string())),
            Err(ModelError::InvalidResponse("fallback empty".to_string())),
        ]);
        let err = client.evaluate_on("AAPL", date()).await.unwrap_err();

        match err {
            EvaluationError::Exhausted { model, source } => {
                assert_eq!(model, "fallback");
                assert!(matches!(source, ModelError::InvalidResponse(ref m) if m == "fallback empty"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Exactly two attempts, never more
        assert_eq!(client.backend.calls(), vec!["primary", "fallback"]);
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let client = MoatEvaluationClient::new(ScriptedModel::unconfigured(), "primary", "fallback");
        let err = client.evaluate_on("AAPL", date()).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Configuration(_)));
        assert!(client.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_ticker_rejected() {
        let client = client(vec![Ok(GOOD.to_string())]);
        let err = client.evaluate_on("   ", date()).await.unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidTicker(_)));
        assert!(client.backend.calls().is_empty());
    }

    #[tokio::test]
    #[ignore] // Only run with a valid GEMINI_API_KEY
    async fn test_live_evaluation() {
        let config = GeminiConfig::from_env();
        let client = MoatEvaluationClient::from_config(&config);
        let eval = client.evaluate("KO").await.unwrap();
        println!("KO moat: {:?}", eval);
        assert!(!eval.description.is_empty());
    }
}
