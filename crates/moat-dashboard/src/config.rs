use anyhow::{bail, Context, Result};
use gemini_client::GeminiConfig;
use std::env;
use std::time::Duration;
use stock_client::DEFAULT_API_BASE;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub gemini: GeminiConfig,
    /// Stock data API base URL
    pub api_base: String,
    pub stock_timeout: Duration,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            gemini: GeminiConfig::from_env(),
            api_base: env::var("API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            stock_timeout: parse_timeout_secs(
                &env::var("STOCK_API_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string()),
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            bail!("API_BASE must be an http(s) URL, got {:?}", self.api_base);
        }
        if self.gemini.primary_model.trim().is_empty() || self.gemini.fallback_model.trim().is_empty() {
            bail!("GEMINI_PRIMARY_MODEL and GEMINI_FALLBACK_MODEL must not be empty");
        }
        Ok(())
    }

    /// Fail early when moat evaluation is requested without a credential
    pub fn require_gemini_key(&self) -> Result<()> {
        if self.gemini.api_key.is_none() {
            bail!("Configuration error: GEMINI_API_KEY not found in environment variables.");
        }
        Ok(())
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("STOCK_API_TIMEOUT_SECS must be an integer, got {:?}", raw))?;
    Ok(Duration::from_secs(secs))
}
