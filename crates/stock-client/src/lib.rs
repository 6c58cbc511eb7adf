use moat_core::Criterion;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

#[derive(Error, Debug)]
pub enum StockApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Health criteria and the maximum score the backend computed for them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreSection {
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// Response of `GET /stock/{ticker}`.
///
/// Only the score section is typed; the display sections are passed through as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    #[serde(default)]
    pub overview: serde_json::Value,
    #[serde(default)]
    pub growth: serde_json::Value,
    #[serde(default)]
    pub profitability: serde_json::Value,
    #[serde(default)]
    pub debt: serde_json::Value,
    #[serde(default)]
    pub valuation: serde_json::Value,
    #[serde(default)]
    pub support_resistance: serde_json::Value,
    #[serde(default)]
    pub financials: serde_json::Value,
    #[serde(default)]
    pub score: ScoreSection,
    #[serde(default)]
    pub calendar: serde_json::Value,
    #[serde(default)]
    pub history: serde_json::Value,
}

impl StockReport {
    /// Company name from the overview section, if present
    pub fn name(&self) -> Option<&str> {
        self.overview.get("name").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Client for the dashboard's stock data API
#[derive(Clone)]
pub struct StockDataClient {
    client: Client,
    base_url: String,
}

impl StockDataClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build stock API client ({}), using defaults without timeout", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full stock report including health criteria
    pub async fn get_stock(&self, ticker: &str) -> Result<StockReport, StockApiError> {
        self.get_json(&format!("stock/{}", normalize_ticker(ticker))).await
    }

    /// Chart series for a timeframe (e.g. "1D", "1Y")
    pub async fn get_chart(
        &self,
        ticker: &str,
        timeframe: &str,
    ) -> Result<Vec<serde_json::Value>, StockApiError> {
        let chart: ChartResponse = self
            .get_json(&format!("chart/{}/{}", normalize_ticker(ticker), timeframe))
            .await?;
        Ok(chart.data)
    }

    /// Daily close history
    pub async fn get_history(&self, ticker: &str) -> Result<Vec<HistoryPoint>, StockApiError> {
        self.get_json(&format!("stock/history/{}", normalize_ticker(ticker)))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StockApiError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, path, &body));
        }

        Ok(response.json().await?)
    }
}

/// Unknown tickers come back as 404; every other non-2xx is a service failure.
fn status_error(status: StatusCode, path: &str, body: &str) -> StockApiError {
    if status == StatusCode::NOT_FOUND {
        StockApiError::NotFound(path.to_string())
    } else {
        StockApiError::ServiceUnavailable(format!(
            "HTTP {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        ))
    }
}

fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moat_core::CriterionStatus;

    #[test]
    fn test_report_deserializes_score_section() {
        let json = r#"{
            "overview": {"name": "Apple Inc.", "price": 231.4},
            "score": {
                "total": 72,
                "max": 100,
                "criteria": [
                    {"name": "ROIC > 12-15%", "status": "Pass", "value": "41.20%"},
                    {"name": "Economic Moat", "status": "Pending Evaluation", "value": "Pending"},
                    {"name": "Current Ratio > 1.5", "status": "Fail", "value": "0.87"}
                ]
            },
            "history": []
        }"#;
        let report: StockReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.name(), Some("Apple Inc."));
        assert_eq!(report.score.criteria.len(), 3);
        assert_eq!(report.score.criteria[1].status, CriterionStatus::PendingEvaluation);
        assert_eq!(report.score.max, Some(100.0));
        assert!(report.growth.is_null());
    }

    #[test]
    fn test_missing_score_section_is_empty() {
        let report: StockReport = serde_json::from_str(r#"{"overview": {}}"#).unwrap();
        assert!(report.score.criteria.is_empty());
        assert!(report.name().is_none());
    }

    #[test]
    fn test_history_points() {
        let points: Vec<HistoryPoint> =
            serde_json::from_str(r#"[{"date":"2026-10-16","close":231.4},{"date":"2026-10-17","close":229.9}]"#)
                .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].date, "2026-10-17");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = StockDataClient::new("http://localhost:8000/api/", Duration::from_secs(5));
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(normalize_ticker(" brk.b "), "BRK.B");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(StatusCode::NOT_FOUND, "stock/ZZZZ", "");
        assert!(matches!(err, StockApiError::NotFound(ref p) if p == "stock/ZZZZ"));

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "stock/AAPL", "boom");
        match err {
            StockApiError::ServiceUnavailable(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, "chart/AAPL/1Y", "");
        assert!(matches!(err, StockApiError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    #[ignore] // Only run against a local stock data API
    async fn test_live_stock_report() {
        let base_url = std::env::var("API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let client = StockDataClient::new(base_url, Duration::from_secs(60));
        let report = client.get_stock("AAPL").await.unwrap();
        println!("Criteria: {}", report.score.criteria.len());
        assert!(!report.score.criteria.is_empty());
    }
}
