use thiserror::Error;

/// Model output that no extraction strategy could turn into a moat evaluation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unparseable model output: {0}")]
pub struct ParseError(pub String);

/// Failure of a single model attempt. Triggers fallback, never shown to the user directly.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Terminal failure of a moat evaluation
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("All models failed. Last error ({model}): {source}")]
    Exhausted {
        model: String,
        #[source]
        source: ModelError,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;
