pub mod config;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parse;
pub mod prompt;

pub use config::GeminiConfig;
pub use error::{EvaluationError, ModelError, ModelResult, ParseError};
pub use evaluator::{MoatEvaluationClient, MoatEvaluator};
pub use model::{GeminiModel, GenerativeModel};
pub use parse::{parse_moat_evaluation, ParseStrategy};
pub use prompt::build_prompt;
