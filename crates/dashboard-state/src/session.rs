//! Per-symbol moat evaluation state machine.
//!
//! At most one evaluation is in flight for the selected symbol. Every accepted request
//! gets a generation number; a response is only committed if its generation is still
//! the current one, so answers for a symbol the user has navigated away from are
//! dropped instead of overwriting newer state.

use gemini_client::{EvaluationError, MoatEvaluator};
use moat_core::{aggregate, AggregatedMoatResult, MoatEvaluation, MoatState};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Evaluating {
        symbol: String,
        generation: u64,
    },
    Resolved {
        symbol: String,
        evaluation: MoatEvaluation,
        result: AggregatedMoatResult,
    },
    Failed {
        symbol: String,
        error: String,
    },
}

/// Proof that an evaluation was started; required to commit its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTicket {
    pub symbol: String,
    pub generation: u64,
}

/// Result of driving one evaluation through the session
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationRun {
    /// Already evaluating or evaluated for this symbol
    Skipped,
    Resolved(AggregatedMoatResult),
    Failed(String),
    /// The selection changed while the request was in flight
    Discarded,
}

#[derive(Debug)]
pub struct MoatSession {
    selected: Option<String>,
    state: SessionState,
    generation: u64,
}

impl Default for MoatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MoatSession {
    pub fn new() -> Self {
        Self {
            selected: None,
            state: SessionState::Idle,
            generation: 0,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Switch the selected symbol. Changing symbol resets to Idle, which invalidates
    /// any ticket still in flight.
    pub fn select(&mut self, symbol: &str) {
        let symbol = normalize(symbol);
        if self.selected.as_deref() == Some(symbol.as_str()) {
            return;
        }
        tracing::debug!("Selected symbol {}", symbol);
        self.selected = Some(symbol);
        self.state = SessionState::Idle;
    }

    /// Start evaluating `symbol`, selecting it if needed.
    ///
    /// Returns `None` when an evaluation for the symbol is already in flight or has
    /// already resolved.
    pub fn begin(&mut self, symbol: &str) -> Option<EvaluationTicket> {
        self.select(symbol);
        let symbol = normalize(symbol);

        match &self.state {
            SessionState::Evaluating { symbol: s, .. } | SessionState::Resolved { symbol: s, .. }
                if *s == symbol =>
            {
                return None;
            }
            _ => {}
        }

        self.generation += 1;
        self.state = SessionState::Evaluating {
            symbol: symbol.clone(),
            generation: self.generation,
        };

        Some(EvaluationTicket {
            symbol,
            generation: self.generation,
        })
    }

    /// Commit the outcome of `ticket`. Returns false if the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &EvaluationTicket,
        outcome: Result<MoatEvaluation, EvaluationError>,
    ) -> bool {
        let current = matches!(
            &self.state,
            SessionState::Evaluating { symbol, generation }
                if *generation == ticket.generation && *symbol == ticket.symbol
        );
        if !current {
            tracing::warn!(
                "Discarding stale moat evaluation for {} (generation {})",
                ticket.symbol,
                ticket.generation
            );
            return false;
        }

        self.state = match outcome {
            Ok(evaluation) => {
                let result = aggregate(&evaluation);
                tracing::info!(
                    "{}: {} ({:.1}/5)",
                    ticket.symbol,
                    result.moat_type,
                    result.total_score
                );
                SessionState::Resolved {
                    symbol: ticket.symbol.clone(),
                    evaluation,
                    result,
                }
            }
            Err(e) => SessionState::Failed {
                symbol: ticket.symbol.clone(),
                error: e.to_string(),
            },
        };
        true
    }

    /// Moat state of the selected symbol, as the criteria override engine sees it
    pub fn moat_state(&self) -> MoatState {
        match &self.state {
            SessionState::Evaluating { .. } => MoatState::Evaluating,
            SessionState::Resolved { result, .. } => MoatState::Resolved(result.moat_type),
            SessionState::Idle | SessionState::Failed { .. } => MoatState::NotEvaluated,
        }
    }
}

/// Run one guarded evaluation of `symbol`.
///
/// The session lock is released while the evaluator is awaited.
pub async fn evaluate_symbol<E>(session: &Mutex<MoatSession>, evaluator: &E, symbol: &str) -> EvaluationRun
where
    E: MoatEvaluator + ?Sized,
{
    let ticket = match session.lock().await.begin(symbol) {
        Some(ticket) => ticket,
        None => return EvaluationRun::Skipped,
    };

    let outcome = evaluator.evaluate(&ticket.symbol).await;

    let mut session = session.lock().await;
    if !session.complete(&ticket, outcome) {
        return EvaluationRun::Discarded;
    }

    match session.state() {
        SessionState::Resolved { result, .. } => EvaluationRun::Resolved(*result),
        SessionState::Failed { error, .. } => EvaluationRun::Failed(error.clone()),
        _ => EvaluationRun::Discarded,
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
