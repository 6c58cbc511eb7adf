//! Dashboard State Module
//!
//! Client-side state owned by the dashboard: the per-symbol moat evaluation session
//! and the observable watchlist.

pub mod session;
pub mod watchlist;

pub use session::{evaluate_symbol, EvaluationRun, EvaluationTicket, MoatSession, SessionState};
pub use watchlist::{WatchlistEvent, WatchlistItem, WatchlistStore};
