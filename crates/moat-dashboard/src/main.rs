//! moat-dashboard: health score and economic moat report for one or more tickers.
//!
//! Fetches the criteria from the stock data API, asks the generative model for a moat
//! evaluation, folds the result into the "Economic Moat" criterion and prints the
//! weighted health score.
//!
//! Usage:
//!   cargo run -p moat-dashboard -- --symbol AAPL
//!   cargo run -p moat-dashboard -- --symbol AAPL --skip-moat --json
//!   cargo run -p moat-dashboard -- --watch AAPL MSFT KO

use anyhow::{Context, Result};
use dashboard_state::{evaluate_symbol, EvaluationRun, MoatSession, SessionState, WatchlistEvent, WatchlistStore};
use gemini_client::{MoatEvaluationClient, MoatEvaluator};
use health_score::{apply_moat_override, HealthScoreBreakdown, HealthScoreCalculator};
use moat_core::{AggregatedMoatResult, MoatEvaluation};
use serde::Serialize;
use stock_client::StockDataClient;
use tokio::sync::Mutex;

mod cli;
mod config;

use cli::CliArgs;
use config::DashboardConfig;

#[derive(Debug, Serialize)]
struct SymbolReport {
    symbol: String,
    name: Option<String>,
    moat: Option<MoatSummary>,
    moat_error: Option<String>,
    health: HealthScoreBreakdown,
}

#[derive(Debug, Serialize)]
struct MoatSummary {
    #[serde(flatten)]
    result: AggregatedMoatResult,
    evaluation: MoatEvaluation,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;

    let config = DashboardConfig::from_env()?;
    if !cli.skip_moat {
        config.require_gemini_key()?;
    }
    tracing::debug!("Configuration: {:?}", config);

    let stock = StockDataClient::new(config.api_base.clone(), config.stock_timeout);
    let evaluator = MoatEvaluationClient::from_config(&config.gemini);
    let session = Mutex::new(MoatSession::new());

    let watchlist = WatchlistStore::new();
    let mut events = watchlist.subscribe();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                WatchlistEvent::Added(item) => tracing::info!("Watching {}", item.symbol),
                WatchlistEvent::Removed(symbol) => tracing::info!("Stopped watching {}", symbol),
            }
        }
    });

    for symbol in &cli.watch {
        watchlist.add(symbol);
    }

    let symbols = cli.symbols();
    tracing::info!("Reporting on {} symbol(s) via {}", symbols.len(), stock.base_url());

    let mut failures = 0usize;
    for symbol in &symbols {
        match report_symbol(&stock, &session, &evaluator, symbol, cli.skip_moat).await {
            Ok(report) => print_report(&report, cli.json)?,
            Err(e) => {
                failures += 1;
                tracing::error!("{}: {:#}", symbol, e);
            }
        }
    }

    // Dropping the store closes the channel and ends the logger
    drop(watchlist);
    event_log.await.ok();

    if failures == symbols.len() {
        anyhow::bail!("no report could be produced");
    }
    Ok(())
}

async fn report_symbol<E>(
    stock: &StockDataClient,
    session: &Mutex<MoatSession>,
    evaluator: &E,
    symbol: &str,
    skip_moat: bool,
) -> Result<SymbolReport>
where
    E: MoatEvaluator + ?Sized,
{
    let report = stock
        .get_stock(symbol)
        .await
        .with_context(|| format!("fetching stock data for {}", symbol))?;

    let mut moat_error = None;
    if skip_moat {
        session.lock().await.select(symbol);
    } else {
        match evaluate_symbol(session, evaluator, symbol).await {
            EvaluationRun::Failed(e) => {
                tracing::warn!("{}: moat evaluation failed: {}", symbol, e);
                moat_error = Some(e);
            }
            EvaluationRun::Discarded => tracing::warn!("{}: moat evaluation was superseded", symbol),
            EvaluationRun::Skipped | EvaluationRun::Resolved(_) => {}
        }
    }

    let session = session.lock().await;
    let criteria = apply_moat_override(&report.score.criteria, &session.moat_state());
    let health = HealthScoreCalculator::new().breakdown(&criteria);

    let moat = match session.state() {
        SessionState::Resolved { evaluation, result, .. } => Some(MoatSummary {
            result: *result,
            evaluation: evaluation.clone(),
        }),
        _ => None,
    };

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        name: report.name().map(str::to_string),
        moat,
        moat_error,
        health,
    })
}

fn print_report(report: &SymbolReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    match &report.name {
        Some(name) => println!("{} ({})", report.symbol, name),
        None => println!("{}", report.symbol),
    }
    println!(
        "Health score: {}/{} [{} scenario]",
        report.health.total,
        report.health.max,
        report.health.scenario.to_label()
    );
    for c in &report.health.criteria {
        println!(
            "  {:<34} {:<20} {:>3}  {}",
            c.criterion.name,
            c.criterion.status.to_label(),
            c.weight,
            c.criterion.value
        );
    }

    if let Some(moat) = &report.moat {
        println!("Economic moat: {} ({:.1}/5)", moat.result.moat_type, moat.result.total_score);
        for (factor, rating) in moat.evaluation.ratings() {
            println!("  {:<22} {}", factor.to_label(), rating);
        }
        if !moat.evaluation.description.is_empty() {
            println!("  {}", moat.evaluation.description);
        }
    }
    if let Some(err) = &report.moat_error {
        println!("Economic moat: unavailable ({})", err);
    }
    Ok(())
}
