//! Virtualis Ward Triage Reference Runtime: Demo CLI
//!
//! Runs one or all of the three ward scenarios, or classifies a single
//! message through the same synthesis step the orchestrator uses.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- respiratory-escalation
//!   cargo run -p demo -- analyzer-outage
//!   cargo run -p demo -- feed-review
//!   cargo run -p demo -- classify "SpO2 dropping" --external "possible pneumonia"

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use virtualis_audit::InMemoryTriageAudit;
use virtualis_contracts::error::VirtualisResult;
use virtualis_core::{OrchestratorConfig, TriageOrchestrator};
use virtualis_lexicon::LexiconEngine;
use virtualis_ref_hospital::{
    analyzers::{FailingAnalyzer, SharedRoster},
    scenarios::{analyzer_outage, feed_review, respiratory_escalation},
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Virtualis: clinical message triage and routing demo.
#[derive(Parser)]
#[command(
    name = "triage-demo",
    about = "Virtualis ward triage reference runtime demo",
    long_about = "Runs Virtualis ward scenarios showing keyword triage, external analysis\n\
                  with deterministic fallback, on-call routing, feed ordering, and audit\n\
                  chain integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three ward scenarios in sequence.
    RunAll,
    /// Scenario 1: Respiratory Escalation (critical routing, roster change).
    RespiratoryEscalation,
    /// Scenario 2: Analyzer Outage (fallback, timeout, re-triage).
    AnalyzerOutage,
    /// Scenario 3: Feed Review (ordering, filters, composer teardown).
    FeedReview,
    /// Classify one message and print the triage result as JSON.
    Classify {
        /// Message text.
        text: String,
        /// External analysis reply to mine alongside the text.
        #[arg(long)]
        external: Option<String>,
        /// Lexicon TOML file. Defaults to the bundled lexicon.
        #[arg(long)]
        lexicon: Option<PathBuf>,
        /// Orchestrator TOML file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all().await
        }
        Command::RespiratoryEscalation => {
            print_banner();
            respiratory_escalation::run_scenario().await
        }
        Command::AnalyzerOutage => {
            print_banner();
            analyzer_outage::run_scenario().await
        }
        Command::FeedReview => {
            print_banner();
            feed_review::run_scenario().await
        }
        Command::Classify {
            text,
            external,
            lexicon,
            config,
        } => classify(&text, external.as_deref(), lexicon, config),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

async fn run_all() -> VirtualisResult<()> {
    respiratory_escalation::run_scenario().await?;
    analyzer_outage::run_scenario().await?;
    feed_review::run_scenario().await?;
    println!("All selected scenarios completed successfully.");
    Ok(())
}

/// Synthesize one result without submitting anything to a feed.
fn classify(
    text: &str,
    external: Option<&str>,
    lexicon: Option<PathBuf>,
    config: Option<PathBuf>,
) -> VirtualisResult<()> {
    let engine = match lexicon {
        Some(path) => LexiconEngine::from_file(&path)?,
        None => LexiconEngine::standard()?,
    };
    let config = match config {
        Some(path) => OrchestratorConfig::from_file(&path)?,
        None => OrchestratorConfig::default(),
    };

    let orchestrator = TriageOrchestrator::new(
        Box::new(engine),
        Box::new(FailingAnalyzer::new("classify runs offline")),
        Box::new(SharedRoster::new(Vec::new())),
        Box::new(InMemoryTriageAudit::new("classify")),
        config,
    );

    let result = orchestrator.synthesize(text, external)?;
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to render triage result: {}", e),
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Virtualis: Clinical Message Triage");
    println!("Ward Reference Demo");
    println!("===================================");
    println!();
    println!("Triage pipeline per message:");
    println!("  [1] Message validated and appended to the feed log");
    println!("  [2] External analyzer called under a timeout");
    println!("  [3] Lexicon mines text + reply → acuity, priority, specialty");
    println!("  [4] On failure or timeout: lexicon on raw text, tagged fallback");
    println!("  [5] Result attached atomically; on-call providers matched");
    println!("  [6] Every attach attempt written to the SHA-256 audit chain");
    println!();
}
