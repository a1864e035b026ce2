//! Scenario 2: Analyzer Outage
//!
//! The external analysis endpoint is down. Two failure modes are shown:
//!
//!   A. The endpoint rejects the call. A critical potassium result is still
//!      triaged from the lexicon alone, tagged as fallback, and floored at
//!      the configured critical priority. When the endpoint recovers, a
//!      re-triage replaces the fallback result in one step.
//!   B. The endpoint hangs. The orchestrator gives up after its timeout and
//!      the fallback result lands within the bound.
//!
//! The audit ledger keeps every attempt, including the external error.

use std::time::{Duration, Instant};

use virtualis_audit::InMemoryTriageAudit;
use virtualis_contracts::{error::VirtualisResult, outcome::TriageOutcome};
use virtualis_core::OrchestratorConfig;

use crate::{
    analyzers::{OutageAnalyzer, ScriptedAnalyzer, SharedRoster, StalledAnalyzer},
    mock_data::{
        charge_nurse, patient, scripted_replies, ward_pharmacist, ward_roster, CHEST_PAIN,
        CRITICAL_POTASSIUM,
    },
    scenarios::{print_audit, print_outcome, ward_orchestrator},
};

/// Timeout used for the stalled-endpoint sub-case.
const SHORT_TIMEOUT_MS: u64 = 100;

/// Run Scenario 2: Analyzer Outage.
pub async fn run_scenario() -> VirtualisResult<()> {
    println!("=== Scenario 2: Analyzer Outage ===");
    println!();

    // ── A: endpoint rejects, then recovers ────────────────────────────────────

    println!("  Sub-case A: analysis endpoint returns HTTP 503");
    println!("  Message: \"{}\"", CRITICAL_POTASSIUM);
    println!();

    let analyzer = OutageAnalyzer::down(ScriptedAnalyzer::new(scripted_replies()));
    let switch = analyzer.switch();
    let audit = InMemoryTriageAudit::new("ward-7-outage");
    let orchestrator = ward_orchestrator(
        Box::new(analyzer),
        SharedRoster::new(ward_roster()),
        audit.clone(),
        OrchestratorConfig::default(),
    )?;

    let outcome = orchestrator
        .submit_message(CRITICAL_POTASSIUM, ward_pharmacist(), patient("4"))
        .await?;
    print_outcome(&outcome);
    println!();

    if let TriageOutcome::Triaged { message, .. } = &outcome {
        switch.restore();
        println!("  Endpoint restored, re-triaging");
        let updated = orchestrator.retriage(&message.id).await?;
        print_outcome(&updated);
        println!();

        for record in audit.history(&message.id) {
            println!(
                "  Audit: generation {} source {} priority {} error {}",
                record.generation,
                record.source.map_or("-".to_string(), |s| s.to_string()),
                record.priority.map_or("-".to_string(), |p| p.to_string()),
                record.external_error.as_deref().unwrap_or("none")
            );
        }
    }
    print_audit(&audit);
    println!();

    // ── B: endpoint hangs ─────────────────────────────────────────────────────

    println!("  Sub-case B: analysis endpoint hangs ({} ms timeout)", SHORT_TIMEOUT_MS);
    println!("  Message: \"{}\"", CHEST_PAIN);
    println!();

    let config = OrchestratorConfig {
        analysis_timeout_ms: SHORT_TIMEOUT_MS,
        ..OrchestratorConfig::default()
    };
    let stalled = ward_orchestrator(
        Box::new(StalledAnalyzer::new(Duration::from_secs(30))),
        SharedRoster::new(ward_roster()),
        InMemoryTriageAudit::new("ward-7-stall"),
        config,
    )?;

    let started = Instant::now();
    let outcome = stalled
        .submit_message(CHEST_PAIN, charge_nurse(), patient("9"))
        .await?;
    println!("  Triage landed after:    {} ms", started.elapsed().as_millis());
    print_outcome(&outcome);
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
