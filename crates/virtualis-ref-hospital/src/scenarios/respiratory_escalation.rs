//! Scenario 1: Respiratory Escalation
//!
//! A charge nurse reports a patient in respiratory distress. The scripted
//! analyzer answers, the lexicon mines both texts, and the message lands as
//! critical with Pulmonology recommended. Because the message is critical,
//! the on-call Emergency Medicine attending is offered alongside the
//! pulmonologist, fastest first.
//!
//! The on-call pulmonologist then signs out. Routing is recomputed against
//! the new roster without re-running triage.

use virtualis_audit::InMemoryTriageAudit;
use virtualis_contracts::{error::VirtualisResult, outcome::TriageOutcome};
use virtualis_core::OrchestratorConfig;

use crate::{
    analyzers::{ScriptedAnalyzer, SharedRoster},
    mock_data::{charge_nurse, patient, scripted_replies, ward_roster, RESPIRATORY_DISTRESS},
    scenarios::{print_audit, print_outcome, print_routing, ward_orchestrator},
};

/// The on-call pulmonologist who signs out mid-scenario.
const SIGNING_OUT: &str = "prov-pulm-01";

/// Run Scenario 1: Respiratory Escalation.
pub async fn run_scenario() -> VirtualisResult<()> {
    println!("=== Scenario 1: Respiratory Escalation ===");
    println!();

    let roster = SharedRoster::new(ward_roster());
    let audit = InMemoryTriageAudit::new("ward-7-respiratory");
    let orchestrator = ward_orchestrator(
        Box::new(ScriptedAnalyzer::new(scripted_replies())),
        roster.clone(),
        audit.clone(),
        OrchestratorConfig::default(),
    )?;

    println!("  Message: \"{}\"", RESPIRATORY_DISTRESS);
    println!();

    let outcome = orchestrator
        .submit_message(RESPIRATORY_DISTRESS, charge_nurse(), patient("12"))
        .await?;
    print_outcome(&outcome);
    println!();

    if let TriageOutcome::Triaged { message, .. } = &outcome {
        roster.set_on_call(SIGNING_OUT, false);
        println!("  Roster update: {} signs out", SIGNING_OUT);
        if let Some(routing) = orchestrator.route(&message.id) {
            print_routing(&routing);
        }
        println!();
    }

    print_audit(&audit);
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
