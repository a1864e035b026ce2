//! Scenario 3: Feed Review
//!
//! A shift's worth of messages from three senders is triaged and the feed is
//! rendered under each filter. Ordering is priority first, then acuity, then
//! newest. The glucose message has no scripted reply, so it lands as a
//! fallback result next to the externally analyzed ones.
//!
//! Finally a composer is torn down while its analysis is still in flight;
//! the late result is dropped and never reaches the feed.

use std::time::Duration;

use virtualis_audit::InMemoryTriageAudit;
use virtualis_contracts::{
    error::VirtualisResult,
    message::SenderInfo,
    outcome::TriageOutcome,
    routing::{FeedEntry, FeedFilter},
};
use virtualis_core::{OrchestratorConfig, TriageOrchestrator};

use crate::{
    analyzers::{ScriptedAnalyzer, SharedRoster, StalledAnalyzer},
    mock_data::{
        care_coordinator, charge_nurse, patient, scripted_replies, ward_pharmacist, ward_roster,
        CHEST_PAIN, DISCHARGE_PLANNING, GLUCOSE_REFILL, RESPIRATORY_DISTRESS,
    },
    scenarios::{print_audit, print_outcome, ward_orchestrator},
};

/// The shift's messages in submission order.
fn shift() -> Vec<(&'static str, SenderInfo, &'static str)> {
    vec![
        (DISCHARGE_PLANNING, care_coordinator(), "2"),
        (CHEST_PAIN, charge_nurse(), "9"),
        (GLUCOSE_REFILL, ward_pharmacist(), "15"),
        (RESPIRATORY_DISTRESS, charge_nurse(), "12"),
    ]
}

/// Submit every shift message to `orchestrator`.
pub async fn load_shift(orchestrator: &TriageOrchestrator) -> VirtualisResult<()> {
    for (text, sender, bed) in shift() {
        orchestrator.submit_message(text, sender, patient(bed)).await?;
    }
    Ok(())
}

fn print_feed(label: &str, entries: &[FeedEntry]) {
    println!("  Feed [{}]: {} message(s)", label, entries.len());
    for entry in entries {
        println!(
            "    {:>3}  {:<8} {:<8} {:<18} {}",
            entry.triage.priority,
            entry.triage.acuity.to_string(),
            entry.triage.source.to_string(),
            entry
                .triage
                .recommended_specialty
                .as_deref()
                .unwrap_or("-"),
            entry.message.content
        );
    }
    println!();
}

/// Run Scenario 3: Feed Review.
pub async fn run_scenario() -> VirtualisResult<()> {
    println!("=== Scenario 3: Feed Review ===");
    println!();

    let audit = InMemoryTriageAudit::new("ward-7-feed");
    let orchestrator = ward_orchestrator(
        Box::new(ScriptedAnalyzer::new(scripted_replies())),
        SharedRoster::new(ward_roster()),
        audit.clone(),
        OrchestratorConfig::default(),
    )?;

    load_shift(&orchestrator).await?;

    let nurse_id = charge_nurse().id;
    print_feed("all", &orchestrator.feed(&FeedFilter::All));
    print_feed("critical", &orchestrator.feed(&FeedFilter::CriticalOnly));
    print_feed("urgent", &orchestrator.feed(&FeedFilter::UrgentOnly));
    print_feed(&format!("mine: {}", nurse_id), &orchestrator.feed(&FeedFilter::Mine(nurse_id.clone())));

    // ── Composer teardown during analysis ─────────────────────────────────────

    println!("  Composer torn down while analysis is in flight");
    let slow = ward_orchestrator(
        Box::new(StalledAnalyzer::new(Duration::from_millis(300))),
        SharedRoster::new(ward_roster()),
        audit.clone(),
        OrchestratorConfig::default(),
    )?;
    let outcome = submit_then_discard(&slow, Duration::from_millis(50)).await?;
    print_outcome(&outcome);
    println!("  Feed after teardown:    {} message(s)", slow.feed(&FeedFilter::All).len());
    println!();

    print_audit(&audit);
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}

/// Submit a message and discard it after `after`, while analysis runs.
async fn submit_then_discard(
    orchestrator: &TriageOrchestrator,
    after: Duration,
) -> VirtualisResult<TriageOutcome> {
    let submit = orchestrator.submit_message(CHEST_PAIN, charge_nurse(), patient("9"));
    let teardown = async {
        tokio::time::sleep(after).await;
        for id in orchestrator.pending() {
            orchestrator.discard(&id);
        }
    };
    let (outcome, ()) = tokio::join!(submit, teardown);
    outcome
}

// ── Tests ─────────────────────────────────────────────────────────────────────
