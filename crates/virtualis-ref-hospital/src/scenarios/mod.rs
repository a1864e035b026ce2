//! Ward demo scenarios.
//!
//! Each scenario wires the real Virtualis components (lexicon engine,
//! orchestrator, audit ledger) to mock ward data and demonstrates one
//! behavior of the triage pipeline.

pub mod analyzer_outage;
pub mod feed_review;
pub mod respiratory_escalation;

use virtualis_audit::InMemoryTriageAudit;
use virtualis_contracts::{
    error::VirtualisResult,
    outcome::TriageOutcome,
    routing::RoutingRecommendation,
};
use virtualis_core::{traits::ClinicalAnalyzer, OrchestratorConfig, TriageOrchestrator};
use virtualis_lexicon::LexiconEngine;

use crate::analyzers::SharedRoster;

/// Build an orchestrator over the standard lexicon.
pub fn ward_orchestrator(
    analyzer: Box<dyn ClinicalAnalyzer>,
    roster: SharedRoster,
    audit: InMemoryTriageAudit,
    config: OrchestratorConfig,
) -> VirtualisResult<TriageOrchestrator> {
    let engine = LexiconEngine::standard()?;
    Ok(TriageOrchestrator::new(
        Box::new(engine),
        analyzer,
        Box::new(roster),
        Box::new(audit),
        config,
    ))
}

pub(crate) fn print_outcome(outcome: &TriageOutcome) {
    match outcome {
        TriageOutcome::Triaged { result, routing, .. } => {
            println!("  Acuity:                 {}", result.acuity);
            println!("  Priority:               {}", result.priority);
            println!("  Source:                 {}", result.source);
            println!(
                "  Keywords:               {}",
                result.keywords.iter().cloned().collect::<Vec<_>>().join(", ")
            );
            for action in &result.suggested_actions {
                println!("  Suggested action:       {}", action);
            }
            print_routing(routing);
        }
        TriageOutcome::Discarded { message_id } => {
            println!("  DISCARDED: message {} was torn down before triage landed", message_id);
        }
    }
}

pub(crate) fn print_routing(routing: &RoutingRecommendation) {
    println!("  Routed to:              {}", routing.recommended_specialty);
    println!("  Confidence:             {}", routing.confidence);
    println!("  Reasoning:              {}", routing.reasoning);
    if routing.suggested_providers.is_empty() {
        println!("  Providers:              (none reachable)");
    }
    for provider in &routing.suggested_providers {
        println!(
            "  Provider:               {} ({}, {} min)",
            provider.name, provider.specialty, provider.response_time_minutes
        );
    }
    if !routing.alternative_specialties.is_empty() {
        println!(
            "  Alternatives:           {}",
            routing.alternative_specialties.join(", ")
        );
    }
}

pub(crate) fn print_audit(audit: &InMemoryTriageAudit) {
    println!(
        "  Audit chain integrity:  {} ({} record(s) in chain)",
        if audit.verify_integrity() { "VERIFIED" } else { "FAILED" },
        audit.len()
    );
}
