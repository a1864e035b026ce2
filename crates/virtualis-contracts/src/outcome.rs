//! Triage outcomes and audit records.
//!
//! `TriageOutcome` is what the orchestrator returns to the caller after a
//! submission or re-triage. `TriageRecord` is what gets written to the audit
//! log, one per attach attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    message::{Message, MessageId},
    routing::RoutingRecommendation,
    triage::{Acuity, TriageResult, TriageSource},
};

/// The outcome of triaging one message.
///
/// Callers pattern-match on this:
/// - `Triaged` → render the message with its result and routing
/// - `Discarded` → the message was torn down while analysis was in flight;
///   nothing was attached and nothing will be retried
#[derive(Debug, Clone)]
pub enum TriageOutcome {
    Triaged {
        message: Message,
        result: TriageResult,
        routing: RoutingRecommendation,
    },
    Discarded {
        message_id: MessageId,
    },
}

impl TriageOutcome {
    /// The attached result, if any.
    pub fn result(&self) -> Option<&TriageResult> {
        match self {
            TriageOutcome::Triaged { result, .. } => Some(result),
            TriageOutcome::Discarded { .. } => None,
        }
    }
}

/// Whether an analysis result was applied to its target message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttachOutcome {
    /// The result replaced the message's previous triage atomically.
    Attached,
    /// The target was discarded or a newer analysis superseded this one.
    StaleDiscarded,
    /// Local analysis failed, so there was no result to attach.
    AnalysisFailed,
}

/// An immutable record of one attach attempt, written to the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRecord {
    pub message_id: MessageId,
    /// Analysis generation the result was computed for.
    pub generation: u64,
    /// `None` together with `acuity` and `priority` when the outcome is
    /// `AnalysisFailed`.
    pub source: Option<TriageSource>,
    pub acuity: Option<Acuity>,
    pub priority: Option<u8>,
    pub recommended_specialty: Option<String>,
    pub outcome: AttachOutcome,
    /// Why the external analysis was not used, on the fallback path.
    pub external_error: Option<String>,
    /// Why local analysis failed, for `AnalysisFailed` records.
    pub analysis_error: Option<String>,
    /// Wall-clock time the record was created (UTC).
    pub timestamp: DateTime<Utc>,
}
