//! Seam traits for the triage orchestrator.
//!
//! - `ClinicalAnalyzer`: untrusted external capability (usually an LLM call)
//! - `KeywordTriage`: trusted, pure lexicon classifier and recommender
//! - `ProviderDirectory`: read-only roster snapshots
//! - `TriageAuditWriter`: append-only record of every attach attempt
//!
//! The orchestrator wires them together. Nothing the `ClinicalAnalyzer`
//! returns is used directly; its text is only mined by `KeywordTriage`.

use async_trait::async_trait;

use virtualis_contracts::{
    error::VirtualisResult,
    message::AnalysisContext,
    outcome::TriageRecord,
    provider::Provider,
    triage::{Acuity, AcuityAssessment, SpecialtyMatch},
};

/// The external clinical analysis capability.
///
/// Implementations are **untrusted**: the orchestrator treats the returned
/// string as opaque free text, and treats any error or timeout as the signal
/// to fall back to local analysis.
#[async_trait]
pub trait ClinicalAnalyzer: Send + Sync {
    /// Analyze `text` and return a free-text assessment.
    async fn analyze(&self, text: &str, context: &AnalysisContext) -> VirtualisResult<String>;
}

/// Deterministic keyword classification.
///
/// Implementations must be pure: identical arguments always produce
/// identical results. The orchestrator's idempotence depends on it.
pub trait KeywordTriage: Send + Sync {
    /// Classify acuity and priority from `text` and the optional external
    /// response.
    ///
    /// Returns `VirtualisError::InvalidInput` when `text` is blank.
    fn classify(&self, text: &str, external: Option<&str>) -> VirtualisResult<AcuityAssessment>;

    /// Recommend a specialty. `specialty` is `None` when nothing matched.
    fn recommend(&self, text: &str, external: Option<&str>) -> SpecialtyMatch;

    /// Next steps for a message of the given acuity routed to `specialty`.
    fn suggested_actions(&self, acuity: Acuity, specialty: &str) -> Vec<String>;
}

/// Source of roster snapshots, owned by an external directory service.
pub trait ProviderDirectory: Send + Sync {
    /// Return the current roster. Called once per routing decision.
    fn roster(&self) -> Vec<Provider>;
}

/// The triage audit sink.
///
/// Every attach attempt, applied or discarded, produces exactly one
/// `TriageRecord`.
pub trait TriageAuditWriter: Send + Sync {
    /// Append one record. Records are never modified or deleted.
    fn write(&self, record: &TriageRecord) -> VirtualisResult<()>;
}
