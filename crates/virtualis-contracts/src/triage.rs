//! Acuity, triage result, and message lifecycle types.
//!
//! A `TriageResult` is attached 1:1 to a `Message`. It is always replaced as
//! a whole; no caller may observe a half-updated acuity/priority pair.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Clinical urgency tier of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acuity {
    Critical,
    Urgent,
    Routine,
}

impl Acuity {
    /// Sort rank used by the feed: critical = 3, urgent = 2, routine = 1.
    pub fn rank(self) -> u8 {
        match self {
            Acuity::Critical => 3,
            Acuity::Urgent => 2,
            Acuity::Routine => 1,
        }
    }
}

impl fmt::Display for Acuity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acuity::Critical => write!(f, "critical"),
            Acuity::Urgent => write!(f, "urgent"),
            Acuity::Routine => write!(f, "routine"),
        }
    }
}

/// Where the text mined for a triage result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriageSource {
    /// Local lexicon run over the raw text and the external analysis reply.
    External,
    /// Local lexicon run over the raw text alone, after the external call
    /// failed or timed out.
    Fallback,
}

impl fmt::Display for TriageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriageSource::External => write!(f, "external"),
            TriageSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Lifecycle of a message inside the orchestrator.
///
/// `Submitted → Analyzing → Triaged`, or
/// `Submitted → Analyzing → TriageFailed → Triaged` on the fallback path.
/// `Discarded` is terminal: the composer was torn down and any later
/// analysis result for the message is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriageState {
    Submitted,
    Analyzing,
    TriageFailed,
    Triaged,
    Discarded,
}

/// Output of the acuity classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcuityAssessment {
    pub acuity: Acuity,
    /// Always within 0..=100.
    pub priority: u8,
    /// Acuity-tier keywords that matched, across all tiers.
    pub matched_keywords: BTreeSet<String>,
}

/// Output of the specialty recommender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyMatch {
    /// Best specialty, or `None` when no bucket matched.
    pub specialty: Option<String>,
    /// Every specialty keyword that matched, in any bucket.
    pub matched_keywords: BTreeSet<String>,
    /// Specialties with at least one match, by match count descending.
    /// Equal counts keep lexicon registration order.
    pub ranking: Vec<(String, usize)>,
}

/// Derived triage analysis for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageResult {
    pub acuity: Acuity,
    /// Always within 0..=100.
    pub priority: u8,
    pub recommended_specialty: Option<String>,
    /// Matched lexicon terms (acuity and specialty buckets combined).
    pub keywords: BTreeSet<String>,
    /// Short imperative next steps, most important first.
    pub suggested_actions: Vec<String>,
    pub source: TriageSource,
}

impl TriageResult {
    pub fn is_fallback(&self) -> bool {
        self.source == TriageSource::Fallback
    }
}
