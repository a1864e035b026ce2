//! Routing recommendation and feed types.

use serde::{Deserialize, Serialize};

use crate::{
    message::Message,
    provider::Provider,
    triage::{Acuity, TriageResult},
};

/// Who should receive a message, computed per call and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRecommendation {
    pub recommended_specialty: String,
    pub urgency_level: Acuity,
    /// 0..=100.
    pub confidence: u8,
    pub reasoning: String,
    /// Eligible providers, fastest response first.
    pub suggested_providers: Vec<Provider>,
    /// Other matching specialties. Never contains `recommended_specialty`.
    pub alternative_specialties: Vec<String>,
}

/// A message paired with its current triage result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub message: Message,
    pub triage: TriageResult,
}

/// Feed filter chosen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedFilter {
    All,
    CriticalOnly,
    UrgentOnly,
    /// Messages sent by the given sender id.
    Mine(String),
}

impl FeedFilter {
    /// Return true if `entry` passes this filter.
    pub fn admits(&self, entry: &FeedEntry) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::CriticalOnly => entry.triage.acuity == Acuity::Critical,
            FeedFilter::UrgentOnly => entry.triage.acuity == Acuity::Urgent,
            FeedFilter::Mine(sender_id) => entry.message.sender.id == *sender_id,
        }
    }
}
