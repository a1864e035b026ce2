//! Clinical message identity and content types.
//!
//! A `Message` is immutable once created. Triage output is stored beside it
//! as a separate `TriageResult` so the analysis can be replaced without
//! touching the raw message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VirtualisError, VirtualisResult};

/// Unique identifier for one submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
    /// Create a new, unique message ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a patient record owned by an external chart system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub String);

/// Reference to a provider in the external roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub String);

/// Clinical role of whoever wrote the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Physician,
    Nurse,
    Pharmacist,
    CareCoordinator,
    Administrator,
}

/// Who submitted a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    /// Stable sender identifier, used by the "mine" feed filter.
    pub id: String,
    /// Display name.
    pub name: String,
    pub role: SenderRole,
}

/// A clinical message as submitted from the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Free text. Never empty after trimming.
    pub content: String,
    pub sender: SenderInfo,
    /// Creation instant (UTC).
    pub timestamp: DateTime<Utc>,
    pub patient_id: Option<PatientId>,
    /// Providers the sender addressed directly, if any.
    #[serde(default)]
    pub recipient_ids: Vec<ProviderId>,
}

impl Message {
    /// Build a message stamped with a fresh ID and the current time.
    ///
    /// Returns `VirtualisError::InvalidInput` when `content` is empty or
    /// whitespace-only.
    pub fn new(
        content: impl Into<String>,
        sender: SenderInfo,
        patient_id: Option<PatientId>,
    ) -> VirtualisResult<Self> {
        let content = content.into();
        ensure_text(&content)?;
        Ok(Self {
            id: MessageId::new(),
            content,
            sender,
            timestamp: Utc::now(),
            patient_id,
            recipient_ids: Vec::new(),
        })
    }

    /// Address the message to specific providers.
    pub fn with_recipients(mut self, recipients: Vec<ProviderId>) -> Self {
        self.recipient_ids = recipients;
        self
    }
}

/// Reject empty or whitespace-only text.
pub fn ensure_text(text: &str) -> VirtualisResult<()> {
    if text.trim().is_empty() {
        return Err(VirtualisError::InvalidInput {
            reason: "message text must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Patient and sender context handed to the external analysis capability.
///
/// Built by the orchestrator from the message. The capability may use it to
/// enrich its prompt; the triage engine never depends on how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub message_id: MessageId,
    pub patient_id: Option<PatientId>,
    pub sender_role: SenderRole,
}

impl AnalysisContext {
    pub fn for_message(message: &Message) -> Self {
        Self {
            message_id: message.id,
            patient_id: message.patient_id.clone(),
            sender_role: message.sender.role,
        }
    }
}
