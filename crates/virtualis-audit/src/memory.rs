//! In-memory implementation of `TriageAuditWriter`.
//!
//! `InMemoryTriageAudit` keeps every event in a `Vec` behind a `Mutex`.
//! Cloning the writer shares the ledger, so a caller can hand one clone to
//! the orchestrator and keep another for `export_log()` and
//! `verify_integrity()`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use virtualis_contracts::{
    error::VirtualisResult,
    message::MessageId,
    outcome::TriageRecord,
};
use virtualis_core::traits::TriageAuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct LedgerState {
    pub(crate) events: Vec<AuditEvent>,
    pub(crate) sequence: u64,
    /// `this_hash` of the last event, or `GENESIS_HASH`.
    pub(crate) last_hash: String,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An append-only triage audit ledger backed by a SHA-256 hash chain.
#[derive(Clone)]
pub struct InMemoryTriageAudit {
    ledger_id: String,
    pub(crate) state: Arc<Mutex<LedgerState>>,
}

impl InMemoryTriageAudit {
    pub fn new(ledger_id: impl Into<String>) -> Self {
        let state = LedgerState {
            events: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        };
        Self {
            ledger_id: ledger_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot every event written so far.
    pub fn export_log(&self) -> AuditLog {
        let state = self.lock();
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AuditLog {
            ledger_id: self.ledger_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.lock().events)
    }

    /// Every record written for `message_id`, oldest first.
    pub fn history(&self, message_id: &MessageId) -> Vec<TriageRecord> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.record.message_id == *message_id)
            .map(|e| e.record.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ── TriageAuditWriter impl ────────────────────────────────────────────────────

impl TriageAuditWriter for InMemoryTriageAudit {
    /// Append one triage record to the chain.
    fn write(&self, record: &TriageRecord) -> VirtualisResult<()> {
        let mut state = self.lock();

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.ledger_id, sequence, record, &prev_hash)?;

        state.events.push(AuditEvent {
            sequence,
            ledger_id: self.ledger_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(
            ledger_id = %self.ledger_id,
            sequence,
            message_id = %record.message_id,
            outcome = ?record.outcome,
            "triage record appended"
        );
        Ok(())
    }
}
