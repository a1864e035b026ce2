//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. ledger_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the triage record

use sha2::{Digest, Sha256};

use virtualis_contracts::{
    error::{VirtualisError, VirtualisResult},
    outcome::TriageRecord,
};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single audit event.
///
/// The hash commits to the event's ledger, its position in the chain, its
/// link to the previous event and the full triage record. Returns a
/// lowercase 64-character hex string.
///
/// # Errors
///
/// Returns `VirtualisError::AuditWriteFailed` if the record cannot be
/// serialized.
pub fn hash_event(
    ledger_id: &str,
    sequence: u64,
    record: &TriageRecord,
    prev_hash: &str,
) -> VirtualisResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| VirtualisError::AuditWriteFailed {
        reason: format!("failed to serialize triage record: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(ledger_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every event links to its predecessor (`GENESIS_HASH` for the
/// first), carries the next sequence number, and its `this_hash` matches
/// the hash recomputed from its own fields. An empty chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.prev_hash != expected_prev || event.sequence != position as u64 {
            return false;
        }

        match hash_event(&event.ledger_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
