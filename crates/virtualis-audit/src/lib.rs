//! # virtualis-audit
//!
//! Append-only, SHA-256 hash-chained audit trail for triage decisions.
//!
//! Every attach attempt the orchestrator makes, applied or dropped as stale,
//! becomes an `AuditEvent` linked to the previous one by hash. Editing any
//! stored event breaks the chain, which `verify_chain` detects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use virtualis_audit::InMemoryTriageAudit;
//!
//! let audit = InMemoryTriageAudit::new("ward-7");
//! let orchestrator = TriageOrchestrator::new(engine, analyzer, directory,
//!     Box::new(audit.clone()), config);
//! // ...
//! assert!(audit.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryTriageAudit;

// ── Tests ─────────────────────────────────────────────────────────────────────
