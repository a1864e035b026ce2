//! # virtualis-core
//!
//! The triage runtime for Virtualis clinical messages.
//!
//! This crate provides:
//! - The four seam traits (`ClinicalAnalyzer`, `KeywordTriage`,
//!   `ProviderDirectory`, `TriageAuditWriter`)
//! - The `MessageFeed` store with generation-checked result attachment
//! - The `TriageOrchestrator` that wires them together, with a bounded
//!   external call and a deterministic lexicon fallback
//!
//! ## Usage
//!
//! ```rust,ignore
//! use virtualis_core::{OrchestratorConfig, TriageOrchestrator};
//!
//! let orchestrator = TriageOrchestrator::new(
//!     Box::new(lexicon),
//!     Box::new(analyzer),
//!     Box::new(directory),
//!     Box::new(audit),
//!     OrchestratorConfig::default(),
//! );
//! let outcome = orchestrator.submit_message("SpO2 dropping", sender, None).await?;
//! ```

pub mod config;
pub mod feed;
pub mod orchestrator;
pub mod traits;

pub use config::OrchestratorConfig;
pub use feed::MessageFeed;
pub use orchestrator::TriageOrchestrator;
