//! # virtualis-lexicon
//!
//! A TOML-driven keyword lexicon for the Virtualis triage engine.
//!
//! ## Overview
//!
//! This crate provides [`LexiconEngine`], which implements the
//! [`KeywordTriage`](virtualis_core::traits::KeywordTriage) trait. The
//! lexicon is plain data: acuity keyword tiers, ordered specialty buckets,
//! scoring constants and action templates. The classifier and recommender
//! are pure functions over it.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use virtualis_lexicon::LexiconEngine;
//!
//! let engine = LexiconEngine::standard()?;
//! // Pass `engine` to `virtualis_core::TriageOrchestrator::new(...)`.
//! ```
//!
//! ## Matching
//!
//! Keywords match as case-insensitive substrings of the message text and of
//! the external reply. Each keyword counts once however often it appears.

pub mod engine;
pub mod table;

pub use engine::LexiconEngine;
pub use table::{ActionTemplates, AcuityTiers, LexiconConfig, ScoringConfig, SpecialtyEntry};

// ── Tests ─────────────────────────────────────────────────────────────────────
