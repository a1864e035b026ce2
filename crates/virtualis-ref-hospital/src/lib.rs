//! # virtualis-ref-hospital
//!
//! Hospital reference runtime for the Virtualis triage engine.
//!
//! Demonstrates three ward scenarios using mock data:
//!
//! 1. **Respiratory Escalation**: a deteriorating patient is triaged as
//!    critical, routed to Pulmonology and Emergency Medicine, then re-routed
//!    after the roster changes.
//! 2. **Analyzer Outage**: the external analyzer fails and then stalls; every
//!    message is still triaged from the lexicon, and a re-triage after
//!    recovery replaces the fallback result.
//! 3. **Feed Review**: a busy shift's messages are sorted and filtered, and a
//!    torn-down composer's late result is dropped.
//!
//! All data is hardcoded and fictional. No external API calls are made.

pub mod analyzers;
pub mod mock_data;
pub mod scenarios;
