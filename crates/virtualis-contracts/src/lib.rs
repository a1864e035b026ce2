//! # virtualis-contracts
//!
//! Shared types for the Virtualis clinical-message triage engine.
//!
//! All crates in the workspace import from here. No triage logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod message;
pub mod outcome;
pub mod provider;
pub mod routing;
pub mod triage;
