//! Error types for the Virtualis triage engine.
//!
//! All fallible operations return `VirtualisResult<T>`. Only `InvalidInput`
//! ever crosses the orchestrator's public boundary at submit time; external
//! analysis failures are absorbed by the deterministic fallback.

use thiserror::Error;

/// The unified error type for the Virtualis crates.
#[derive(Debug, Error)]
pub enum VirtualisError {
    /// Message text was empty or whitespace-only.
    ///
    /// The caller must reject the input before triage; it is never defaulted.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The injected clinical analysis capability returned an error.
    #[error("external analysis failed: {reason}")]
    ExternalAnalysis { reason: String },

    /// The external analysis did not answer within the configured bound.
    #[error("external analysis timed out after {timeout_ms} ms")]
    AnalysisTimeout { timeout_ms: u64 },

    /// The audit writer could not record a triage decision.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// A lexicon or orchestrator configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl VirtualisError {
    /// True for the failures the orchestrator recovers from via fallback.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            VirtualisError::ExternalAnalysis { .. } | VirtualisError::AnalysisTimeout { .. }
        )
    }
}

/// Convenience alias used throughout the Virtualis crates.
pub type VirtualisResult<T> = Result<T, VirtualisError>;
