//! Stand-in external analyzers and roster directory for the reference runtime.
//!
//! None of these call out to a real model. They reproduce the behaviors the
//! orchestrator must survive: canned replies, hard failures, stalls, and an
//! outage that can be switched off mid-run.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use virtualis_contracts::{
    error::{VirtualisError, VirtualisResult},
    message::AnalysisContext,
    provider::Provider,
};
use virtualis_core::traits::{ClinicalAnalyzer, ProviderDirectory};

// ── ScriptedAnalyzer ──────────────────────────────────────────────────────────

/// Replies with the first canned answer whose trigger appears in the text.
///
/// Text that matches no trigger is rejected, as a model endpoint would
/// reject a prompt it cannot handle.
pub struct ScriptedAnalyzer {
    replies: Vec<(String, String)>,
}

impl ScriptedAnalyzer {
    pub fn new<T, R>(replies: impl IntoIterator<Item = (T, R)>) -> Self
    where
        T: Into<String>,
        R: Into<String>,
    {
        Self {
            replies: replies
                .into_iter()
                .map(|(trigger, reply)| (trigger.into().to_lowercase(), reply.into()))
                .collect(),
        }
    }

    fn reply_for(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.replies
            .iter()
            .find(|(trigger, _)| text.contains(trigger.as_str()))
            .map(|(_, reply)| reply.as_str())
    }
}

#[async_trait]
impl ClinicalAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, text: &str, context: &AnalysisContext) -> VirtualisResult<String> {
        debug!(message_id = %context.message_id, "scripted analyzer called");
        self.reply_for(text)
            .map(str::to_string)
            .ok_or_else(|| VirtualisError::ExternalAnalysis {
                reason: "no scripted reply for this message".to_string(),
            })
    }
}

// ── FailingAnalyzer ───────────────────────────────────────────────────────────

/// Rejects every call with the given reason.
pub struct FailingAnalyzer {
    reason: String,
}

impl FailingAnalyzer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ClinicalAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _text: &str, _context: &AnalysisContext) -> VirtualisResult<String> {
        Err(VirtualisError::ExternalAnalysis {
            reason: self.reason.clone(),
        })
    }
}

// ── StalledAnalyzer ───────────────────────────────────────────────────────────

/// Sleeps for `delay` before answering. Pair with a shorter analysis timeout
/// to exercise the timeout path.
pub struct StalledAnalyzer {
    delay: Duration,
}

impl StalledAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ClinicalAnalyzer for StalledAnalyzer {
    async fn analyze(&self, _text: &str, _context: &AnalysisContext) -> VirtualisResult<String> {
        tokio::time::sleep(self.delay).await;
        Ok("late reply".to_string())
    }
}

// ── OutageAnalyzer ────────────────────────────────────────────────────────────

/// Wraps a scripted analyzer behind an outage switch.
///
/// While the switch is down every call fails; `restore()` brings the
/// wrapped analyzer back. Clone the switch with `switch()` before handing
/// the analyzer to the orchestrator.
pub struct OutageAnalyzer {
    inner: ScriptedAnalyzer,
    healthy: Arc<AtomicBool>,
}

/// Shared handle that flips an `OutageAnalyzer` between down and healthy.
#[derive(Clone)]
pub struct OutageSwitch(Arc<AtomicBool>);

impl OutageSwitch {
    pub fn restore(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn fail(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl OutageAnalyzer {
    /// Start in the failed state.
    pub fn down(inner: ScriptedAnalyzer) -> Self {
        Self {
            inner,
            healthy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn switch(&self) -> OutageSwitch {
        OutageSwitch(Arc::clone(&self.healthy))
    }
}

#[async_trait]
impl ClinicalAnalyzer for OutageAnalyzer {
    async fn analyze(&self, text: &str, context: &AnalysisContext) -> VirtualisResult<String> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(VirtualisError::ExternalAnalysis {
                reason: "analysis endpoint returned HTTP 503".to_string(),
            });
        }
        self.inner.analyze(text, context).await
    }
}

// ── SharedRoster ──────────────────────────────────────────────────────────────

/// A `ProviderDirectory` whose roster can be edited between routing calls.
///
/// Clones share one roster, standing in for the external directory service
/// pushing updates.
#[derive(Clone)]
pub struct SharedRoster {
    providers: Arc<Mutex<Vec<Provider>>>,
}

impl SharedRoster {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers: Arc::new(Mutex::new(providers)),
        }
    }

    /// Set the on-call flag of provider `id`. Returns false if not found.
    pub fn set_on_call(&self, id: &str, on_call: bool) -> bool {
        let mut providers = self.lock();
        match providers.iter_mut().find(|p| p.id.0 == id) {
            Some(provider) => {
                provider.is_on_call = on_call;
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Provider>> {
        self.providers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProviderDirectory for SharedRoster {
    fn roster(&self) -> Vec<Provider> {
        self.lock().clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
