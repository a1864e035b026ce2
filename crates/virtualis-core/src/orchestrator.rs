//! The triage orchestrator: one synthesis step per message.
//!
//! Pipeline per message:
//!
//!   Submit → Analyzing → ClinicalAnalyzer (bounded) → KeywordTriage → Attach → Audit
//!
//! The external analysis is the only suspension point. When it errors, times
//! out, or returns nothing usable, the orchestrator runs `KeywordTriage` on
//! the raw text alone and tags the result as fallback-derived. Triage
//! therefore always completes; only `InvalidInput` reaches the caller.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use virtualis_contracts::{
    error::{VirtualisError, VirtualisResult},
    message::{ensure_text, AnalysisContext, Message, MessageId, PatientId, SenderInfo},
    outcome::{AttachOutcome, TriageOutcome, TriageRecord},
    routing::{FeedEntry, FeedFilter, RoutingRecommendation},
    triage::{Acuity, TriageResult, TriageSource, TriageState},
};
use virtualis_routing::{match_on_call, order_feed, widen};

use crate::{
    config::OrchestratorConfig,
    feed::{Analysis, AnalysisTicket, MessageFeed},
    traits::{ClinicalAnalyzer, KeywordTriage, ProviderDirectory, TriageAuditWriter},
};

/// Composes the lexicon, the external analyzer, the roster, and the message
/// store.
///
/// Construct one orchestrator per feed. All methods take `&self`; the store
/// is guarded by a mutex that is never held across an `.await`.
pub struct TriageOrchestrator {
    engine: Box<dyn KeywordTriage>,
    analyzer: Box<dyn ClinicalAnalyzer>,
    directory: Box<dyn ProviderDirectory>,
    audit: Box<dyn TriageAuditWriter>,
    config: OrchestratorConfig,
    feed: Mutex<MessageFeed>,
}

impl TriageOrchestrator {
    pub fn new(
        engine: Box<dyn KeywordTriage>,
        analyzer: Box<dyn ClinicalAnalyzer>,
        directory: Box<dyn ProviderDirectory>,
        audit: Box<dyn TriageAuditWriter>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            engine,
            analyzer,
            directory,
            audit,
            config,
            feed: Mutex::new(MessageFeed::new()),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Create a message from composer input and triage it.
    ///
    /// # Errors
    ///
    /// Returns `VirtualisError::InvalidInput` when `content` is blank.
    /// External failures fall back to local analysis and are not returned;
    /// an error from the keyword lexicon itself abandons the analysis and is
    /// passed through.
    pub async fn submit_message(
        &self,
        content: impl Into<String>,
        sender: SenderInfo,
        patient_id: Option<PatientId>,
    ) -> VirtualisResult<TriageOutcome> {
        let message = Message::new(content, sender, patient_id)?;
        self.submit(message).await
    }

    /// Triage an already-built message (e.g. one with recipients attached).
    pub async fn submit(&self, message: Message) -> VirtualisResult<TriageOutcome> {
        ensure_text(&message.content)?;

        let message_id = message.id;
        let ticket = {
            let mut feed = self.lock_feed();
            feed.append(message.clone());
            feed.begin_analysis(&message_id)
        };
        let Some(ticket) = ticket else {
            return Ok(TriageOutcome::Discarded { message_id });
        };

        info!(
            message_id = %message_id,
            sender_role = ?message.sender.role,
            "message submitted, analysis started"
        );
        self.run_analysis(message, ticket).await
    }

    /// Recompute the triage of an existing message.
    ///
    /// The previous result stays visible until the new one replaces it as a
    /// whole. Unknown or discarded messages yield `TriageOutcome::Discarded`.
    pub async fn retriage(&self, message_id: &MessageId) -> VirtualisResult<TriageOutcome> {
        let started = {
            let mut feed = self.lock_feed();
            let message = feed.message(message_id).cloned();
            message.and_then(|m| feed.begin_analysis(message_id).map(|t| (m, t)))
        };
        let Some((message, ticket)) = started else {
            debug!(message_id = %message_id, "retriage requested for unknown or discarded message");
            return Ok(TriageOutcome::Discarded {
                message_id: *message_id,
            });
        };

        info!(
            message_id = %message_id,
            generation = ticket.generation,
            "re-triage started"
        );
        self.run_analysis(message, ticket).await
    }

    /// Tear down a message. Any analysis still in flight for it is dropped.
    pub fn discard(&self, message_id: &MessageId) -> bool {
        let discarded = self.lock_feed().discard(message_id);
        if discarded {
            info!(message_id = %message_id, "message discarded");
        }
        discarded
    }

    /// Combine local lexicon analysis with an optional external reply.
    ///
    /// Pure with respect to `(text, external)`: the same pair always produces
    /// the same `TriageResult`. `external = None` is the fallback path, on
    /// which a critical result is floored at `fallback_critical_floor`.
    pub fn synthesize(&self, text: &str, external: Option<&str>) -> VirtualisResult<TriageResult> {
        let source = if external.is_some() {
            TriageSource::External
        } else {
            TriageSource::Fallback
        };

        let assessment = self.engine.classify(text, external)?;
        let specialty_match = self.engine.recommend(text, external);

        let mut priority = assessment.priority;
        if source == TriageSource::Fallback && assessment.acuity == Acuity::Critical {
            priority = priority.max(self.config.fallback_critical_floor);
        }

        let routed_to = specialty_match
            .specialty
            .as_deref()
            .unwrap_or(&self.config.default_specialty);
        let suggested_actions = self.engine.suggested_actions(assessment.acuity, routed_to);

        let mut keywords = assessment.matched_keywords;
        keywords.extend(specialty_match.matched_keywords);

        Ok(TriageResult {
            acuity: assessment.acuity,
            priority,
            recommended_specialty: specialty_match.specialty,
            keywords,
            suggested_actions,
            source,
        })
    }

    /// Recompute routing for a triaged message against the current roster.
    pub fn route(&self, message_id: &MessageId) -> Option<RoutingRecommendation> {
        let (content, analysis) = {
            let feed = self.lock_feed();
            if feed.state(message_id) != Some(TriageState::Triaged) {
                return None;
            }
            let content = feed.message(message_id)?.content.clone();
            (content, feed.analysis(message_id)?.clone())
        };
        Some(self.build_routing(
            &content,
            analysis.external_response.as_deref(),
            &analysis.result,
        ))
    }

    /// The triaged feed, filtered and sorted. Messages still analyzing are
    /// never included.
    pub fn feed(&self, filter: &FeedFilter) -> Vec<FeedEntry> {
        let entries = self.lock_feed().entries();
        order_feed(&entries, filter)
    }

    /// Messages still waiting for a triage result.
    pub fn pending(&self) -> Vec<MessageId> {
        self.lock_feed().pending()
    }

    pub fn state(&self, message_id: &MessageId) -> Option<TriageState> {
        self.lock_feed().state(message_id)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    async fn run_analysis(
        &self,
        message: Message,
        ticket: AnalysisTicket,
    ) -> VirtualisResult<TriageOutcome> {
        let context = AnalysisContext::for_message(&message);

        let (external_response, external_error) =
            match self.call_analyzer(&message.content, &context).await {
                Ok(reply) => (Some(reply), None),
                Err(e) => {
                    warn!(
                        message_id = %message.id,
                        error = %e,
                        "external analysis unavailable, using lexicon fallback"
                    );
                    self.lock_feed().mark_failed(&ticket);
                    (None, Some(e.to_string()))
                }
            };

        let result = match self.synthesize(&message.content, external_response.as_deref()) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    message_id = %message.id,
                    generation = ticket.generation,
                    error = %e,
                    "local analysis failed, abandoning triage"
                );
                self.lock_feed().abandon(&ticket);
                self.record(
                    &ticket,
                    None,
                    AttachOutcome::AnalysisFailed,
                    external_error,
                    Some(e.to_string()),
                );
                return Err(e);
            }
        };

        let attached = self.lock_feed().attach(
            &ticket,
            Analysis {
                result: result.clone(),
                external_response: external_response.clone(),
            },
        );
        self.record(&ticket, Some(&result), attached, external_error, None);

        match attached {
            AttachOutcome::Attached => {
                let routing =
                    self.build_routing(&message.content, external_response.as_deref(), &result);
                info!(
                    message_id = %message.id,
                    acuity = %result.acuity,
                    priority = result.priority,
                    source = %result.source,
                    specialty = %routing.recommended_specialty,
                    providers = routing.suggested_providers.len(),
                    "message triaged"
                );
                Ok(TriageOutcome::Triaged {
                    message,
                    result,
                    routing,
                })
            }
            AttachOutcome::StaleDiscarded | AttachOutcome::AnalysisFailed => {
                warn!(
                    message_id = %message.id,
                    generation = ticket.generation,
                    "stale triage result dropped"
                );
                Ok(TriageOutcome::Discarded {
                    message_id: message.id,
                })
            }
        }
    }

    /// Call the external analyzer under the configured timeout.
    ///
    /// A blank reply counts as a malformed response.
    async fn call_analyzer(&self, text: &str, context: &AnalysisContext) -> VirtualisResult<String> {
        let timeout = self.config.analysis_timeout();
        debug!(
            message_id = %context.message_id,
            timeout_ms = self.config.analysis_timeout_ms,
            "calling external analyzer"
        );

        let reply = match tokio::time::timeout(timeout, self.analyzer.analyze(text, context)).await {
            Ok(reply) => reply?,
            Err(_) => {
                return Err(VirtualisError::AnalysisTimeout {
                    timeout_ms: self.config.analysis_timeout_ms,
                })
            }
        };

        if reply.trim().is_empty() {
            return Err(VirtualisError::ExternalAnalysis {
                reason: "analyzer returned an empty reply".to_string(),
            });
        }
        Ok(reply)
    }

    fn build_routing(
        &self,
        text: &str,
        external: Option<&str>,
        result: &TriageResult,
    ) -> RoutingRecommendation {
        let specialty_match = self.engine.recommend(text, external);
        let specialty = result
            .recommended_specialty
            .clone()
            .unwrap_or_else(|| self.config.default_specialty.clone());

        let roster = self.directory.roster();
        let mut providers = match_on_call(&specialty, &roster, result.acuity);
        let widened = providers.is_empty();
        if widened {
            providers = widen(&specialty, &roster);
        }

        let primary_hits = specialty_match
            .ranking
            .iter()
            .find(|(name, _)| *name == specialty)
            .map(|(_, hits)| *hits)
            .unwrap_or(0);
        let contested = specialty_match
            .ranking
            .iter()
            .any(|(name, hits)| *name != specialty && *hits == primary_hits && primary_hits > 0);
        let alternative_specialties: Vec<String> = specialty_match
            .ranking
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| *name != specialty)
            .collect();

        let mut reasoning = if primary_hits > 0 {
            format!("{specialty} recommended from {primary_hits} keyword match(es)")
        } else {
            format!("no specialty keywords matched; routed to default {specialty}")
        };
        reasoning.push_str(&format!(
            "; acuity {} at priority {} ({} analysis)",
            result.acuity, result.priority, result.source
        ));
        if contested {
            reasoning.push_str("; tied with another specialty, first registered wins");
        }
        if widened && providers.is_empty() {
            reasoning.push_str(&format!("; no {specialty} provider in roster"));
        } else if widened {
            reasoning.push_str(&format!(
                "; no on-call {specialty} provider, widened to full specialty roster"
            ));
        }

        RoutingRecommendation {
            recommended_specialty: specialty,
            urgency_level: result.acuity,
            confidence: routing_confidence(primary_hits, contested, result.source),
            reasoning,
            suggested_providers: providers,
            alternative_specialties,
        }
    }

    fn record(
        &self,
        ticket: &AnalysisTicket,
        result: Option<&TriageResult>,
        outcome: AttachOutcome,
        external_error: Option<String>,
        analysis_error: Option<String>,
    ) {
        let record = TriageRecord {
            message_id: ticket.message_id,
            generation: ticket.generation,
            source: result.map(|r| r.source),
            acuity: result.map(|r| r.acuity),
            priority: result.map(|r| r.priority),
            recommended_specialty: result.and_then(|r| r.recommended_specialty.clone()),
            outcome,
            external_error,
            analysis_error,
            timestamp: chrono::Utc::now(),
        };
        // Triage must still complete when the audit sink is down.
        if let Err(e) = self.audit.write(&record) {
            warn!(
                message_id = %ticket.message_id,
                error = %e,
                "triage audit write failed"
            );
        }
    }

    fn lock_feed(&self) -> MutexGuard<'_, MessageFeed> {
        self.feed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Confidence in the routed specialty, 0..=100.
///
/// 25 when routed to the default; otherwise 40 plus 15 per matched keyword
/// (counting at most four), plus 10 when an external reply was mined, minus
/// 15 when another specialty tied.
fn routing_confidence(primary_hits: usize, contested: bool, source: TriageSource) -> u8 {
    if primary_hits == 0 {
        return 25;
    }
    let mut score = 40 + 15 * primary_hits.min(4) as u32;
    if source == TriageSource::External {
        score += 10;
    }
    if contested {
        score = score.saturating_sub(15);
    }
    score.min(100) as u8
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use virtualis_contracts::{
        error::{VirtualisError, VirtualisResult},
        message::{AnalysisContext, ProviderId, SenderInfo, SenderRole},
        outcome::{AttachOutcome, TriageOutcome, TriageRecord},
        provider::{Provider, ProviderStatus},
        routing::FeedFilter,
        triage::{Acuity, AcuityAssessment, SpecialtyMatch, TriageSource, TriageState},
    };

    use crate::{
        config::OrchestratorConfig,
        traits::{ClinicalAnalyzer, KeywordTriage, ProviderDirectory, TriageAuditWriter},
    };

    use super::{routing_confidence, TriageOrchestrator};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// A tiny lexicon: "distress" is critical, "worsening" urgent,
    /// "respiratory" maps to Pulmonology and "chest" to Cardiology.
    struct MockTriage;

    impl MockTriage {
        fn hits(text: &str, external: Option<&str>, keyword: &str) -> bool {
            text.to_lowercase().contains(keyword)
                || external.is_some_and(|e| e.to_lowercase().contains(keyword))
        }
    }

    impl KeywordTriage for MockTriage {
        fn classify(&self, text: &str, external: Option<&str>) -> VirtualisResult<AcuityAssessment> {
            if text.trim().is_empty() {
                return Err(VirtualisError::InvalidInput {
                    reason: "message text must not be empty".to_string(),
                });
            }
            let mut matched = BTreeSet::new();
            let (acuity, priority) = if Self::hits(text, external, "distress") {
                matched.insert("distress".to_string());
                (Acuity::Critical, 60)
            } else if Self::hits(text, external, "worsening") {
                matched.insert("worsening".to_string());
                (Acuity::Urgent, 45)
            } else {
                (Acuity::Routine, 30)
            };
            Ok(AcuityAssessment {
                acuity,
                priority,
                matched_keywords: matched,
            })
        }

        fn recommend(&self, text: &str, external: Option<&str>) -> SpecialtyMatch {
            let mut ranking = Vec::new();
            let mut matched = BTreeSet::new();
            if Self::hits(text, external, "respiratory") {
                ranking.push(("Pulmonology".to_string(), 1));
                matched.insert("respiratory".to_string());
            }
            if Self::hits(text, external, "chest") {
                ranking.push(("Cardiology".to_string(), 1));
                matched.insert("chest".to_string());
            }
            SpecialtyMatch {
                specialty: ranking.first().map(|(name, _)| name.clone()),
                matched_keywords: matched,
                ranking,
            }
        }

        fn suggested_actions(&self, acuity: Acuity, specialty: &str) -> Vec<String> {
            vec![format!("Notify {specialty} ({acuity})")]
        }
    }

    /// A lexicon whose classifier rejects every message.
    struct BrokenTriage;

    impl KeywordTriage for BrokenTriage {
        fn classify(&self, _text: &str, _external: Option<&str>) -> VirtualisResult<AcuityAssessment> {
            Err(VirtualisError::ConfigError {
                reason: "lexicon table unavailable".to_string(),
            })
        }

        fn recommend(&self, text: &str, external: Option<&str>) -> SpecialtyMatch {
            MockTriage.recommend(text, external)
        }

        fn suggested_actions(&self, acuity: Acuity, specialty: &str) -> Vec<String> {
            MockTriage.suggested_actions(acuity, specialty)
        }
    }

    /// Always answers with the same reply.
    struct ReplyAnalyzer(String);

    #[async_trait]
    impl ClinicalAnalyzer for ReplyAnalyzer {
        async fn analyze(&self, _text: &str, _ctx: &AnalysisContext) -> VirtualisResult<String> {
            Ok(self.0.clone())
        }
    }

    /// Always rejects.
    struct FailingAnalyzer;

    #[async_trait]
    impl ClinicalAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _text: &str, _ctx: &AnalysisContext) -> VirtualisResult<String> {
            Err(VirtualisError::ExternalAnalysis {
                reason: "connection refused".to_string(),
            })
        }
    }

    /// Sleeps before answering.
    struct SlowAnalyzer {
        delay: Duration,
        reply: String,
    }

    #[async_trait]
    impl ClinicalAnalyzer for SlowAnalyzer {
        async fn analyze(&self, _text: &str, _ctx: &AnalysisContext) -> VirtualisResult<String> {
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.clone())
        }
    }

    /// Plays back a fixed sequence of replies.
    struct ScriptedAnalyzer {
        replies: Mutex<VecDeque<VirtualisResult<String>>>,
    }

    #[async_trait]
    impl ClinicalAnalyzer for ScriptedAnalyzer {
        async fn analyze(&self, _text: &str, _ctx: &AnalysisContext) -> VirtualisResult<String> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VirtualisError::ExternalAnalysis {
                    reason: "script exhausted".to_string(),
                }))
        }
    }

    struct MockDirectory(Vec<Provider>);

    impl ProviderDirectory for MockDirectory {
        fn roster(&self) -> Vec<Provider> {
            self.0.clone()
        }
    }

    /// An audit writer that records every call for later inspection.
    struct MockAudit {
        records: Arc<Mutex<Vec<TriageRecord>>>,
    }

    impl TriageAuditWriter for MockAudit {
        fn write(&self, record: &TriageRecord) -> VirtualisResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    /// An audit writer that is always down.
    struct BrokenAudit;

    impl TriageAuditWriter for BrokenAudit {
        fn write(&self, _record: &TriageRecord) -> VirtualisResult<()> {
            Err(VirtualisError::AuditWriteFailed {
                reason: "disk full".to_string(),
            })
        }
    }

    fn provider(id: &str, specialty: &str, on_call: bool, minutes: u32) -> Provider {
        Provider {
            id: ProviderId(id.to_string()),
            name: format!("Dr. {id}"),
            specialty: specialty.to_string(),
            role: "attending".to_string(),
            is_on_call: on_call,
            status: ProviderStatus::Available,
            response_time_minutes: minutes,
        }
    }

    fn nurse() -> SenderInfo {
        SenderInfo {
            id: "rn-12".to_string(),
            name: "A. Lindqvist".to_string(),
            role: SenderRole::Nurse,
        }
    }

    fn orchestrator(
        analyzer: Box<dyn ClinicalAnalyzer>,
        roster: Vec<Provider>,
        config: OrchestratorConfig,
    ) -> (TriageOrchestrator, Arc<Mutex<Vec<TriageRecord>>>) {
        let records = Arc::new(Mutex::new(vec![]));
        let orch = TriageOrchestrator::new(
            Box::new(MockTriage),
            analyzer,
            Box::new(MockDirectory(roster)),
            Box::new(MockAudit {
                records: records.clone(),
            }),
            config,
        );
        (orch, records)
    }

    // ── Test cases ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_triage() {
        let (orch, records) = orchestrator(
            Box::new(ReplyAnalyzer("anything".to_string())),
            vec![],
            OrchestratorConfig::default(),
        );

        match orch.submit_message("   \n", nurse(), None).await {
            Err(VirtualisError::InvalidInput { .. }) => {}
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(records.lock().unwrap().is_empty(), "nothing may be audited");
        assert!(orch.feed(&FeedFilter::All).is_empty());
        assert!(orch.pending().is_empty());
    }

    /// The external reply is mined by the lexicon alongside the raw text.
    #[tokio::test]
    async fn test_external_reply_is_mined() {
        let (orch, records) = orchestrator(
            Box::new(ReplyAnalyzer("Findings suggest respiratory distress.".to_string())),
            vec![provider("pulm", "Pulmonology", true, 8)],
            OrchestratorConfig::default(),
        );

        let outcome = orch
            .submit_message("Patient worsening overnight", nurse(), None)
            .await
            .unwrap();

        match outcome {
            TriageOutcome::Triaged { result, routing, .. } => {
                assert_eq!(result.source, TriageSource::External);
                assert_eq!(result.acuity, Acuity::Critical);
                // No floor on the external path.
                assert_eq!(result.priority, 60);
                assert_eq!(result.recommended_specialty.as_deref(), Some("Pulmonology"));
                assert!(result.keywords.contains("distress"));
                assert!(result.keywords.contains("respiratory"));
                assert_eq!(routing.suggested_providers.len(), 1);
                assert_eq!(routing.confidence, 65);
            }
            other => panic!("expected Triaged, got {:?}", other),
        }

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, AttachOutcome::Attached);
        assert!(records[0].external_error.is_none());
    }

    /// A rejecting analyzer still yields a triaged message, fallback-tagged,
    /// with the critical floor applied.
    #[tokio::test]
    async fn test_failing_analyzer_falls_back() {
        let (orch, records) = orchestrator(
            Box::new(FailingAnalyzer),
            vec![],
            OrchestratorConfig::default(),
        );

        let outcome = orch
            .submit_message("Respiratory distress in bay 3", nurse(), None)
            .await
            .unwrap();

        let result = outcome.result().cloned().expect("fallback must attach a result");
        assert!(result.is_fallback());
        assert_eq!(result.acuity, Acuity::Critical);
        assert_eq!(result.priority, 80);

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0]
            .external_error
            .as_deref()
            .unwrap()
            .contains("connection refused"));
    }

    /// A stalled analyzer is cut off by the timeout and the fallback lands.
    #[tokio::test]
    async fn test_timeout_falls_back_within_bound() {
        let config = OrchestratorConfig {
            analysis_timeout_ms: 50,
            ..OrchestratorConfig::default()
        };
        let (orch, records) = orchestrator(
            Box::new(SlowAnalyzer {
                delay: Duration::from_secs(10),
                reply: "never seen".to_string(),
            }),
            vec![],
            config,
        );

        let started = Instant::now();
        let outcome = orch
            .submit_message("Patient worsening", nurse(), None)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        let result = outcome.result().cloned().unwrap();
        assert_eq!(result.source, TriageSource::Fallback);
        assert_eq!(result.acuity, Acuity::Urgent);

        let records = records.lock().unwrap();
        assert!(records[0].external_error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_blank_external_reply_counts_as_failure() {
        let (orch, _) = orchestrator(
            Box::new(ReplyAnalyzer("   ".to_string())),
            vec![],
            OrchestratorConfig::default(),
        );

        let outcome = orch.submit_message("chest tightness", nurse(), None).await.unwrap();
        assert!(outcome.result().unwrap().is_fallback());
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let (orch, _) = orchestrator(Box::new(FailingAnalyzer), vec![], OrchestratorConfig::default());

        for external in [None, Some("respiratory distress noted")] {
            let a = orch.synthesize("chest pain, worsening", external).unwrap();
            let b = orch.synthesize("chest pain, worsening", external).unwrap();
            assert_eq!(a, b);
            assert_eq!(
                serde_json::to_vec(&a).unwrap(),
                serde_json::to_vec(&b).unwrap(),
                "results must be bit-identical"
            );
        }
    }

    #[test]
    fn test_synthesize_rejects_blank_text() {
        let (orch, _) = orchestrator(Box::new(FailingAnalyzer), vec![], OrchestratorConfig::default());
        assert!(matches!(
            orch.synthesize("", None),
            Err(VirtualisError::InvalidInput { .. })
        ));
    }

    /// Tearing a message down mid-analysis drops the late result.
    #[tokio::test]
    async fn test_discard_during_analysis_drops_result() {
        let (orch, records) = orchestrator(
            Box::new(SlowAnalyzer {
                delay: Duration::from_millis(200),
                reply: "respiratory distress".to_string(),
            }),
            vec![],
            OrchestratorConfig::default(),
        );

        let submit = orch.submit_message("check bed 9", nurse(), None);
        let teardown = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let pending = orch.pending();
            assert_eq!(pending.len(), 1);
            assert_eq!(orch.state(&pending[0]), Some(TriageState::Analyzing));
            assert!(orch.feed(&FeedFilter::All).is_empty());
            assert!(orch.discard(&pending[0]));
            pending[0]
        };

        let (outcome, discarded_id) = tokio::join!(submit, teardown);
        match outcome.unwrap() {
            TriageOutcome::Discarded { message_id } => assert_eq!(message_id, discarded_id),
            other => panic!("expected Discarded, got {:?}", other),
        }
        assert_eq!(orch.state(&discarded_id), Some(TriageState::Discarded));
        assert!(orch.feed(&FeedFilter::All).is_empty());
        assert!(orch.route(&discarded_id).is_none());

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, AttachOutcome::StaleDiscarded);
    }

    /// Retriage after a failed external call replaces the fallback result.
    #[tokio::test]
    async fn test_retriage_replaces_fallback_result() {
        let analyzer = ScriptedAnalyzer {
            replies: Mutex::new(VecDeque::from(vec![
                Err(VirtualisError::ExternalAnalysis {
                    reason: "503".to_string(),
                }),
                Ok("respiratory distress on reassessment".to_string()),
            ])),
        };
        let (orch, records) = orchestrator(Box::new(analyzer), vec![], OrchestratorConfig::default());

        let first = orch.submit_message("please review", nurse(), None).await.unwrap();
        let TriageOutcome::Triaged { message, result, .. } = first else {
            panic!("expected Triaged");
        };
        assert!(result.is_fallback());
        assert_eq!(result.acuity, Acuity::Routine);

        let second = orch.retriage(&message.id).await.unwrap();
        let updated = second.result().cloned().unwrap();
        assert_eq!(updated.source, TriageSource::External);
        assert_eq!(updated.acuity, Acuity::Critical);

        let feed = orch.feed(&FeedFilter::All);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].triage, updated);

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].generation > records[0].generation);
    }

    #[tokio::test]
    async fn test_retriage_unknown_message_is_discarded() {
        let (orch, _) = orchestrator(Box::new(FailingAnalyzer), vec![], OrchestratorConfig::default());
        let id = virtualis_contracts::message::MessageId::new();
        assert!(matches!(
            orch.retriage(&id).await.unwrap(),
            TriageOutcome::Discarded { .. }
        ));
    }

    /// No on-call specialist: routing widens to the whole specialty.
    #[tokio::test]
    async fn test_route_widens_when_nobody_on_call() {
        let roster = vec![
            provider("pulm-a", "Pulmonology", false, 30),
            provider("pulm-b", "Pulmonology", false, 12),
        ];
        let (orch, _) = orchestrator(Box::new(FailingAnalyzer), roster, OrchestratorConfig::default());

        let outcome = orch
            .submit_message("respiratory rate up, worsening", nurse(), None)
            .await
            .unwrap();
        let TriageOutcome::Triaged { message, routing, .. } = outcome else {
            panic!("expected Triaged");
        };

        let ids: Vec<&str> = routing.suggested_providers.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(ids, vec!["pulm-b", "pulm-a"]);
        assert!(routing.reasoning.contains("widened"));

        // Recomputed routing matches the one returned at submit time.
        assert_eq!(orch.route(&message.id), Some(routing));
    }

    /// Nothing matched: route to the configured default; alternatives never
    /// contain the primary.
    #[tokio::test]
    async fn test_route_uses_default_specialty() {
        let (orch, _) = orchestrator(
            Box::new(FailingAnalyzer),
            vec![provider("im", "Internal Medicine", true, 20)],
            OrchestratorConfig::default(),
        );

        let outcome = orch.submit_message("family meeting at 3pm", nurse(), None).await.unwrap();
        let TriageOutcome::Triaged { result, routing, .. } = outcome else {
            panic!("expected Triaged");
        };
        assert!(result.recommended_specialty.is_none());
        assert_eq!(routing.recommended_specialty, "Internal Medicine");
        assert_eq!(routing.confidence, 25);
        assert_eq!(routing.suggested_providers.len(), 1);
        assert!(result.suggested_actions[0].contains("Internal Medicine"));
    }

    #[tokio::test]
    async fn test_tied_specialties_lower_confidence() {
        let (orch, _) = orchestrator(Box::new(FailingAnalyzer), vec![], OrchestratorConfig::default());
        let outcome = orch
            .submit_message("chest and respiratory complaints", nurse(), None)
            .await
            .unwrap();
        let TriageOutcome::Triaged { routing, .. } = outcome else {
            panic!("expected Triaged");
        };
        assert_eq!(routing.recommended_specialty, "Pulmonology");
        assert_eq!(routing.alternative_specialties, vec!["Cardiology".to_string()]);
        assert!(!routing.alternative_specialties.contains(&routing.recommended_specialty));
        assert!(routing.reasoning.contains("tied"));
        assert_eq!(routing.confidence, 40);
    }

    #[tokio::test]
    async fn test_feed_is_sorted_and_filtered() {
        let (orch, _) = orchestrator(Box::new(FailingAnalyzer), vec![], OrchestratorConfig::default());

        orch.submit_message("routine refill", nurse(), None).await.unwrap();
        orch.submit_message("resident in distress", nurse(), None).await.unwrap();
        orch.submit_message("wound worsening", nurse(), None).await.unwrap();

        let feed = orch.feed(&FeedFilter::All);
        let tiers: Vec<Acuity> = feed.iter().map(|e| e.triage.acuity).collect();
        assert_eq!(tiers, vec![Acuity::Critical, Acuity::Urgent, Acuity::Routine]);

        let critical = orch.feed(&FeedFilter::CriticalOnly);
        assert_eq!(critical.len(), 1);
        assert_eq!(orch.feed(&FeedFilter::Mine("someone-else".to_string())).len(), 0);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_block_triage() {
        let orch = TriageOrchestrator::new(
            Box::new(MockTriage),
            Box::new(FailingAnalyzer),
            Box::new(MockDirectory(vec![])),
            Box::new(BrokenAudit),
            OrchestratorConfig::default(),
        );
        let outcome = orch.submit_message("worsening", nurse(), None).await.unwrap();
        assert!(outcome.result().is_some());
    }

    /// A local analysis error leaves nothing pending and is audited.
    #[tokio::test]
    async fn test_local_analysis_failure_is_abandoned() {
        let records = Arc::new(Mutex::new(vec![]));
        let orch = TriageOrchestrator::new(
            Box::new(BrokenTriage),
            Box::new(FailingAnalyzer),
            Box::new(MockDirectory(vec![])),
            Box::new(MockAudit {
                records: records.clone(),
            }),
            OrchestratorConfig::default(),
        );

        match orch.submit_message("patient worsening", nurse(), None).await {
            Err(VirtualisError::ConfigError { .. }) => {}
            other => panic!("expected ConfigError, got {:?}", other),
        }
        assert!(orch.pending().is_empty());
        assert!(orch.feed(&FeedFilter::All).is_empty());

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, AttachOutcome::AnalysisFailed);
        assert!(records[0].priority.is_none());
        assert!(records[0].external_error.is_some());
        assert!(records[0]
            .analysis_error
            .as_deref()
            .unwrap()
            .contains("lexicon table unavailable"));
        assert_eq!(orch.state(&records[0].message_id), Some(TriageState::Discarded));
    }

    #[test]
    fn test_routing_confidence_bounds() {
        assert_eq!(routing_confidence(0, false, TriageSource::External), 25);
        assert_eq!(routing_confidence(1, false, TriageSource::Fallback), 55);
        assert_eq!(routing_confidence(9, false, TriageSource::External), 100);
        assert_eq!(routing_confidence(1, true, TriageSource::Fallback), 40);
    }
}
