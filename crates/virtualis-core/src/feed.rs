//! The owned message store behind the live feed.
//!
//! Messages go into an append-only log. Triage results live in a separate
//! index keyed by message id, so a recomputation is a whole-value replace
//! rather than an in-place edit.
//!
//! Every analysis is started with an `AnalysisTicket` carrying the message's
//! current generation. `attach` only applies a result whose ticket is still
//! current and whose message has not been discarded; anything else is a
//! stale result and is dropped.

use std::collections::HashMap;

use virtualis_contracts::{
    message::{Message, MessageId},
    outcome::AttachOutcome,
    routing::FeedEntry,
    triage::{TriageResult, TriageState},
};

/// Proof that an analysis was started for a given message generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub message_id: MessageId,
    pub generation: u64,
}

/// The latest attached analysis for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub result: TriageResult,
    /// The external reply the result was mined from, kept so routing can be
    /// recomputed against a fresh roster.
    pub external_response: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Tracking {
    state: TriageState,
    generation: u64,
}

/// Append-only message log plus a latest-analysis index.
#[derive(Debug, Default)]
pub struct MessageFeed {
    log: Vec<Message>,
    positions: HashMap<MessageId, usize>,
    tracking: HashMap<MessageId, Tracking>,
    latest: HashMap<MessageId, Analysis>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message in the `Submitted` state.
    ///
    /// Appending an id that is already present is a no-op.
    pub fn append(&mut self, message: Message) -> MessageId {
        let id = message.id;
        if self.positions.contains_key(&id) {
            return id;
        }
        self.positions.insert(id, self.log.len());
        self.tracking.insert(
            id,
            Tracking {
                state: TriageState::Submitted,
                generation: 0,
            },
        );
        self.log.push(message);
        id
    }

    /// Start a new analysis for `id` and return its ticket.
    ///
    /// Bumps the generation, which invalidates every earlier ticket. A
    /// message that is already triaged stays `Triaged` (its current result
    /// remains visible until the new one lands). Returns `None` for unknown
    /// or discarded messages.
    pub fn begin_analysis(&mut self, id: &MessageId) -> Option<AnalysisTicket> {
        let tracking = self.tracking.get_mut(id)?;
        if tracking.state == TriageState::Discarded {
            return None;
        }
        tracking.generation += 1;
        if tracking.state != TriageState::Triaged {
            tracking.state = TriageState::Analyzing;
        }
        Some(AnalysisTicket {
            message_id: *id,
            generation: tracking.generation,
        })
    }

    /// Record that the external call for `ticket` failed.
    pub fn mark_failed(&mut self, ticket: &AnalysisTicket) {
        if let Some(tracking) = self.tracking.get_mut(&ticket.message_id) {
            if tracking.generation == ticket.generation && tracking.state == TriageState::Analyzing {
                tracking.state = TriageState::TriageFailed;
            }
        }
    }

    /// Apply `analysis` if `ticket` is still current.
    pub fn attach(&mut self, ticket: &AnalysisTicket, analysis: Analysis) -> AttachOutcome {
        let Some(tracking) = self.tracking.get_mut(&ticket.message_id) else {
            return AttachOutcome::StaleDiscarded;
        };
        if tracking.state == TriageState::Discarded || tracking.generation != ticket.generation {
            return AttachOutcome::StaleDiscarded;
        }
        tracking.state = TriageState::Triaged;
        self.latest.insert(ticket.message_id, analysis);
        AttachOutcome::Attached
    }

    /// Give up on the analysis behind `ticket`.
    ///
    /// A message that never received a result is dropped from the pending
    /// set as `Discarded`. A message that was already triaged keeps its
    /// previous result. Stale tickets change nothing.
    pub fn abandon(&mut self, ticket: &AnalysisTicket) {
        if let Some(tracking) = self.tracking.get_mut(&ticket.message_id) {
            if tracking.generation == ticket.generation
                && matches!(tracking.state, TriageState::Analyzing | TriageState::TriageFailed)
            {
                tracking.state = TriageState::Discarded;
            }
        }
    }

    /// Mark `id` as torn down. Returns false if the id is unknown.
    ///
    /// The message stays in the log but is hidden from the feed, and any
    /// in-flight analysis for it will be dropped on arrival.
    pub fn discard(&mut self, id: &MessageId) -> bool {
        match self.tracking.get_mut(id) {
            Some(tracking) => {
                tracking.state = TriageState::Discarded;
                true
            }
            None => false,
        }
    }

    pub fn state(&self, id: &MessageId) -> Option<TriageState> {
        self.tracking.get(id).map(|t| t.state)
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.positions.get(id).map(|&pos| &self.log[pos])
    }

    pub fn analysis(&self, id: &MessageId) -> Option<&Analysis> {
        self.latest.get(id)
    }

    /// Every triaged, non-discarded message with its result, in log order.
    pub fn entries(&self) -> Vec<FeedEntry> {
        self.log
            .iter()
            .filter(|m| self.state(&m.id) == Some(TriageState::Triaged))
            .filter_map(|m| {
                self.latest.get(&m.id).map(|a| FeedEntry {
                    message: m.clone(),
                    triage: a.result.clone(),
                })
            })
            .collect()
    }

    /// Messages still waiting for a result, in log order.
    pub fn pending(&self) -> Vec<MessageId> {
        self.log
            .iter()
            .map(|m| m.id)
            .filter(|id| {
                matches!(
                    self.state(id),
                    Some(TriageState::Submitted | TriageState::Analyzing | TriageState::TriageFailed)
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
