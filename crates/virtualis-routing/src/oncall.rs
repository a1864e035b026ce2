//! On-call matching against a roster snapshot.
//!
//! Matching algorithm:
//!
//! 1. Keep providers whose `specialty` equals the requested specialty and
//!    who are on call.
//! 2. When urgency is critical, also keep on-call Emergency Medicine
//!    providers regardless of the requested specialty.
//! 3. Sort ascending by `response_time_minutes`. The sort is stable, so
//!    equal response times keep roster order.
//!
//! An empty result is not an error. It tells the orchestrator to `widen`.

use tracing::debug;

use virtualis_contracts::{
    provider::{Provider, EMERGENCY_MEDICINE},
    triage::Acuity,
};

/// Return the providers eligible for immediate routing, fastest first.
pub fn match_on_call(specialty: &str, roster: &[Provider], urgency: Acuity) -> Vec<Provider> {
    let escalate = urgency == Acuity::Critical;

    let mut eligible: Vec<Provider> = roster
        .iter()
        .filter(|p| p.is_on_call)
        .filter(|p| p.specialty == specialty || (escalate && p.specialty == EMERGENCY_MEDICINE))
        .cloned()
        .collect();
    eligible.sort_by_key(|p| p.response_time_minutes);

    debug!(
        specialty = %specialty,
        urgency = %urgency,
        eligible = eligible.len(),
        "on-call match computed"
    );
    eligible
}

/// Return every provider in `specialty`, on call or not, fastest first.
///
/// Used when `match_on_call` finds nobody.
pub fn widen(specialty: &str, roster: &[Provider]) -> Vec<Provider> {
    let mut all: Vec<Provider> = roster
        .iter()
        .filter(|p| p.specialty == specialty)
        .cloned()
        .collect();
    all.sort_by_key(|p| p.response_time_minutes);
    all
}
