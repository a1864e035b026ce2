//! Provider roster entries.
//!
//! The roster is owned and refreshed by an external directory service. The
//! triage engine only reads snapshots of it.

use serde::{Deserialize, Serialize};

use crate::message::ProviderId;

/// Specialty that receives critical escalations regardless of the
/// recommended specialty.
pub const EMERGENCY_MEDICINE: &str = "Emergency Medicine";

/// Current availability of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderStatus {
    Available,
    Busy,
    OffDuty,
}

/// A clinician in the roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub specialty: String,
    /// e.g. "attending", "fellow", "resident", "nurse practitioner".
    pub role: String,
    pub is_on_call: bool,
    pub status: ProviderStatus,
    /// Expected time to first response. Lower sorts first.
    pub response_time_minutes: u32,
}
