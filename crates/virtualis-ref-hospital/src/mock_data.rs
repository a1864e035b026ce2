//! Simulated ward data for the Virtualis reference runtime.
//!
//! All data in this module is hardcoded and fictional.

use virtualis_contracts::{
    message::{PatientId, ProviderId, SenderInfo, SenderRole},
    provider::{Provider, ProviderStatus},
};

// ── Roster (mock) ─────────────────────────────────────────────────────────────

fn provider(
    id: &str,
    name: &str,
    specialty: &str,
    role: &str,
    is_on_call: bool,
    status: ProviderStatus,
    response_time_minutes: u32,
) -> Provider {
    Provider {
        id: ProviderId(id.to_string()),
        name: name.to_string(),
        specialty: specialty.to_string(),
        role: role.to_string(),
        is_on_call,
        status,
        response_time_minutes,
    }
}

/// Night-shift roster for the medical ward.
///
/// - Pulmonology: one attending on call (8 min), one fellow off call (25 min)
/// - Emergency Medicine: one attending on call (5 min)
/// - Cardiology: one attending on call (12 min)
/// - Nephrology: one attending off call (30 min)
/// - Internal Medicine: one hospitalist on call (15 min)
pub fn ward_roster() -> Vec<Provider> {
    vec![
        provider("prov-pulm-01", "Dr. Imani Okoro", "Pulmonology", "attending", true, ProviderStatus::Available, 8),
        provider("prov-pulm-02", "Dr. Tomas Lindgren", "Pulmonology", "fellow", false, ProviderStatus::OffDuty, 25),
        provider("prov-em-01", "Dr. Priya Raman", "Emergency Medicine", "attending", true, ProviderStatus::Busy, 5),
        provider("prov-card-01", "Dr. Henrik Sato", "Cardiology", "attending", true, ProviderStatus::Available, 12),
        provider("prov-neph-01", "Dr. Ade Bello", "Nephrology", "attending", false, ProviderStatus::OffDuty, 30),
        provider("prov-im-01", "Dr. Maria Chen", "Internal Medicine", "hospitalist", true, ProviderStatus::Available, 15),
    ]
}

// ── Senders (mock) ────────────────────────────────────────────────────────────

pub fn charge_nurse() -> SenderInfo {
    SenderInfo {
        id: "rn-204".to_string(),
        name: "K. Adeyemi, RN".to_string(),
        role: SenderRole::Nurse,
    }
}

pub fn ward_pharmacist() -> SenderInfo {
    SenderInfo {
        id: "rph-031".to_string(),
        name: "L. Moreau, PharmD".to_string(),
        role: SenderRole::Pharmacist,
    }
}

pub fn care_coordinator() -> SenderInfo {
    SenderInfo {
        id: "cc-112".to_string(),
        name: "S. Novak".to_string(),
        role: SenderRole::CareCoordinator,
    }
}

pub fn patient(bed: &str) -> Option<PatientId> {
    Some(PatientId(format!("pt-ward7-{bed}")))
}

// ── Shift messages (mock) ─────────────────────────────────────────────────────

pub const RESPIRATORY_DISTRESS: &str =
    "Patient showing signs of respiratory distress. O2 sat dropping to 88%.";

pub const CRITICAL_POTASSIUM: &str = "Critical potassium 6.8 on repeat draw, renal team aware.";

pub const DISCHARGE_PLANNING: &str = "Discharge planning meeting scheduled for tomorrow.";

pub const CHEST_PAIN: &str = "New chest pain 6/10, troponin pending, BP elevated.";

pub const GLUCOSE_REFILL: &str = "Insulin refill needed before next week, glucose log attached.";

// ── Analyzer replies (mock) ───────────────────────────────────────────────────

/// Canned external replies, keyed by a trigger phrase in the message text.
pub fn scripted_replies() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "respiratory distress",
            "Acute hypoxemic respiratory failure likely. Immediate bedside evaluation; consider pneumonia.",
        ),
        (
            "potassium",
            "Hyperkalemia with renal impairment; trend creatinine and notify nephrology.",
        ),
        (
            "chest pain",
            "Possible acute coronary syndrome. Serial troponin and 12-lead ECG advised.",
        ),
        (
            "discharge",
            "Administrative coordination; no acute clinical findings.",
        ),
    ]
}
