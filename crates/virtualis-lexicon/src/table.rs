//! Lexicon table types and configuration schema.
//!
//! A `LexiconConfig` is deserialized from TOML and holds the acuity tiers,
//! the ordered specialty buckets, the scoring constants and the suggested
//! action templates. Specialty order is significant: on equal match counts
//! the bucket declared first wins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use virtualis_contracts::{
    error::{VirtualisError, VirtualisResult},
    triage::Acuity,
};

/// Highest priority a routine message may ever reach.
pub const ROUTINE_CEILING: u8 = 55;

/// Lowest priority any message may score.
pub const PRIORITY_BASELINE: u8 = 30;

/// Lowest priority a critical message may score.
pub const CRITICAL_MINIMUM: u8 = 60;

/// Placeholder substituted in action templates.
pub const SPECIALTY_PLACEHOLDER: &str = "{specialty}";

/// Priority scoring constants.
///
/// ```toml
/// [scoring]
/// base = 30
/// critical_weight = 30
/// urgent_weight = 15
/// routine_step = 5
/// routine_cap = 45
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base: u8,
    /// Added per distinct critical keyword.
    pub critical_weight: u8,
    /// Added per distinct urgent keyword.
    pub urgent_weight: u8,
    /// Added per distinct routine keyword, up to `routine_cap`.
    pub routine_step: u8,
    pub routine_cap: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 30,
            critical_weight: 30,
            urgent_weight: 15,
            routine_step: 5,
            routine_cap: 45,
        }
    }
}

/// Keyword lists per acuity tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcuityTiers {
    pub critical: Vec<String>,
    pub urgent: Vec<String>,
    /// Only nudges routine priority; never raises the tier.
    #[serde(default)]
    pub routine: Vec<String>,
}

/// One specialty bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyEntry {
    /// Display name, also the roster's specialty key (e.g. `"Cardiology"`).
    pub name: String,
    pub keywords: Vec<String>,
}

/// Suggested next steps per acuity. Templates may contain `{specialty}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTemplates {
    pub critical: Vec<String>,
    pub urgent: Vec<String>,
    pub routine: Vec<String>,
}

impl ActionTemplates {
    pub fn for_acuity(&self, acuity: Acuity) -> &[String] {
        match acuity {
            Acuity::Critical => &self.critical,
            Acuity::Urgent => &self.urgent,
            Acuity::Routine => &self.routine,
        }
    }
}

/// The top-level structure deserialized from a lexicon TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Lexicon revision, reported in logs.
    pub version: String,
    #[serde(default)]
    pub scoring: ScoringConfig,
    pub acuity: AcuityTiers,
    /// Ordered specialty buckets. Earlier entries win ties.
    pub specialties: Vec<SpecialtyEntry>,
    pub actions: ActionTemplates,
}

impl LexiconConfig {
    /// Check the table and lowercase every keyword.
    pub fn normalize(mut self) -> VirtualisResult<Self> {
        if self.version.trim().is_empty() {
            return Err(config_error("lexicon version must not be empty"));
        }
        if self.specialties.is_empty() {
            return Err(config_error("lexicon must declare at least one specialty"));
        }
        if self.scoring.routine_cap > ROUTINE_CEILING {
            return Err(config_error(format!(
                "routine_cap {} exceeds {}",
                self.scoring.routine_cap, ROUTINE_CEILING
            )));
        }
        if self.scoring.base < PRIORITY_BASELINE {
            return Err(config_error(format!(
                "scoring base {} is below {}",
                self.scoring.base, PRIORITY_BASELINE
            )));
        }
        if self.scoring.base > self.scoring.routine_cap {
            return Err(config_error(format!(
                "scoring base {} exceeds routine_cap {}",
                self.scoring.base, self.scoring.routine_cap
            )));
        }
        let critical_floor = u16::from(self.scoring.base) + u16::from(self.scoring.critical_weight);
        if critical_floor < u16::from(CRITICAL_MINIMUM) {
            return Err(config_error(format!(
                "scoring base + critical_weight is {}, critical messages need at least {}",
                critical_floor, CRITICAL_MINIMUM
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.specialties {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(config_error("specialty name must not be empty"));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(config_error(format!("duplicate specialty '{}'", name)));
            }
        }

        lower_all(&mut self.acuity.critical, "acuity.critical")?;
        lower_all(&mut self.acuity.urgent, "acuity.urgent")?;
        lower_all(&mut self.acuity.routine, "acuity.routine")?;
        for entry in &mut self.specialties {
            entry.name = entry.name.trim().to_string();
            let section = format!("specialty '{}'", entry.name);
            lower_all(&mut entry.keywords, &section)?;
        }

        Ok(self)
    }
}

fn lower_all(keywords: &mut [String], section: &str) -> VirtualisResult<()> {
    for keyword in keywords.iter_mut() {
        let lowered = keyword.trim().to_lowercase();
        if lowered.is_empty() {
            return Err(config_error(format!("empty keyword in {}", section)));
        }
        *keyword = lowered;
    }
    Ok(())
}

fn config_error(reason: impl Into<String>) -> VirtualisError {
    VirtualisError::ConfigError {
        reason: reason.into(),
    }
}
