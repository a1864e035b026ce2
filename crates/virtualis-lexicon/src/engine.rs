//! Lexicon-backed keyword triage.
//!
//! `LexiconEngine` loads a `LexiconConfig` from a TOML string or file and
//! implements the `KeywordTriage` trait from virtualis-core.
//!
//! Classification algorithm:
//!
//! 1. Lowercase the message text and, if present, the external reply.
//! 2. For each acuity tier, collect the distinct keywords found in either.
//! 3. Any critical keyword → `Critical`, priority `base + critical_weight×c +
//!    urgent_weight×u`, clamped to 100.
//! 4. Otherwise any urgent keyword → `Urgent`, priority `base + urgent_weight×u`.
//! 5. Otherwise `Routine`, priority `base + routine_step×r`, capped at
//!    `routine_cap`.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use virtualis_contracts::{
    error::{VirtualisError, VirtualisResult},
    message::ensure_text,
    triage::{Acuity, AcuityAssessment, SpecialtyMatch},
};
use virtualis_core::traits::KeywordTriage;

use crate::table::{LexiconConfig, SPECIALTY_PLACEHOLDER};

const STANDARD_LEXICON: &str = include_str!("../lexicon/default.toml");

/// A `KeywordTriage` implementation driven by a TOML lexicon.
///
/// ```rust,ignore
/// use virtualis_lexicon::LexiconEngine;
///
/// let engine = LexiconEngine::from_file(Path::new("lexicon/ward-7.toml"))?;
/// ```
#[derive(Debug, Clone)]
pub struct LexiconEngine {
    config: LexiconConfig,
}

impl LexiconEngine {
    /// Parse `s` as TOML and build a `LexiconEngine`.
    ///
    /// Returns `VirtualisError::ConfigError` if the TOML is malformed, does
    /// not match `LexiconConfig`, or fails validation.
    pub fn from_toml_str(s: &str) -> VirtualisResult<Self> {
        let config: LexiconConfig = toml::from_str(s).map_err(|e| VirtualisError::ConfigError {
            reason: format!("failed to parse lexicon TOML: {}", e),
        })?;
        let config = config.normalize()?;
        debug!(
            version = %config.version,
            specialties = config.specialties.len(),
            "lexicon loaded"
        );
        Ok(Self { config })
    }

    /// Read the file at `path` and parse it as a lexicon.
    pub fn from_file(path: &Path) -> VirtualisResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| VirtualisError::ConfigError {
            reason: format!("failed to read lexicon file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The lexicon shipped with the crate.
    pub fn standard() -> VirtualisResult<Self> {
        Self::from_toml_str(STANDARD_LEXICON)
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Specialty names in registration order.
    pub fn specialties(&self) -> impl Iterator<Item = &str> {
        self.config.specialties.iter().map(|s| s.name.as_str())
    }

    fn priority(&self, acuity: Acuity, critical: usize, urgent: usize, routine: usize) -> u8 {
        let s = &self.config.scoring;
        let score = match acuity {
            Acuity::Critical => {
                s.base as usize + s.critical_weight as usize * critical + s.urgent_weight as usize * urgent
            }
            Acuity::Urgent => s.base as usize + s.urgent_weight as usize * urgent,
            Acuity::Routine => {
                (s.base as usize + s.routine_step as usize * routine).min(s.routine_cap as usize)
            }
        };
        score.min(100) as u8
    }
}

impl KeywordTriage for LexiconEngine {
    fn classify(&self, text: &str, external: Option<&str>) -> VirtualisResult<AcuityAssessment> {
        ensure_text(text)?;
        let haystacks = haystacks(text, external);

        let critical = matched(&self.config.acuity.critical, &haystacks);
        let urgent = matched(&self.config.acuity.urgent, &haystacks);
        let routine = matched(&self.config.acuity.routine, &haystacks);

        let acuity = if !critical.is_empty() {
            Acuity::Critical
        } else if !urgent.is_empty() {
            Acuity::Urgent
        } else {
            Acuity::Routine
        };
        let priority = self.priority(acuity, critical.len(), urgent.len(), routine.len());

        debug!(
            acuity = %acuity,
            priority,
            critical = critical.len(),
            urgent = urgent.len(),
            routine = routine.len(),
            "acuity classified"
        );

        let matched_keywords = critical
            .into_iter()
            .chain(urgent)
            .chain(routine)
            .map(str::to_string)
            .collect();

        Ok(AcuityAssessment {
            acuity,
            priority,
            matched_keywords,
        })
    }

    fn recommend(&self, text: &str, external: Option<&str>) -> SpecialtyMatch {
        let haystacks = haystacks(text, external);

        let mut matched_keywords = BTreeSet::new();
        let mut ranking = Vec::new();
        for entry in &self.config.specialties {
            let hits = matched(&entry.keywords, &haystacks);
            if hits.is_empty() {
                continue;
            }
            ranking.push((entry.name.clone(), hits.len()));
            matched_keywords.extend(hits.into_iter().map(str::to_string));
        }
        // Stable: equal counts keep registration order.
        ranking.sort_by_key(|(_, hits)| Reverse(*hits));

        let specialty = ranking.first().map(|(name, _)| name.clone());
        if let Some(name) = &specialty {
            debug!(specialty = %name, candidates = ranking.len(), "specialty recommended");
        }

        SpecialtyMatch {
            specialty,
            matched_keywords,
            ranking,
        }
    }

    fn suggested_actions(&self, acuity: Acuity, specialty: &str) -> Vec<String> {
        self.config
            .actions
            .for_acuity(acuity)
            .iter()
            .map(|template| template.replace(SPECIALTY_PLACEHOLDER, specialty))
            .collect()
    }
}

fn haystacks(text: &str, external: Option<&str>) -> Vec<String> {
    let mut out = vec![text.to_lowercase()];
    if let Some(reply) = external {
        out.push(reply.to_lowercase());
    }
    out
}

/// Distinct keywords that occur in at least one haystack.
fn matched<'a>(keywords: &'a [String], haystacks: &[String]) -> BTreeSet<&'a str> {
    keywords
        .iter()
        .filter(|k| haystacks.iter().any(|h| h.contains(k.as_str())))
        .map(String::as_str)
        .collect()
}
