// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! IPERC risk scoring and risk record validation.
//!
//! A risk's score is the product of its probability and severity, each on a
//! 1–5 scale. The score is never stored on its own: `RiskScore` keeps the two
//! inputs and derives the value and tier on demand.

use crate::error::DomainError;
use crate::types::{Area, Worker};
use crate::validation::{require_non_blank, validate_scale};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Highest score still classified as low risk.
pub const LOW_RISK_MAX: u8 = 6;
/// Highest score still classified as medium risk.
pub const MEDIUM_RISK_MAX: u8 = 12;

/// Qualitative risk classification derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Score ≤ 6. Tolerable, keep basic controls.
    Low,
    /// Score 7–12. Requires mitigation and monitoring.
    Medium,
    /// Score > 12. Requires immediate controls.
    High,
}

impl RiskTier {
    /// Classifies a score into a tier.
    #[must_use]
    pub const fn from_score(value: u8) -> Self {
        if value <= LOW_RISK_MAX {
            Self::Low
        } else if value <= MEDIUM_RISK_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Returns the label used in reports and exports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Riesgo Bajo",
            Self::Medium => "Riesgo Medio",
            Self::High => "Riesgo Alto",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A validated (probability, severity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskScore {
    probability: u8,
    severity: u8,
}

impl RiskScore {
    /// Creates a score from its two factors.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if either factor is outside `[1, 5]`.
    pub fn new(probability: u8, severity: u8) -> Result<Self, DomainError> {
        validate_scale("probability", probability)?;
        validate_scale("severity", severity)?;
        Ok(Self {
            probability,
            severity,
        })
    }

    /// Returns the probability factor.
    #[must_use]
    pub const fn probability(&self) -> u8 {
        self.probability
    }

    /// Returns the severity factor.
    #[must_use]
    pub const fn severity(&self) -> u8 {
        self.severity
    }

    /// Returns probability × severity (1–25).
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.probability * self.severity
    }

    /// Returns the tier for this score.
    #[must_use]
    pub const fn tier(&self) -> RiskTier {
        RiskTier::from_score(self.value())
    }
}

/// Scores a risk.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if either factor is outside `[1, 5]`.
pub fn score(probability: u8, severity: u8) -> Result<RiskScore, DomainError> {
    RiskScore::new(probability, severity)
}

/// Hazard categories used by the IPERC matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardCategory {
    /// Noise, vibration, temperature, radiation.
    #[serde(rename = "Físico")]
    Physical,
    /// Dusts, vapours, corrosives.
    #[serde(rename = "Químico")]
    Chemical,
    /// Viruses, bacteria, fungi.
    #[serde(rename = "Biológico")]
    Biological,
    /// Posture, repetitive motion, manual handling.
    #[serde(rename = "Ergonómico")]
    Ergonomic,
    /// Moving parts, crushing, cutting.
    #[serde(rename = "Mecánico")]
    Mechanical,
    /// Contact with energized equipment.
    #[serde(rename = "Eléctrico")]
    Electrical,
    /// Floors, stairs, order and cleanliness.
    #[serde(rename = "Locativo")]
    Locational,
    /// Workload, stress, harassment.
    #[serde(rename = "Psicosocial")]
    Psychosocial,
}

impl HazardCategory {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Physical => "Físico",
            Self::Chemical => "Químico",
            Self::Biological => "Biológico",
            Self::Ergonomic => "Ergonómico",
            Self::Mechanical => "Mecánico",
            Self::Electrical => "Eléctrico",
            Self::Locational => "Locativo",
            Self::Psychosocial => "Psicosocial",
        }
    }
}

impl FromStr for HazardCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Físico" => Ok(Self::Physical),
            "Químico" => Ok(Self::Chemical),
            "Biológico" => Ok(Self::Biological),
            "Ergonómico" => Ok(Self::Ergonomic),
            "Mecánico" => Ok(Self::Mechanical),
            "Eléctrico" => Ok(Self::Electrical),
            "Locativo" => Ok(Self::Locational),
            "Psicosocial" => Ok(Self::Psychosocial),
            _ => Err(DomainError::InvalidHazardCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Implementation status of a risk's controls.
///
/// Status only moves forward: pending → mitigating → controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskStatus {
    /// Controls not yet implemented.
    #[serde(rename = "pendiente")]
    Pending,
    /// Controls being implemented.
    #[serde(rename = "en_mitigacion")]
    Mitigating,
    /// Controls in place.
    #[serde(rename = "controlado")]
    Controlled,
}

impl RiskStatus {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Mitigating => "en_mitigacion",
            Self::Controlled => "controlado",
        }
    }

    /// Checks whether moving from this status to `target` is permitted.
    ///
    /// Staying on the same status is allowed so controls text can be edited.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        target >= *self
    }
}

impl FromStr for RiskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "en_mitigacion" => Ok(Self::Mitigating),
            "controlado" => Ok(Self::Controlled),
            _ => Err(DomainError::InvalidRiskStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw risk assessment input, as collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskSubmission {
    /// Caller-assigned unique code (e.g. "RIE-GEN-01151030").
    pub code: String,
    /// The area the risk belongs to.
    pub area: Area,
    /// Workstation or job position.
    pub workstation: String,
    /// Activity or task description.
    pub activity: String,
    /// Hazard description.
    pub hazard: String,
    /// Hazard category.
    pub hazard_category: HazardCategory,
    /// Probability factor (1–5).
    pub probability: u8,
    /// Severity factor (1–5).
    pub severity: u8,
    /// Current or proposed controls.
    pub controls: String,
    /// The user responsible for implementing controls.
    pub responsible_id: i64,
    /// Initial implementation status.
    pub status: RiskStatus,
    /// Evaluation date.
    pub evaluation_date: Date,
    /// Next scheduled review.
    pub next_review: Date,
}

/// A validated risk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// The persisted identifier. `None` before insertion.
    pub risk_id: Option<i64>,
    /// Unique code.
    pub code: String,
    /// The area the risk belongs to.
    pub area: Area,
    /// Workstation or job position.
    pub workstation: String,
    /// Activity or task description.
    pub activity: String,
    /// Hazard description.
    pub hazard: String,
    /// Hazard category.
    pub hazard_category: HazardCategory,
    /// The scoring inputs.
    pub score: RiskScore,
    /// Current controls.
    pub controls: String,
    /// The user responsible for implementing controls.
    pub responsible_id: i64,
    /// Implementation status.
    pub status: RiskStatus,
    /// Evaluation date.
    pub evaluation_date: Date,
    /// Next scheduled review.
    pub next_review: Date,
}

impl RiskRecord {
    /// Returns the derived tier.
    #[must_use]
    pub const fn tier(&self) -> RiskTier {
        self.score.tier()
    }
}

/// Validates a risk submission and derives its score.
///
/// The responsible user must appear in `active_users` and be active.
///
/// # Errors
///
/// Returns an error if:
/// - code, workstation or hazard is blank (`MissingField`)
/// - probability or severity is outside `[1, 5]` (`InvalidInput`)
/// - the responsible user is not an active user (`InvalidInput`)
/// - the next review date precedes the evaluation date (`InvalidInput`)
pub fn validate_risk_submission(
    submission: RiskSubmission,
    active_users: &[Worker],
) -> Result<RiskRecord, DomainError> {
    require_non_blank("code", &submission.code)?;
    require_non_blank("workstation", &submission.workstation)?;
    require_non_blank("hazard", &submission.hazard)?;

    let score: RiskScore = RiskScore::new(submission.probability, submission.severity)?;

    let responsible_known: bool = active_users
        .iter()
        .any(|user| user.user_id == submission.responsible_id && user.is_active);
    if !responsible_known {
        return Err(DomainError::InvalidInput {
            field: "responsible_id",
            message: format!(
                "user {} is not an active user",
                submission.responsible_id
            ),
        });
    }

    if submission.next_review < submission.evaluation_date {
        return Err(DomainError::InvalidInput {
            field: "next_review",
            message: format!(
                "next review {} precedes evaluation date {}",
                submission.next_review, submission.evaluation_date
            ),
        });
    }

    Ok(RiskRecord {
        risk_id: None,
        code: submission.code.trim().to_string(),
        area: submission.area,
        workstation: submission.workstation.trim().to_string(),
        activity: submission.activity,
        hazard: submission.hazard.trim().to_string(),
        hazard_category: submission.hazard_category,
        score,
        controls: submission.controls,
        responsible_id: submission.responsible_id,
        status: submission.status,
        evaluation_date: submission.evaluation_date,
        next_review: submission.next_review,
    })
}

/// Applies a status and/or controls update to an existing risk.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if the new status would move
/// the risk backwards.
pub fn apply_risk_update(
    record: &RiskRecord,
    status: Option<RiskStatus>,
    controls: Option<String>,
) -> Result<RiskRecord, DomainError> {
    let mut updated: RiskRecord = record.clone();

    if let Some(target) = status {
        if !record.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                from: record.status.to_string(),
                to: target.to_string(),
            });
        }
        updated.status = target;
    }

    if let Some(controls) = controls {
        updated.controls = controls;
    }

    Ok(updated)
}

/// Filter applied to the risk matrix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFilter {
    /// Only risks in this area.
    pub area: Option<Area>,
    /// Only risks with this tier.
    pub tier: Option<RiskTier>,
}

impl RiskFilter {
    /// Returns whether a record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &RiskRecord) -> bool {
        self.area.as_ref().is_none_or(|area| &record.area == area)
            && self.tier.is_none_or(|tier| record.tier() == tier)
    }
}
