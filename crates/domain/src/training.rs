// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Training lifecycle rules.
//!
//! A training is created `Scheduled`, collects its roster while scheduled,
//! opens attendance recording on its scheduled date, and becomes `Held`
//! once an operator marks it as such. Surveys are only meaningful for
//! attendees of held trainings.

use crate::error::DomainError;
use crate::types::{Area, Role, Viewer, Worker};
use crate::validation::{require_non_blank, validate_scale};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Description stored for material links submitted without one.
pub const DEFAULT_MATERIAL_DESCRIPTION: &str = "Material externo";

/// Lifecycle state of a training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingStatus {
    /// Scheduled; roster open.
    #[serde(rename = "programada")]
    Scheduled,
    /// The session took place.
    #[serde(rename = "realizada")]
    Held,
}

impl TrainingStatus {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "programada",
            Self::Held => "realizada",
        }
    }

    /// Checks if a transition from this state to another is valid.
    ///
    /// The only valid transition is Scheduled → Held.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Scheduled, Self::Held))
    }
}

impl FromStr for TrainingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "programada" => Ok(Self::Scheduled),
            "realizada" => Ok(Self::Held),
            _ => Err(DomainError::InvalidTrainingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for scheduling a training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTrainingRequest {
    /// Unique code (e.g. "CAP-20260115").
    pub code: String,
    /// Topic.
    pub topic: String,
    /// Target areas; empty means every area.
    pub target_areas: Vec<Area>,
    /// Scheduled date and time.
    pub scheduled_at: PrimitiveDateTime,
    /// Duration in whole hours.
    pub duration_hours: u8,
    /// Instructor name.
    pub instructor: String,
}

/// A training session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    /// The persisted identifier. `None` before insertion.
    pub training_id: Option<i64>,
    /// Unique code.
    pub code: String,
    /// Topic.
    pub topic: String,
    /// Target areas, in the order given, without duplicates.
    pub target_areas: Vec<Area>,
    /// Scheduled date and time.
    pub scheduled_at: PrimitiveDateTime,
    /// Duration in whole hours.
    pub duration_hours: u8,
    /// Instructor name.
    pub instructor: String,
    /// Lifecycle state.
    pub status: TrainingStatus,
}

impl Training {
    /// Returns the calendar date of the session.
    #[must_use]
    pub const fn scheduled_date(&self) -> Date {
        self.scheduled_at.date()
    }

    fn persisted_id(&self) -> Result<i64, DomainError> {
        self.training_id.ok_or_else(|| DomainError::InvalidInput {
            field: "training_id",
            message: format!("training '{}' has not been persisted", self.code),
        })
    }
}

/// Validates a scheduling request and produces a `Scheduled` training.
///
/// # Errors
///
/// Returns an error if:
/// - code or topic is blank (`MissingField`)
/// - duration is zero (`InvalidInput`)
pub fn schedule_training(request: ScheduleTrainingRequest) -> Result<Training, DomainError> {
    require_non_blank("code", &request.code)?;
    require_non_blank("topic", &request.topic)?;

    if request.duration_hours == 0 {
        return Err(DomainError::InvalidInput {
            field: "duration_hours",
            message: String::from("duration must be at least 1 hour"),
        });
    }

    let mut seen: HashSet<Area> = HashSet::new();
    let target_areas: Vec<Area> = request
        .target_areas
        .into_iter()
        .filter(|area| !area.name().is_empty() && seen.insert(area.clone()))
        .collect();

    Ok(Training {
        training_id: None,
        code: request.code.trim().to_string(),
        topic: request.topic.trim().to_string(),
        target_areas,
        scheduled_at: request.scheduled_at,
        duration_hours: request.duration_hours,
        instructor: request.instructor.trim().to_string(),
        status: TrainingStatus::Scheduled,
    })
}

/// Marks a scheduled training as held.
///
/// # Errors
///
/// Returns an error if:
/// - the training is not scheduled (`InvalidTransition`)
/// - the scheduled date is still in the future (`AttendanceNotOpen`)
pub fn mark_training_held(training: &Training, today: Date) -> Result<Training, DomainError> {
    if !training.status.can_transition_to(TrainingStatus::Held) {
        return Err(DomainError::InvalidTransition {
            from: training.status.to_string(),
            to: TrainingStatus::Held.to_string(),
        });
    }

    if !is_attendance_open(training, today) {
        return Err(DomainError::AttendanceNotOpen {
            code: training.code.clone(),
            opens_on: training.scheduled_date(),
        });
    }

    let mut held: Training = training.clone();
    held.status = TrainingStatus::Held;
    Ok(held)
}

/// A worker's place on a training roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// The persisted identifier. `None` before insertion.
    pub attendance_id: Option<i64>,
    /// The training.
    pub training_id: i64,
    /// The invited worker.
    pub worker_id: i64,
    /// Whether the worker attended.
    pub attended: bool,
    /// Rating given on the day (1–5).
    pub rating: Option<u8>,
    /// Free-text feedback.
    pub feedback: Option<String>,
}

impl Attendance {
    /// Creates a fresh roster entry (not yet attended).
    #[must_use]
    pub const fn invited(training_id: i64, worker_id: i64) -> Self {
        Self {
            attendance_id: None,
            training_id,
            worker_id,
            attended: false,
            rating: None,
            feedback: None,
        }
    }
}

/// Builds the roster entries to insert for a set of workers.
///
/// Workers already on the roster, and repeats within `worker_ids`, are
/// skipped, so calling this twice with the same ids adds nothing the second
/// time.
///
/// # Errors
///
/// Returns an error if:
/// - the training is not scheduled (`TrainingNotScheduled`)
/// - the training has not been persisted (`InvalidInput`)
pub fn add_attendees(
    training: &Training,
    existing: &[Attendance],
    worker_ids: &[i64],
) -> Result<Vec<Attendance>, DomainError> {
    if training.status != TrainingStatus::Scheduled {
        return Err(DomainError::TrainingNotScheduled {
            code: training.code.clone(),
        });
    }
    let training_id: i64 = training.persisted_id()?;

    let mut present: HashSet<i64> = existing
        .iter()
        .filter(|a| a.training_id == training_id)
        .map(|a| a.worker_id)
        .collect();

    Ok(worker_ids
        .iter()
        .filter(|worker_id| present.insert(**worker_id))
        .map(|worker_id| Attendance::invited(training_id, *worker_id))
        .collect())
}

/// Returns whether attendance may be recorded for the training.
///
/// Only the date is compared; the time of day is ignored.
#[must_use]
pub fn is_attendance_open(training: &Training, today: Date) -> bool {
    today >= training.scheduled_date()
}

/// Attendance details captured on or after the training date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceUpdate {
    /// Whether the worker attended.
    pub attended: bool,
    /// Rating (1–5).
    pub rating: u8,
    /// Feedback; blank means none.
    pub feedback: String,
}

/// Applies an attendance update to a roster entry.
///
/// # Errors
///
/// Returns an error if:
/// - the entry belongs to another training (`InvalidInput`)
/// - the rating is outside `[1, 5]` (`InvalidInput`)
/// - today is before the training date (`AttendanceNotOpen`)
pub fn record_attendance(
    training: &Training,
    attendance: &Attendance,
    update: AttendanceUpdate,
    today: Date,
) -> Result<Attendance, DomainError> {
    if training.training_id != Some(attendance.training_id) {
        return Err(DomainError::InvalidInput {
            field: "attendance_id",
            message: format!(
                "attendance entry does not belong to training '{}'",
                training.code
            ),
        });
    }

    validate_scale("rating", update.rating)?;

    if !is_attendance_open(training, today) {
        return Err(DomainError::AttendanceNotOpen {
            code: training.code.clone(),
            opens_on: training.scheduled_date(),
        });
    }

    let feedback: Option<String> = if update.feedback.trim().is_empty() {
        None
    } else {
        Some(update.feedback)
    };

    Ok(Attendance {
        attended: update.attended,
        rating: Some(update.rating),
        feedback,
        ..attendance.clone()
    })
}

/// Suggests workers to invite to a training.
///
/// Only active, non-admin users are considered. If the training targets
/// specific areas, only workers in those areas are returned.
#[must_use]
pub fn candidate_attendees<'a>(training: &Training, workers: &'a [Worker]) -> Vec<&'a Worker> {
    workers
        .iter()
        .filter(|w| w.is_active && w.role != Role::Admin)
        .filter(|w| {
            training.target_areas.is_empty()
                || w.area
                    .as_ref()
                    .is_some_and(|area| training.target_areas.contains(area))
        })
        .collect()
}

/// A post-training satisfaction survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    /// The persisted identifier. `None` before insertion.
    pub survey_id: Option<i64>,
    /// The training.
    pub training_id: i64,
    /// The responding worker.
    pub worker_id: i64,
    /// Rating (1–5).
    pub rating: u8,
    /// Optional comments.
    pub comments: Option<String>,
    /// When the survey was submitted.
    pub submitted_at: OffsetDateTime,
}

/// Result of looking up a worker's survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyLookup {
    /// The worker answered the survey.
    Completed(Survey),
    /// The worker attended but has not answered yet.
    Pending,
}

/// Checks that `viewer` may act on `worker_id`'s survey data.
///
/// Supervisor-class roles may act on any worker; everyone else only on
/// themselves.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` otherwise.
pub const fn authorize_survey_viewer(viewer: &Viewer, worker_id: i64) -> Result<(), DomainError> {
    if !viewer.role.is_supervisor() && viewer.user_id != worker_id {
        return Err(DomainError::Forbidden {
            viewer_id: viewer.user_id,
            worker_id,
        });
    }
    Ok(())
}

fn check_survey_eligibility(
    training: &Training,
    attendances: &[Attendance],
    worker_id: i64,
) -> Result<i64, DomainError> {
    let training_id: i64 = training.persisted_id()?;

    if training.status != TrainingStatus::Held {
        return Err(DomainError::NotEligible {
            reason: format!("training '{}' has not been held", training.code),
        });
    }

    let attended: bool = attendances
        .iter()
        .any(|a| a.training_id == training_id && a.worker_id == worker_id && a.attended);
    if !attended {
        return Err(DomainError::NotEligible {
            reason: format!(
                "worker {worker_id} has no confirmed attendance for training '{}'",
                training.code
            ),
        });
    }

    Ok(training_id)
}

/// Looks up a worker's survey for a training.
///
/// # Errors
///
/// Returns an error if:
/// - the viewer may not see this worker's data (`Forbidden`)
/// - the training is not held, or the worker did not attend (`NotEligible`)
pub fn lookup_survey(
    viewer: &Viewer,
    training: &Training,
    attendances: &[Attendance],
    surveys: &[Survey],
    worker_id: i64,
) -> Result<SurveyLookup, DomainError> {
    authorize_survey_viewer(viewer, worker_id)?;
    let training_id: i64 = check_survey_eligibility(training, attendances, worker_id)?;

    Ok(surveys
        .iter()
        .find(|s| s.training_id == training_id && s.worker_id == worker_id)
        .map_or(SurveyLookup::Pending, |s| SurveyLookup::Completed(s.clone())))
}

/// Survey answers as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveySubmission {
    /// Rating (1–5).
    pub rating: u8,
    /// Comments; blank means none.
    pub comments: String,
}

/// Validates a survey submission.
///
/// # Errors
///
/// Returns an error if:
/// - the viewer may not act for this worker (`Forbidden`)
/// - the training is not held, or the worker did not attend (`NotEligible`)
/// - a survey already exists for this pair (`DuplicateSurvey`)
/// - the rating is outside `[1, 5]` (`InvalidInput`)
pub fn submit_survey(
    viewer: &Viewer,
    training: &Training,
    attendances: &[Attendance],
    existing: &[Survey],
    worker_id: i64,
    submission: SurveySubmission,
    submitted_at: OffsetDateTime,
) -> Result<Survey, DomainError> {
    authorize_survey_viewer(viewer, worker_id)?;
    let training_id: i64 = check_survey_eligibility(training, attendances, worker_id)?;

    if existing
        .iter()
        .any(|s| s.training_id == training_id && s.worker_id == worker_id)
    {
        return Err(DomainError::DuplicateSurvey {
            training_id,
            worker_id,
        });
    }

    validate_scale("rating", submission.rating)?;

    let comments: Option<String> = if submission.comments.trim().is_empty() {
        None
    } else {
        Some(submission.comments)
    };

    Ok(Survey {
        survey_id: None,
        training_id,
        worker_id,
        rating: submission.rating,
        comments,
        submitted_at,
    })
}

/// Kind of training material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Slide deck.
    #[serde(rename = "Presentación")]
    Presentation,
    /// Written guide.
    #[serde(rename = "Guía")]
    Guide,
    /// Quiz or assessment.
    #[serde(rename = "Evaluación")]
    Assessment,
    /// Video.
    #[serde(rename = "Video")]
    Video,
    /// Anything else.
    #[serde(rename = "Otros")]
    Other,
}

impl MaterialKind {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Presentation => "Presentación",
            Self::Guide => "Guía",
            Self::Assessment => "Evaluación",
            Self::Video => "Video",
            Self::Other => "Otros",
        }
    }
}

impl FromStr for MaterialKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Presentación" => Ok(Self::Presentation),
            "Guía" => Ok(Self::Guide),
            "Evaluación" => Ok(Self::Assessment),
            "Video" => Ok(Self::Video),
            "Otros" => Ok(Self::Other),
            _ => Err(DomainError::InvalidMaterialKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A link to externally hosted training material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLink {
    /// The persisted identifier. `None` before insertion.
    pub material_id: Option<i64>,
    /// The training.
    pub training_id: i64,
    /// Material kind.
    pub kind: MaterialKind,
    /// Description.
    pub description: String,
    /// External URL.
    pub url: String,
    /// The user who added the link.
    pub uploaded_by: i64,
}

/// Validates a new material link.
///
/// A blank description is replaced by [`DEFAULT_MATERIAL_DESCRIPTION`].
///
/// # Errors
///
/// Returns `DomainError::MissingField` if the URL is blank.
pub fn new_material_link(
    training_id: i64,
    kind: MaterialKind,
    description: &str,
    url: &str,
    uploaded_by: i64,
) -> Result<MaterialLink, DomainError> {
    require_non_blank("url", url)?;

    let description: String = if description.trim().is_empty() {
        String::from(DEFAULT_MATERIAL_DESCRIPTION)
    } else {
        description.trim().to_string()
    };

    Ok(MaterialLink {
        material_id: None,
        training_id,
        kind,
        description,
        url: url.trim().to_string(),
        uploaded_by,
    })
}
