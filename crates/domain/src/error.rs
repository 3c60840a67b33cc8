// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is empty or blank.
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },
    /// A value is outside its allowed domain.
    InvalidInput {
        /// The field that was invalid.
        field: &'static str,
        /// A human-readable description of the problem.
        message: String,
    },
    /// A record code is already in use.
    DuplicateCode {
        /// The kind of record (e.g. "risk", "training").
        entity: &'static str,
        /// The duplicate code.
        code: String,
    },
    /// The worker is not eligible for the requested survey operation.
    NotEligible {
        /// Why the worker is not eligible.
        reason: String,
    },
    /// The viewer may not access another worker's data.
    Forbidden {
        /// The viewer's user id.
        viewer_id: i64,
        /// The worker id that was requested.
        worker_id: i64,
    },
    /// The roster of a training can only change while it is scheduled.
    TrainingNotScheduled {
        /// The training code.
        code: String,
    },
    /// Attendance cannot be recorded before the training date.
    AttendanceNotOpen {
        /// The training code.
        code: String,
        /// The first date on which attendance may be recorded.
        opens_on: time::Date,
    },
    /// A status transition is not permitted.
    InvalidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// A survey already exists for the training and worker.
    DuplicateSurvey {
        /// The training id.
        training_id: i64,
        /// The worker id.
        worker_id: i64,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Hazard category string is not recognized.
    InvalidHazardCategory(String),
    /// Risk status string is not recognized.
    InvalidRiskStatus(String),
    /// Training status string is not recognized.
    InvalidTrainingStatus(String),
    /// Role string is not recognized.
    InvalidRole(String),
    /// Material kind string is not recognized.
    InvalidMaterialKind(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "Missing required field: {field}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::DuplicateCode { entity, code } => {
                write!(f, "A {entity} with code '{code}' already exists")
            }
            Self::NotEligible { reason } => write!(f, "Not eligible: {reason}"),
            Self::Forbidden {
                viewer_id,
                worker_id,
            } => {
                write!(
                    f,
                    "User {viewer_id} may not view survey data for worker {worker_id}"
                )
            }
            Self::TrainingNotScheduled { code } => {
                write!(
                    f,
                    "Training '{code}' is no longer scheduled; its roster is closed"
                )
            }
            Self::AttendanceNotOpen { code, opens_on } => {
                write!(
                    f,
                    "Attendance for training '{code}' can be recorded from {opens_on}"
                )
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "Cannot transition from '{from}' to '{to}'")
            }
            Self::DuplicateSurvey {
                training_id,
                worker_id,
            } => {
                write!(
                    f,
                    "Worker {worker_id} already submitted a survey for training {training_id}"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidHazardCategory(s) => write!(f, "Invalid hazard category: {s}"),
            Self::InvalidRiskStatus(s) => write!(f, "Invalid risk status: {s}"),
            Self::InvalidTrainingStatus(s) => write!(f, "Invalid training status: {s}"),
            Self::InvalidRole(s) => write!(f, "Invalid role: {s}"),
            Self::InvalidMaterialKind(s) => write!(f, "Invalid material kind: {s}"),
        }
    }
}

impl std::error::Error for DomainError {}
