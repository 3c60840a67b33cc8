// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use sst_domain::DomainError;
use sst_persistence::PersistenceError;

use crate::password_policy::PasswordPolicyError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The roles allowed to perform the action.
        required_role: String,
    },
    /// The store failed while authenticating.
    StorageError {
        /// A description of the failure.
        message: String,
    },
    /// Session bookkeeping failed for a reason unrelated to the caller.
    Internal {
        /// A description of the failure.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::StorageError { message } => write!(f, "Storage error: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. The server maps each variant to an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role does not permit the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The roles allowed to perform the action.
        required_role: String,
    },
    /// The actor may not access another user's data.
    Forbidden {
        /// A human-readable description.
        message: String,
    },
    /// The worker is not eligible for the requested operation.
    NotEligible {
        /// Why the worker is not eligible.
        message: String,
    },
    /// A required field was empty.
    MissingField {
        /// The missing field.
        field: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The store failed.
    StorageError {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { message } => write!(f, "Forbidden: {message}"),
            Self::NotEligible { message } => write!(f, "Not eligible: {message}"),
            Self::MissingField { field } => write!(f, "Missing required field '{field}'"),
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::StorageError { message } => write!(f, "Storage error: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::StorageError { message } => Self::StorageError { message },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::UniqueViolation(message) => Self::DomainRuleViolation {
                rule: String::from("unique"),
                message,
            },
            PersistenceError::NotFound(message) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message,
            },
            other => Self::StorageError {
                message: other.to_string(),
            },
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::MissingField { field } => ApiError::MissingField {
            field: field.to_string(),
        },
        DomainError::InvalidInput { field, message } => ApiError::InvalidInput {
            field: field.to_string(),
            message,
        },
        DomainError::DuplicateCode { entity, code } => ApiError::DomainRuleViolation {
            rule: format!("unique_{entity}_code"),
            message: format!("A {entity} with code '{code}' already exists"),
        },
        DomainError::NotEligible { reason } => ApiError::NotEligible { message: reason },
        DomainError::Forbidden {
            viewer_id,
            worker_id,
        } => ApiError::Forbidden {
            message: format!("User {viewer_id} may not access data of worker {worker_id}"),
        },
        DomainError::TrainingNotScheduled { code } => ApiError::DomainRuleViolation {
            rule: String::from("training_scheduled"),
            message: format!("Training '{code}' is no longer scheduled; its roster is closed"),
        },
        DomainError::AttendanceNotOpen { code, opens_on } => ApiError::DomainRuleViolation {
            rule: String::from("attendance_open"),
            message: format!("Attendance for training '{code}' can be recorded from {opens_on}"),
        },
        DomainError::InvalidTransition { from, to } => ApiError::DomainRuleViolation {
            rule: String::from("forward_transition"),
            message: format!("Cannot transition from '{from}' to '{to}'"),
        },
        DomainError::DuplicateSurvey {
            training_id,
            worker_id,
        } => ApiError::DomainRuleViolation {
            rule: String::from("single_survey"),
            message: format!(
                "Worker {worker_id} already submitted a survey for training {training_id}"
            ),
        },
        DomainError::DateArithmeticOverflow { operation } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Date arithmetic overflow while {operation}"),
        },
        DomainError::InvalidHazardCategory(value) => ApiError::InvalidInput {
            field: String::from("hazard_category"),
            message: format!("Unknown hazard category '{value}'"),
        },
        DomainError::InvalidRiskStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown risk status '{value}'"),
        },
        DomainError::InvalidTrainingStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown training status '{value}'"),
        },
        DomainError::InvalidRole(value) => ApiError::InvalidInput {
            field: String::from("role"),
            message: format!("Unknown role '{value}'"),
        },
        DomainError::InvalidMaterialKind(value) => ApiError::InvalidInput {
            field: String::from("kind"),
            message: format!("Unknown material kind '{value}'"),
        },
    }
}
