// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the workplace safety system.
//!
//! Handlers here are transport-agnostic: they take the store, the
//! authenticated caller and a request DTO, enforce role gates, run the
//! domain rules, and return response DTOs or an [`ApiError`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod csv_export;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use csv_export::{
    ATTENDEE_HEADERS, EFFECTIVENESS_HEADERS, RISK_MATRIX_HEADERS, attendees_csv,
    effectiveness_csv, risk_matrix_csv,
};
pub use error::{ApiError, AuthError, translate_domain_error};
pub use handlers::{
    add_attendees, add_material, create_area, create_assignment, create_catalog_item,
    create_risk, create_user, delete_material, export_attendees, export_effectiveness,
    export_risk_matrix, get_training_detail, list_areas, list_assignments, list_candidates,
    list_catalog, list_materials, list_risks, list_trainings, list_workers, login, logout,
    lookup_survey, mark_training_held, ppe_dashboard, record_attendance, risk_dashboard,
    schedule_training, submit_survey, training_effectiveness, update_risk, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AddAttendeesRequest, AddAttendeesResponse, AddMaterialRequest, AssignmentInfo,
    AttendanceInfo, CatalogItemInfo, CreateAreaRequest, CreateAreaResponse,
    CreateAssignmentRequest, CreateCatalogItemRequest, CreateRiskRequest, CreateTrainingRequest,
    CreateTrainingResponse, CreateUserRequest, CreateUserResponse, CsvExport,
    EffectivenessResponse, ListAreasResponse, ListAssignmentsRequest, ListAssignmentsResponse,
    ListCatalogResponse, ListMaterialsResponse, ListRisksRequest, ListRisksResponse,
    ListTrainingsRequest, ListTrainingsResponse, ListWorkersResponse, LoginRequest,
    LoginResponse, MaterialInfo, PpeDashboardResponse, RecordAttendanceRequest,
    RiskDashboardResponse, RiskInfo, RiskResponse, RosterEntryInfo, SubmitSurveyRequest,
    SurveyInfo, SurveyLookupResponse, TrainingDetailResponse, TrainingEffectivenessInfo,
    TrainingInfo, TrainingScheduledEvent, UpdateRiskRequest, WhoAmIResponse, WorkerInfo,
};
