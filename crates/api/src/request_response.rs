// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates travel as `YYYY-MM-DD` strings and training start times as
//! `YYYY-MM-DD HH:MM:SS`.

use serde::{Deserialize, Serialize};
use sst_domain::{AreaExpiryCounts, AreaStatusCounts, HEATMAP_SIZE, PpeSummary, RiskSummary};

// ============================================================================
// Authentication & users
// ============================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The account email.
    pub email: String,
    /// The account password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    /// The user's identifier.
    pub user_id: i64,
    /// The user's display name.
    pub full_name: String,
    /// The user's role.
    pub role: String,
    /// Session expiration timestamp (RFC 3339).
    pub expires_at: String,
}

/// API response for the "who am I" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    /// The user's identifier.
    pub user_id: i64,
    /// The user's email.
    pub email: String,
    /// The user's display name.
    pub full_name: String,
    /// The user's role.
    pub role: String,
    /// The user's area, if assigned.
    pub area: Option<String>,
}

/// API request to create a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// The account email.
    pub email: String,
    /// The user's full name.
    pub full_name: String,
    /// The initial password.
    pub password: String,
    /// Password confirmation.
    pub password_confirmation: String,
    /// The role (`admin`, `sst`, `supervisor`, `gerente`, `trabajador`).
    pub role: String,
    /// The user's area.
    #[serde(default)]
    pub area: Option<String>,
}

/// API response for a created user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    /// The new user's identifier.
    pub user_id: i64,
    /// The normalized email.
    pub email: String,
    /// The user's full name.
    pub full_name: String,
    /// The role.
    pub role: String,
    /// A success message.
    pub message: String,
}

/// Summary of an active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    /// The user's identifier.
    pub user_id: i64,
    /// The user's full name.
    pub full_name: String,
    /// The user's area.
    pub area: Option<String>,
    /// The user's role.
    pub role: String,
}

/// API response listing active users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWorkersResponse {
    /// Active users ordered by name.
    pub workers: Vec<WorkerInfo>,
}

/// API request to add an area to the master list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAreaRequest {
    /// The area name.
    pub name: String,
}

/// API response for a created area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAreaResponse {
    /// The area's identifier.
    pub area_id: i64,
    /// The area name.
    pub name: String,
}

/// API response listing the area master list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAreasResponse {
    /// Area names in alphabetical order.
    pub areas: Vec<String>,
}

// ============================================================================
// Risks
// ============================================================================

/// API request to register a risk in the IPERC matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRiskRequest {
    /// Caller-assigned unique code.
    pub code: String,
    /// The area.
    pub area: String,
    /// Workstation or job position.
    pub workstation: String,
    /// Activity or task.
    #[serde(default)]
    pub activity: String,
    /// Hazard description.
    pub hazard: String,
    /// Hazard category (e.g. `Mecánico`).
    pub hazard_category: String,
    /// Probability (1–5).
    pub probability: u8,
    /// Severity (1–5).
    pub severity: u8,
    /// Current or proposed controls.
    #[serde(default)]
    pub controls: String,
    /// The user responsible for implementing controls.
    pub responsible_id: i64,
    /// Initial status; defaults to `pendiente`.
    #[serde(default)]
    pub status: Option<String>,
    /// Evaluation date.
    pub evaluation_date: String,
    /// Next review date; defaults to one year after evaluation.
    #[serde(default)]
    pub next_review: Option<String>,
}

/// A risk as returned by the API, with its derived score and tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskInfo {
    /// The risk's identifier.
    pub risk_id: i64,
    /// Unique code.
    pub code: String,
    /// The area.
    pub area: String,
    /// Workstation.
    pub workstation: String,
    /// Activity.
    pub activity: String,
    /// Hazard.
    pub hazard: String,
    /// Hazard category.
    pub hazard_category: String,
    /// Probability.
    pub probability: u8,
    /// Severity.
    pub severity: u8,
    /// Probability × severity.
    pub score: u8,
    /// Tier label.
    pub tier: String,
    /// Controls.
    pub controls: String,
    /// Responsible user.
    pub responsible_id: i64,
    /// Status.
    pub status: String,
    /// Evaluation date.
    pub evaluation_date: String,
    /// Next review date.
    pub next_review: String,
}

/// API response for a created or updated risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskResponse {
    /// The risk.
    pub risk: RiskInfo,
    /// A success message.
    pub message: String,
}

/// Filters for the risk matrix listing and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRisksRequest {
    /// Only risks in this area.
    #[serde(default)]
    pub area: Option<String>,
    /// Only risks in this tier (`low`, `medium`, `high` or the label).
    #[serde(default)]
    pub tier: Option<String>,
}

/// API response listing risks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRisksResponse {
    /// Matching risks.
    pub risks: Vec<RiskInfo>,
}

/// API request to update a risk's status and/or controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRiskRequest {
    /// New status.
    #[serde(default)]
    pub status: Option<String>,
    /// New controls.
    #[serde(default)]
    pub controls: Option<String>,
}

/// API response for the risk dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskDashboardResponse {
    /// Headline KPIs.
    pub summary: RiskSummary,
    /// Counts indexed `[probability - 1][severity - 1]`.
    pub heatmap: [[usize; HEATMAP_SIZE]; HEATMAP_SIZE],
    /// Status counts per area.
    pub status_by_area: Vec<AreaStatusCounts>,
}

// ============================================================================
// Trainings
// ============================================================================

/// API request to schedule a training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTrainingRequest {
    /// Unique code.
    pub code: String,
    /// Topic.
    pub topic: String,
    /// Target areas; empty means every area.
    #[serde(default)]
    pub target_areas: Vec<String>,
    /// Start time (`YYYY-MM-DD HH:MM:SS`).
    pub scheduled_at: String,
    /// Duration in hours.
    pub duration_hours: u8,
    /// Instructor name.
    #[serde(default)]
    pub instructor: String,
}

/// A training as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingInfo {
    /// The training's identifier.
    pub training_id: i64,
    /// Unique code.
    pub code: String,
    /// Topic.
    pub topic: String,
    /// Target areas.
    pub target_areas: Vec<String>,
    /// Start time.
    pub scheduled_at: String,
    /// Duration in hours.
    pub duration_hours: u8,
    /// Instructor.
    pub instructor: String,
    /// Status.
    pub status: String,
}

/// Notification sent to the automation webhook when a training is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingScheduledEvent {
    /// The training's identifier.
    pub capacitacion_id: i64,
    /// The training code.
    pub codigo: String,
    /// The topic.
    pub tema: String,
    /// The start time, ISO 8601 (`YYYY-MM-DDTHH:MM:SS`).
    pub fecha: String,
    /// Target areas, comma separated.
    pub area: String,
}

/// API response for a scheduled training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTrainingResponse {
    /// The training.
    pub training: TrainingInfo,
    /// A success message.
    pub message: String,
    /// Non-fatal problems, such as a failed notification.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Filters for the training listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTrainingsRequest {
    /// Only trainings with this status (`programada`, `realizada`).
    #[serde(default)]
    pub status: Option<String>,
}

/// API response listing trainings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTrainingsResponse {
    /// Trainings, most recent first.
    pub trainings: Vec<TrainingInfo>,
}

/// A roster entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntryInfo {
    /// The entry's identifier.
    pub attendance_id: i64,
    /// The worker.
    pub worker_id: i64,
    /// The worker's name.
    pub full_name: String,
    /// The worker's area.
    pub area: Option<String>,
    /// Whether the worker attended.
    pub attended: bool,
    /// Rating (1–5), once recorded.
    pub rating: Option<u8>,
    /// Feedback, once recorded.
    pub feedback: Option<String>,
}

/// A training material link as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// The link's identifier.
    pub material_id: i64,
    /// The training.
    pub training_id: i64,
    /// Material kind.
    pub kind: String,
    /// Description.
    pub description: String,
    /// URL.
    pub url: String,
    /// Uploader.
    pub uploaded_by: i64,
}

/// API response for a training with its roster and materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingDetailResponse {
    /// The training.
    pub training: TrainingInfo,
    /// Roster ordered by worker name.
    pub roster: Vec<RosterEntryInfo>,
    /// Material links.
    pub materials: Vec<MaterialInfo>,
}

/// API request to add workers to a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAttendeesRequest {
    /// Worker identifiers.
    pub worker_ids: Vec<i64>,
}

/// API response for roster additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAttendeesResponse {
    /// Number of workers newly added.
    pub added: usize,
    /// Roster size after the operation.
    pub roster_size: usize,
}

/// API request to record a worker's attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttendanceRequest {
    /// Whether the worker attended.
    pub attended: bool,
    /// Rating (1–5).
    pub rating: u8,
    /// Feedback.
    #[serde(default)]
    pub feedback: String,
}

/// A stored attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceInfo {
    /// The entry's identifier.
    pub attendance_id: i64,
    /// The training.
    pub training_id: i64,
    /// The worker.
    pub worker_id: i64,
    /// Whether the worker attended.
    pub attended: bool,
    /// Rating.
    pub rating: Option<u8>,
    /// Feedback.
    pub feedback: Option<String>,
}

/// API request to add a material link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMaterialRequest {
    /// Material kind (e.g. `Guía`).
    pub kind: String,
    /// Description; defaults when blank.
    #[serde(default)]
    pub description: String,
    /// URL.
    pub url: String,
}

/// API response listing material links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMaterialsResponse {
    /// Material links.
    pub materials: Vec<MaterialInfo>,
}

/// API request to submit a post-training survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitSurveyRequest {
    /// The worker answering; defaults to the caller.
    #[serde(default)]
    pub worker_id: Option<i64>,
    /// Rating (1–5).
    pub rating: u8,
    /// Comments.
    #[serde(default)]
    pub comments: String,
}

/// A stored survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyInfo {
    /// The survey's identifier.
    pub survey_id: i64,
    /// The training.
    pub training_id: i64,
    /// The worker.
    pub worker_id: i64,
    /// Rating.
    pub rating: u8,
    /// Comments.
    pub comments: Option<String>,
    /// Submission time (RFC 3339).
    pub submitted_at: String,
}

/// API response for a survey lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyLookupResponse {
    /// `completed` or `pending`.
    pub status: String,
    /// The survey, when completed.
    pub survey: Option<SurveyInfo>,
}

/// Effectiveness of one held training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEffectivenessInfo {
    /// Code.
    pub code: String,
    /// Topic.
    pub topic: String,
    /// Date held.
    pub date: String,
    /// Workers invited.
    pub invited: usize,
    /// Workers who attended.
    pub attended: usize,
    /// Attended / invited.
    pub attendance_rate: f64,
    /// Surveys received.
    pub survey_count: usize,
    /// Mean survey rating.
    pub mean_rating: Option<f64>,
}

/// API response for the training effectiveness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessResponse {
    /// Number of held trainings.
    pub total_trainings: usize,
    /// Total attended.
    pub total_attended: usize,
    /// Total invited.
    pub total_invited: usize,
    /// Global attendance rate.
    pub global_attendance_rate: f64,
    /// Mean of per-training mean ratings.
    pub global_satisfaction: f64,
    /// Per-training rows.
    pub trainings: Vec<TrainingEffectivenessInfo>,
}

// ============================================================================
// PPE
// ============================================================================

/// API request to add a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCatalogItemRequest {
    /// Item name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Certification standard.
    #[serde(default)]
    pub certification: String,
    /// Lifespan in months; defaults to 12.
    #[serde(default)]
    pub lifespan_months: Option<u16>,
}

/// A catalog item as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemInfo {
    /// The item's identifier.
    pub item_id: i64,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Certification.
    pub certification: String,
    /// Lifespan in months.
    pub lifespan_months: u16,
}

/// API response listing the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCatalogResponse {
    /// Catalog items.
    pub items: Vec<CatalogItemInfo>,
}

/// API request to assign PPE to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    /// The catalog item.
    pub item_id: i64,
    /// The worker.
    pub worker_id: i64,
    /// Issue date.
    pub issue_date: String,
    /// Expiry override; defaults to the lifespan rule.
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// An assignment as returned by the API, with its derived tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    /// The assignment's identifier.
    pub assignment_id: i64,
    /// The catalog item.
    pub item_id: i64,
    /// The item name.
    pub item_name: String,
    /// The worker.
    pub worker_id: i64,
    /// The worker's name.
    pub worker_name: String,
    /// The worker's area.
    pub worker_area: Option<String>,
    /// Issue date.
    pub issue_date: String,
    /// Expiry date.
    pub expiry_date: String,
    /// Expiry tier label.
    pub tier: String,
}

/// Filters for the assignment listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAssignmentsRequest {
    /// Only assignments in this tier (`expired`, `expiring_soon`, `current`).
    #[serde(default)]
    pub tier: Option<String>,
}

/// API response listing assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAssignmentsResponse {
    /// Assignments, newest issue first.
    pub assignments: Vec<AssignmentInfo>,
}

/// API response for the PPE dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PpeDashboardResponse {
    /// Headline KPIs.
    pub summary: PpeSummary,
    /// Expiry tier counts per worker area, in first-seen order.
    pub by_area: Vec<AreaExpiryCounts>,
}

// ============================================================================
// Exports
// ============================================================================

/// A rendered CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested download file name.
    pub file_name: String,
    /// UTF-8 CSV content, header row first.
    pub content: String,
}
