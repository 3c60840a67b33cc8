// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler receives the caller as an explicit `AuthenticatedActor`,
//! checks the role gate first, then runs the domain rules before touching
//! the store. Clock readings (`today`, `now`) are parameters so behavior
//! is reproducible.

use sst_domain::{
    Area, Attendance, AttendanceUpdate, EffectivenessReport, ExpiryTier, HazardCategory,
    MaterialKind, MaterialLink, PpeAssignment, PpeCatalogItem, RiskFilter, RiskRecord,
    RiskStatus, RiskSubmission, RiskTier, Role, ScheduleTrainingRequest, Survey, SurveyLookup,
    SurveySubmission, Training, TrainingStatus, Worker, DEFAULT_LIFESPAN_MONTHS,
    build_assignment, candidate_attendees, ppe_tier_by_area, require_non_blank, risk_heatmap,
    status_by_area, summarize_ppe, summarize_risks, summarize_training_effectiveness,
    validate_code_unique, validate_risk_submission,
};
use sst_persistence::{
    AssignmentDetail, DATE_FORMAT, DATETIME_FORMAT, Persistence, RosterEntry, UserData,
};
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::csv_export::{attendees_csv, effectiveness_csv, risk_matrix_csv};
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
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

/// Days between an evaluation and its default next review.
const DEFAULT_REVIEW_INTERVAL_DAYS: i64 = 365;

// ============================================================================
// Parsing & conversion helpers
// ============================================================================

fn parse_date_field(field: &str, raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw.trim(), DATE_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Expected YYYY-MM-DD, got '{raw}': {e}"),
    })
}

fn parse_datetime_field(field: &str, raw: &str) -> Result<PrimitiveDateTime, ApiError> {
    PrimitiveDateTime::parse(raw.trim(), DATETIME_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Expected YYYY-MM-DD HH:MM:SS, got '{raw}': {e}"),
    })
}

fn format_datetime(value: PrimitiveDateTime) -> Result<String, ApiError> {
    value.format(DATETIME_FORMAT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format date-time: {e}"),
    })
}

/// ISO 8601 local date-time used in webhook payloads.
const EVENT_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

fn format_event_datetime(value: PrimitiveDateTime) -> Result<String, ApiError> {
    value.format(EVENT_DATETIME_FORMAT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format event date-time: {e}"),
    })
}

fn compact_date(today: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        today.year(),
        u8::from(today.month()),
        today.day()
    )
}

fn parse_risk_tier(raw: &str) -> Result<RiskTier, ApiError> {
    match raw.trim().to_lowercase().as_str() {
        "low" | "bajo" | "riesgo bajo" => Ok(RiskTier::Low),
        "medium" | "medio" | "riesgo medio" => Ok(RiskTier::Medium),
        "high" | "alto" | "riesgo alto" => Ok(RiskTier::High),
        _ => Err(ApiError::InvalidInput {
            field: String::from("tier"),
            message: format!("Unknown risk tier '{raw}'"),
        }),
    }
}

fn parse_expiry_tier(raw: &str) -> Result<ExpiryTier, ApiError> {
    match raw.trim().to_lowercase().as_str() {
        "expired" | "vencido" => Ok(ExpiryTier::Expired),
        "expiring_soon" | "por_vencer" => Ok(ExpiryTier::ExpiringSoon),
        "current" | "vigente" => Ok(ExpiryTier::Current),
        _ => Err(ApiError::InvalidInput {
            field: String::from("tier"),
            message: format!("Unknown expiry tier '{raw}'"),
        }),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn persisted(id: Option<i64>, what: &str) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::Internal {
        message: format!("{what} has no identifier"),
    })
}

fn not_found(resource_type: &str, id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: format!("{resource_type} with ID {id} does not exist"),
    }
}

fn risk_info(record: &RiskRecord) -> Result<RiskInfo, ApiError> {
    Ok(RiskInfo {
        risk_id: persisted(record.risk_id, "Risk")?,
        code: record.code.clone(),
        area: record.area.name().to_string(),
        workstation: record.workstation.clone(),
        activity: record.activity.clone(),
        hazard: record.hazard.clone(),
        hazard_category: record.hazard_category.as_str().to_string(),
        probability: record.score.probability(),
        severity: record.score.severity(),
        score: record.score.value(),
        tier: record.tier().label().to_string(),
        controls: record.controls.clone(),
        responsible_id: record.responsible_id,
        status: record.status.as_str().to_string(),
        evaluation_date: record.evaluation_date.to_string(),
        next_review: record.next_review.to_string(),
    })
}

fn training_info(training: &Training) -> Result<TrainingInfo, ApiError> {
    Ok(TrainingInfo {
        training_id: persisted(training.training_id, "Training")?,
        code: training.code.clone(),
        topic: training.topic.clone(),
        target_areas: training
            .target_areas
            .iter()
            .map(|a| a.name().to_string())
            .collect(),
        scheduled_at: format_datetime(training.scheduled_at)?,
        duration_hours: training.duration_hours,
        instructor: training.instructor.clone(),
        status: training.status.as_str().to_string(),
    })
}

fn worker_info(worker: &Worker) -> WorkerInfo {
    WorkerInfo {
        user_id: worker.user_id,
        full_name: worker.full_name.clone(),
        area: worker.area.as_ref().map(|a| a.name().to_string()),
        role: worker.role.as_str().to_string(),
    }
}

fn roster_entry_info(entry: &RosterEntry) -> Result<RosterEntryInfo, ApiError> {
    Ok(RosterEntryInfo {
        attendance_id: persisted(entry.attendance.attendance_id, "Attendance")?,
        worker_id: entry.attendance.worker_id,
        full_name: entry.full_name.clone(),
        area: entry.area.as_ref().map(|a| a.name().to_string()),
        attended: entry.attendance.attended,
        rating: entry.attendance.rating,
        feedback: entry.attendance.feedback.clone(),
    })
}

fn attendance_info(entry: &Attendance) -> Result<AttendanceInfo, ApiError> {
    Ok(AttendanceInfo {
        attendance_id: persisted(entry.attendance_id, "Attendance")?,
        training_id: entry.training_id,
        worker_id: entry.worker_id,
        attended: entry.attended,
        rating: entry.rating,
        feedback: entry.feedback.clone(),
    })
}

fn material_info(material: &MaterialLink) -> Result<MaterialInfo, ApiError> {
    Ok(MaterialInfo {
        material_id: persisted(material.material_id, "Material")?,
        training_id: material.training_id,
        kind: material.kind.as_str().to_string(),
        description: material.description.clone(),
        url: material.url.clone(),
        uploaded_by: material.uploaded_by,
    })
}

fn survey_info(survey: &Survey) -> Result<SurveyInfo, ApiError> {
    Ok(SurveyInfo {
        survey_id: persisted(survey.survey_id, "Survey")?,
        training_id: survey.training_id,
        worker_id: survey.worker_id,
        rating: survey.rating,
        comments: survey.comments.clone(),
        submitted_at: survey
            .submitted_at
            .format(&Rfc3339)
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to format timestamp: {e}"),
            })?,
    })
}

fn catalog_item_info(item: &PpeCatalogItem) -> Result<CatalogItemInfo, ApiError> {
    Ok(CatalogItemInfo {
        item_id: persisted(item.item_id, "Catalog item")?,
        name: item.name.clone(),
        description: item.description.clone(),
        certification: item.certification.clone(),
        lifespan_months: item.lifespan_months,
    })
}

fn assignment_info(detail: &AssignmentDetail, today: Date) -> Result<AssignmentInfo, ApiError> {
    let assignment: &PpeAssignment = &detail.assignment;
    Ok(AssignmentInfo {
        assignment_id: persisted(assignment.assignment_id, "Assignment")?,
        item_id: assignment.item_id,
        item_name: detail.item_name.clone(),
        worker_id: assignment.worker_id,
        worker_name: detail.worker_name.clone(),
        worker_area: detail.worker_area.as_ref().map(|a| a.name().to_string()),
        issue_date: assignment.issue_date.to_string(),
        expiry_date: assignment.expiry_date.to_string(),
        tier: assignment.tier(today).label().to_string(),
    })
}

fn load_training(persistence: &mut Persistence, training_id: i64) -> Result<Training, ApiError> {
    persistence
        .get_training(training_id)?
        .ok_or_else(|| not_found("Training", training_id))
}

fn load_risk_filter(request: &ListRisksRequest) -> Result<RiskFilter, ApiError> {
    Ok(RiskFilter {
        area: non_blank(request.area.as_deref()).map(Area::new),
        tier: non_blank(request.tier.as_deref())
            .map(parse_risk_tier)
            .transpose()?,
    })
}

fn filtered_risks(
    persistence: &mut Persistence,
    request: &ListRisksRequest,
) -> Result<Vec<RiskRecord>, ApiError> {
    let filter: RiskFilter = load_risk_filter(request)?;
    Ok(persistence
        .list_risks()?
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect())
}

fn effectiveness_report(persistence: &mut Persistence) -> Result<EffectivenessReport, ApiError> {
    let aggregates = persistence.list_held_training_aggregates()?;
    Ok(summarize_training_effectiveness(&aggregates))
}

// ============================================================================
// Authentication & users
// ============================================================================

/// Authenticates a user and opens a session.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the account is inactive.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor, expires_at): (String, AuthenticatedActor, String) =
        AuthenticationService::login(persistence, &request.email, &request.password)?;

    Ok(LoginResponse {
        session_token,
        user_id: actor.user_id,
        full_name: actor.display_name,
        role: actor.role.as_str().to_string(),
        expires_at,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the caller's identity.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: actor.user_id,
        email: actor.email.clone(),
        full_name: actor.display_name.clone(),
        role: actor.role.as_str().to_string(),
        area: actor.area.as_ref().map(|a| a.name().to_string()),
    }
}

/// Creates a user account.
///
/// Only admins may create users. The password policy is enforced before
/// anything is written.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - Email or name is blank, or the role is unknown
/// - The password violates the policy
/// - The email is already registered
pub fn create_user(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateUserRequest,
) -> Result<CreateUserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "create_user")?;

    require_non_blank("email", &request.email)?;
    require_non_blank("full_name", &request.full_name)?;
    if !request.email.contains('@') {
        return Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("'{}' is not an email address", request.email),
        });
    }
    let role: Role = Role::from_str(request.role.trim())?;

    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &request.email,
        &request.full_name,
    )?;

    let area: Option<Area> = non_blank(request.area.as_deref()).map(Area::new);
    let user_id: i64 = persistence.create_user(
        &request.email,
        &request.full_name,
        &request.password,
        role,
        area.as_ref(),
    )?;

    info!(
        actor_id = actor.user_id,
        user_id,
        role = %role,
        "User created"
    );

    Ok(CreateUserResponse {
        user_id,
        email: request.email.trim().to_lowercase(),
        full_name: request.full_name.trim().to_string(),
        role: role.as_str().to_string(),
        message: format!("Created user {}", request.full_name.trim()),
    })
}

/// Lists active users.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the query fails.
pub fn list_workers(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListWorkersResponse, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "list_workers")?;

    let workers: Vec<Worker> = persistence.list_active_workers()?;
    Ok(ListWorkersResponse {
        workers: workers.iter().map(worker_info).collect(),
    })
}

/// Adds an area to the master list.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the name is blank, or the
/// area exists.
pub fn create_area(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateAreaRequest,
) -> Result<CreateAreaResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "create_area")?;
    require_non_blank("name", &request.name)?;

    let area: Area = Area::new(&request.name);
    let area_id: i64 = persistence.create_area(&area)?;

    Ok(CreateAreaResponse {
        area_id,
        name: area.name().to_string(),
    })
}

/// Lists the area master list.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_areas(persistence: &mut Persistence) -> Result<ListAreasResponse, ApiError> {
    Ok(ListAreasResponse {
        areas: persistence
            .list_areas()?
            .iter()
            .map(|a| a.name().to_string())
            .collect(),
    })
}

// ============================================================================
// Risks
// ============================================================================

/// Registers a risk in the IPERC matrix.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage risks
/// - The code is already used
/// - Any field fails validation (see `validate_risk_submission`)
pub fn create_risk(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateRiskRequest,
) -> Result<RiskResponse, ApiError> {
    AuthorizationService::authorize_manage_risks(actor, "create_risk")?;

    let existing_codes: Vec<String> = persistence.list_risk_codes()?;
    validate_code_unique("risk", &request.code, &existing_codes)?;

    let hazard_category: HazardCategory = HazardCategory::from_str(request.hazard_category.trim())?;
    let status: RiskStatus = non_blank(request.status.as_deref())
        .map(RiskStatus::from_str)
        .transpose()?
        .unwrap_or(RiskStatus::Pending);
    let evaluation_date: Date = parse_date_field("evaluation_date", &request.evaluation_date)?;
    let next_review: Date = match non_blank(request.next_review.as_deref()) {
        Some(raw) => parse_date_field("next_review", raw)?,
        None => evaluation_date
            .checked_add(Duration::days(DEFAULT_REVIEW_INTERVAL_DAYS))
            .ok_or_else(|| ApiError::InvalidInput {
                field: String::from("evaluation_date"),
                message: String::from("Date arithmetic overflow while computing next review"),
            })?,
    };

    let active_users: Vec<Worker> = persistence.list_active_workers()?;
    let mut record: RiskRecord = validate_risk_submission(
        RiskSubmission {
            code: request.code,
            area: Area::new(&request.area),
            workstation: request.workstation,
            activity: request.activity,
            hazard: request.hazard,
            hazard_category,
            probability: request.probability,
            severity: request.severity,
            controls: request.controls,
            responsible_id: request.responsible_id,
            status,
            evaluation_date,
            next_review,
        },
        &active_users,
    )?;

    let risk_id: i64 = persistence.insert_risk(&record, actor.user_id)?;
    record.risk_id = Some(risk_id);

    info!(
        actor_id = actor.user_id,
        risk_id,
        code = %record.code,
        score = record.score.value(),
        tier = %record.tier(),
        "Risk registered"
    );

    Ok(RiskResponse {
        message: format!("Risk {} registered ({})", record.code, record.tier()),
        risk: risk_info(&record)?,
    })
}

/// Lists the risk matrix, optionally filtered by area and tier.
///
/// # Errors
///
/// Returns an error if the actor may not manage risks, the tier filter is
/// unknown, or the query fails.
pub fn list_risks(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListRisksRequest,
) -> Result<ListRisksResponse, ApiError> {
    AuthorizationService::authorize_manage_risks(actor, "list_risks")?;

    let risks: Vec<RiskRecord> = filtered_risks(persistence, request)?;
    debug!("Listing {} risks", risks.len());

    Ok(ListRisksResponse {
        risks: risks.iter().map(risk_info).collect::<Result<_, _>>()?,
    })
}

/// Exports the (filtered) risk matrix as CSV.
///
/// # Errors
///
/// Returns an error if the actor may not manage risks or the export fails.
pub fn export_risk_matrix(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListRisksRequest,
    today: Date,
) -> Result<CsvExport, ApiError> {
    AuthorizationService::authorize_manage_risks(actor, "export_risk_matrix")?;

    let risks: Vec<RiskRecord> = filtered_risks(persistence, request)?;
    Ok(CsvExport {
        file_name: format!("matriz_iperc_{}.csv", compact_date(today)),
        content: risk_matrix_csv(&risks)?,
    })
}

/// Updates a risk's status and/or controls.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage risks
/// - The risk does not exist
/// - The status is unknown or would move backwards
pub fn update_risk(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    risk_id: i64,
    request: UpdateRiskRequest,
) -> Result<RiskResponse, ApiError> {
    AuthorizationService::authorize_manage_risks(actor, "update_risk")?;

    let current: RiskRecord = persistence
        .get_risk(risk_id)?
        .ok_or_else(|| not_found("Risk", risk_id))?;
    let status: Option<RiskStatus> = non_blank(request.status.as_deref())
        .map(RiskStatus::from_str)
        .transpose()?;

    let updated: RiskRecord = sst_domain::apply_risk_update(&current, status, request.controls)?;
    persistence.update_risk(&updated)?;

    info!(
        actor_id = actor.user_id,
        risk_id,
        from = %current.status,
        to = %updated.status,
        "Risk updated"
    );

    Ok(RiskResponse {
        message: format!("Risk {} updated", updated.code),
        risk: risk_info(&updated)?,
    })
}

/// Builds the risk dashboard.
///
/// # Errors
///
/// Returns an error if the actor may not manage risks or the query fails.
pub fn risk_dashboard(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<RiskDashboardResponse, ApiError> {
    AuthorizationService::authorize_manage_risks(actor, "risk_dashboard")?;

    let risks: Vec<RiskRecord> = persistence.list_risks()?;
    Ok(RiskDashboardResponse {
        summary: summarize_risks(&risks),
        heatmap: risk_heatmap(&risks),
        status_by_area: status_by_area(&risks),
    })
}

// ============================================================================
// Trainings
// ============================================================================

/// Schedules a training.
///
/// Returns the response together with the notification event the caller
/// should deliver. Delivery is not part of this operation; a failed
/// notification must not undo the write.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage trainings
/// - The code is already used
/// - Code or topic is blank, the duration is zero, or the date is malformed
pub fn schedule_training(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateTrainingRequest,
) -> Result<(CreateTrainingResponse, TrainingScheduledEvent), ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "schedule_training")?;

    let existing_codes: Vec<String> = persistence.list_training_codes()?;
    validate_code_unique("training", &request.code, &existing_codes)?;

    let scheduled_at: PrimitiveDateTime =
        parse_datetime_field("scheduled_at", &request.scheduled_at)?;
    let mut training: Training = sst_domain::schedule_training(ScheduleTrainingRequest {
        code: request.code,
        topic: request.topic,
        target_areas: request.target_areas.iter().map(|a| Area::new(a)).collect(),
        scheduled_at,
        duration_hours: request.duration_hours,
        instructor: request.instructor,
    })?;

    let training_id: i64 = persistence.insert_training(&training, actor.user_id)?;
    training.training_id = Some(training_id);

    info!(
        actor_id = actor.user_id,
        training_id,
        code = %training.code,
        "Training scheduled"
    );

    let info: TrainingInfo = training_info(&training)?;
    let event: TrainingScheduledEvent = TrainingScheduledEvent {
        capacitacion_id: training_id,
        codigo: info.code.clone(),
        tema: info.topic.clone(),
        fecha: format_event_datetime(training.scheduled_at)?,
        area: Area::join_list(&training.target_areas),
    };

    Ok((
        CreateTrainingResponse {
            message: format!("Training {} scheduled", info.code),
            training: info,
            warnings: Vec::new(),
        },
        event,
    ))
}

/// Lists trainings, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings, the status is
/// unknown, or the query fails.
pub fn list_trainings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListTrainingsRequest,
) -> Result<ListTrainingsResponse, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "list_trainings")?;

    let status: Option<TrainingStatus> = non_blank(request.status.as_deref())
        .map(TrainingStatus::from_str)
        .transpose()?;
    let trainings: Vec<Training> = persistence.list_trainings(status)?;

    Ok(ListTrainingsResponse {
        trainings: trainings
            .iter()
            .map(training_info)
            .collect::<Result<_, _>>()?,
    })
}

/// Returns a training with its roster and materials.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the training
/// does not exist.
pub fn get_training_detail(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
) -> Result<TrainingDetailResponse, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "get_training")?;

    let training: Training = load_training(persistence, training_id)?;
    let roster: Vec<RosterEntry> = persistence.list_roster(training_id)?;
    let materials: Vec<MaterialLink> = persistence.list_materials(training_id)?;

    Ok(TrainingDetailResponse {
        training: training_info(&training)?,
        roster: roster
            .iter()
            .map(roster_entry_info)
            .collect::<Result<_, _>>()?,
        materials: materials
            .iter()
            .map(material_info)
            .collect::<Result<_, _>>()?,
    })
}

/// Adds workers to a training's roster.
///
/// Workers already on the roster are skipped.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage trainings
/// - The training does not exist or is no longer scheduled
/// - A worker id is not an active user
pub fn add_attendees(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
    request: &AddAttendeesRequest,
) -> Result<AddAttendeesResponse, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "add_attendees")?;

    let training: Training = load_training(persistence, training_id)?;
    let active: Vec<Worker> = persistence.list_active_workers()?;
    if let Some(unknown) = request
        .worker_ids
        .iter()
        .find(|id| !active.iter().any(|w| w.user_id == **id))
    {
        return Err(ApiError::InvalidInput {
            field: String::from("worker_ids"),
            message: format!("User {unknown} is not an active user"),
        });
    }

    let existing: Vec<Attendance> = persistence.list_attendance(training_id)?;
    let new_entries: Vec<Attendance> =
        sst_domain::add_attendees(&training, &existing, &request.worker_ids)?;
    let added: usize = persistence.insert_attendances(&new_entries)?;

    info!(
        actor_id = actor.user_id,
        training_id,
        added,
        "Roster updated"
    );

    Ok(AddAttendeesResponse {
        added,
        roster_size: existing.len() + added,
    })
}

/// Lists active workers who may still be added to a training.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the training
/// does not exist.
pub fn list_candidates(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
) -> Result<ListWorkersResponse, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "list_candidates")?;

    let training: Training = load_training(persistence, training_id)?;
    let workers: Vec<Worker> = persistence.list_active_workers()?;
    let existing: Vec<Attendance> = persistence.list_attendance(training_id)?;

    Ok(ListWorkersResponse {
        workers: candidate_attendees(&training, &workers)
            .into_iter()
            .filter(|w| !existing.iter().any(|a| a.worker_id == w.user_id))
            .map(worker_info)
            .collect(),
    })
}

/// Exports a training's roster as CSV.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the training
/// does not exist.
pub fn export_attendees(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
) -> Result<CsvExport, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "export_attendees")?;

    let training: Training = load_training(persistence, training_id)?;
    let roster: Vec<RosterEntry> = persistence.list_roster(training_id)?;

    Ok(CsvExport {
        file_name: format!("asistentes_{}.csv", training.code),
        content: attendees_csv(&roster)?,
    })
}

/// Records a worker's attendance, rating and feedback.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage trainings
/// - The roster entry or its training does not exist
/// - The rating is outside 1–5 or the training date has not arrived
pub fn record_attendance(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    attendance_id: i64,
    request: RecordAttendanceRequest,
    today: Date,
) -> Result<AttendanceInfo, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "record_attendance")?;

    let entry: Attendance = persistence
        .get_attendance(attendance_id)?
        .ok_or_else(|| not_found("Attendance", attendance_id))?;
    let training: Training = load_training(persistence, entry.training_id)?;

    let updated: Attendance = sst_domain::record_attendance(
        &training,
        &entry,
        AttendanceUpdate {
            attended: request.attended,
            rating: request.rating,
            feedback: request.feedback,
        },
        today,
    )?;
    persistence.update_attendance(&updated)?;

    info!(
        actor_id = actor.user_id,
        attendance_id,
        attended = updated.attended,
        "Attendance recorded"
    );

    attendance_info(&updated)
}

/// Marks a scheduled training as held.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage trainings
/// - The training does not exist or is already held
/// - The training date has not arrived
pub fn mark_training_held(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
    today: Date,
) -> Result<TrainingInfo, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "mark_training_held")?;

    let training: Training = load_training(persistence, training_id)?;
    let held: Training = sst_domain::mark_training_held(&training, today)?;
    persistence.update_training_status(training_id, held.status)?;

    info!(actor_id = actor.user_id, training_id, "Training held");
    training_info(&held)
}

/// Adds a material link to a training.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings, the training
/// does not exist, the kind is unknown, or the URL is blank.
pub fn add_material(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
    request: &AddMaterialRequest,
) -> Result<MaterialInfo, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "add_material")?;

    load_training(persistence, training_id)?;
    let kind: MaterialKind = MaterialKind::from_str(request.kind.trim())?;
    let mut material: MaterialLink = sst_domain::new_material_link(
        training_id,
        kind,
        &request.description,
        &request.url,
        actor.user_id,
    )?;
    material.material_id = Some(persistence.insert_material(&material)?);

    material_info(&material)
}

/// Lists a training's material links.
///
/// Any authenticated user may read materials.
///
/// # Errors
///
/// Returns an error if the training does not exist.
pub fn list_materials(
    persistence: &mut Persistence,
    _actor: &AuthenticatedActor,
    training_id: i64,
) -> Result<ListMaterialsResponse, ApiError> {
    load_training(persistence, training_id)?;
    let materials: Vec<MaterialLink> = persistence.list_materials(training_id)?;

    Ok(ListMaterialsResponse {
        materials: materials
            .iter()
            .map(material_info)
            .collect::<Result<_, _>>()?,
    })
}

/// Deletes a material link.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the link does
/// not exist.
pub fn delete_material(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    material_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "delete_material")?;

    persistence.delete_material(material_id)?;
    info!(actor_id = actor.user_id, material_id, "Material deleted");
    Ok(())
}

/// Submits a post-training survey.
///
/// Workers answer for themselves; supervisory roles may record a survey on
/// a worker's behalf.
///
/// # Errors
///
/// Returns an error if:
/// - The training does not exist
/// - The caller may not act for the worker (`Forbidden`)
/// - The worker did not attend a held training (`NotEligible`)
/// - A survey already exists, or the rating is outside 1–5
pub fn submit_survey(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
    request: SubmitSurveyRequest,
    now: OffsetDateTime,
) -> Result<SurveyInfo, ApiError> {
    let training: Training = load_training(persistence, training_id)?;
    let worker_id: i64 = request.worker_id.unwrap_or(actor.user_id);
    let attendances: Vec<Attendance> = persistence.list_attendance(training_id)?;
    let existing: Vec<Survey> = persistence.list_surveys(training_id)?;

    let mut survey: Survey = sst_domain::submit_survey(
        &actor.viewer(),
        &training,
        &attendances,
        &existing,
        worker_id,
        SurveySubmission {
            rating: request.rating,
            comments: request.comments,
        },
        now,
    )?;
    survey.survey_id = Some(persistence.insert_survey(&survey)?);

    info!(
        actor_id = actor.user_id,
        training_id,
        worker_id,
        "Survey submitted"
    );

    survey_info(&survey)
}

/// Looks up a worker's survey for a training.
///
/// # Errors
///
/// Returns an error if the training does not exist, the caller may not see
/// the worker's data, or the worker is not eligible.
pub fn lookup_survey(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
    worker_id: i64,
) -> Result<SurveyLookupResponse, ApiError> {
    let training: Training = load_training(persistence, training_id)?;
    let attendances: Vec<Attendance> = persistence.list_attendance(training_id)?;
    let surveys: Vec<Survey> = persistence.list_surveys(training_id)?;

    match sst_domain::lookup_survey(
        &actor.viewer(),
        &training,
        &attendances,
        &surveys,
        worker_id,
    )? {
        SurveyLookup::Completed(survey) => Ok(SurveyLookupResponse {
            status: String::from("completed"),
            survey: Some(survey_info(&survey)?),
        }),
        SurveyLookup::Pending => Ok(SurveyLookupResponse {
            status: String::from("pending"),
            survey: None,
        }),
    }
}

/// Builds the training effectiveness report over held trainings.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the query fails.
pub fn training_effectiveness(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<EffectivenessResponse, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "training_effectiveness")?;

    let report: EffectivenessReport = effectiveness_report(persistence)?;
    Ok(EffectivenessResponse {
        total_trainings: report.trainings.len(),
        total_attended: report.total_attended,
        total_invited: report.total_invited,
        global_attendance_rate: report.global_attendance_rate,
        global_satisfaction: report.global_satisfaction,
        trainings: report
            .trainings
            .iter()
            .map(|row| TrainingEffectivenessInfo {
                code: row.code.clone(),
                topic: row.topic.clone(),
                date: row.date.to_string(),
                invited: row.invited,
                attended: row.attended,
                attendance_rate: row.attendance_rate,
                survey_count: row.survey_count,
                mean_rating: row.mean_rating,
            })
            .collect(),
    })
}

/// Exports the training effectiveness report as CSV.
///
/// # Errors
///
/// Returns an error if the actor may not manage trainings or the export fails.
pub fn export_effectiveness(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    today: Date,
) -> Result<CsvExport, ApiError> {
    AuthorizationService::authorize_manage_trainings(actor, "export_effectiveness")?;

    let report: EffectivenessReport = effectiveness_report(persistence)?;
    Ok(CsvExport {
        file_name: format!("reporte_efectividad_{}.csv", compact_date(today)),
        content: effectiveness_csv(&report)?,
    })
}

// ============================================================================
// PPE
// ============================================================================

/// Adds an item to the PPE catalog.
///
/// # Errors
///
/// Returns an error if the actor may not manage PPE, the name is blank, or
/// the lifespan is zero.
pub fn create_catalog_item(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateCatalogItemRequest,
) -> Result<CatalogItemInfo, ApiError> {
    AuthorizationService::authorize_manage_ppe(actor, "create_catalog_item")?;

    let mut item: PpeCatalogItem = PpeCatalogItem::new(
        &request.name,
        &request.description,
        &request.certification,
        request.lifespan_months.unwrap_or(DEFAULT_LIFESPAN_MONTHS),
    )?;
    item.item_id = Some(persistence.insert_catalog_item(&item)?);

    catalog_item_info(&item)
}

/// Lists the PPE catalog.
///
/// # Errors
///
/// Returns an error if the actor may not manage PPE or the query fails.
pub fn list_catalog(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListCatalogResponse, ApiError> {
    AuthorizationService::authorize_manage_ppe(actor, "list_catalog")?;

    Ok(ListCatalogResponse {
        items: persistence
            .list_catalog()?
            .iter()
            .map(catalog_item_info)
            .collect::<Result<_, _>>()?,
    })
}

/// Assigns a PPE item to a worker.
///
/// The expiry date defaults to the item's lifespan from the issue date.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage PPE
/// - The item does not exist or the worker is not an active user
/// - A date is malformed or the expiry precedes the issue date
pub fn create_assignment(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateAssignmentRequest,
    today: Date,
) -> Result<AssignmentInfo, ApiError> {
    AuthorizationService::authorize_manage_ppe(actor, "create_assignment")?;

    let item: PpeCatalogItem = persistence
        .get_catalog_item(request.item_id)?
        .ok_or_else(|| not_found("Catalog item", request.item_id))?;
    let worker: UserData = persistence
        .get_user_by_id(request.worker_id)?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("worker_id"),
            message: format!("User {} is not an active user", request.worker_id),
        })?;

    let issue_date: Date = parse_date_field("issue_date", &request.issue_date)?;
    let expiry_override: Option<Date> = non_blank(request.expiry_date.as_deref())
        .map(|raw| parse_date_field("expiry_date", raw))
        .transpose()?;

    let mut assignment: PpeAssignment =
        build_assignment(&item, worker.user_id, issue_date, expiry_override)?;
    assignment.assignment_id = Some(persistence.insert_assignment(&assignment, actor.user_id)?);

    assignment_info(
        &AssignmentDetail {
            assignment,
            item_name: item.name,
            worker_name: worker.full_name,
            worker_area: worker.area.as_deref().map(Area::new),
        },
        today,
    )
}

/// Lists PPE assignments with their expiry tier, optionally filtered by tier.
///
/// # Errors
///
/// Returns an error if the actor may not manage PPE, the tier is unknown,
/// or the query fails.
pub fn list_assignments(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListAssignmentsRequest,
    today: Date,
) -> Result<ListAssignmentsResponse, ApiError> {
    AuthorizationService::authorize_manage_ppe(actor, "list_assignments")?;

    let tier: Option<ExpiryTier> = non_blank(request.tier.as_deref())
        .map(parse_expiry_tier)
        .transpose()?;
    let details: Vec<AssignmentDetail> = persistence.list_assignments()?;

    Ok(ListAssignmentsResponse {
        assignments: details
            .iter()
            .filter(|d| tier.is_none_or(|t| d.assignment.tier(today) == t))
            .map(|d| assignment_info(d, today))
            .collect::<Result<_, _>>()?,
    })
}

/// Builds the PPE dashboard.
///
/// # Errors
///
/// Returns an error if the actor may not manage PPE or the query fails.
pub fn ppe_dashboard(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    today: Date,
) -> Result<PpeDashboardResponse, ApiError> {
    AuthorizationService::authorize_manage_ppe(actor, "ppe_dashboard")?;

    let details: Vec<AssignmentDetail> = persistence.list_assignments()?;
    let assignments: Vec<PpeAssignment> = details.iter().map(|d| d.assignment.clone()).collect();
    let catalog: Vec<PpeCatalogItem> = persistence.list_catalog()?;

    Ok(PpeDashboardResponse {
        summary: summarize_ppe(&assignments, &catalog, today),
        by_area: ppe_tier_by_area(
            details
                .iter()
                .map(|d| (d.worker_area.as_ref(), &d.assignment)),
            today,
        ),
    })
}
