// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod notifier;
mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use sst_api::{
    AddAttendeesRequest, AddAttendeesResponse, AddMaterialRequest, ApiError, AssignmentInfo,
    AttendanceInfo, CatalogItemInfo, CreateAreaRequest, CreateAreaResponse,
    CreateAssignmentRequest, CreateCatalogItemRequest, CreateRiskRequest, CreateTrainingRequest,
    CreateTrainingResponse, CreateUserRequest, CreateUserResponse, CsvExport,
    EffectivenessResponse, ListAreasResponse, ListAssignmentsRequest, ListAssignmentsResponse,
    ListCatalogResponse, ListMaterialsResponse, ListRisksRequest, ListRisksResponse,
    ListTrainingsRequest, ListTrainingsResponse, ListWorkersResponse, LoginRequest,
    LoginResponse, MaterialInfo, PasswordPolicy, PpeDashboardResponse, RecordAttendanceRequest,
    RiskDashboardResponse, RiskResponse, SubmitSurveyRequest, SurveyInfo, SurveyLookupResponse,
    TrainingDetailResponse, TrainingInfo, TrainingScheduledEvent, UpdateRiskRequest,
    WhoAmIResponse,
};
use sst_domain::Role;
use sst_persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use notifier::Notifier;
use session::SessionActor;

/// SST Server - HTTP server for workplace safety management
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Base URL of the automation webhook. Notifications are disabled when absent.
    #[arg(long, env = "SST_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Timeout for webhook requests, in seconds
    #[arg(long, default_value_t = 5)]
    webhook_timeout_secs: u64,

    /// Email of an admin account to create at startup if missing
    #[arg(long, env = "SST_ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for the bootstrap admin account
    #[arg(long, env = "SST_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// The store is wrapped in a Mutex so handlers serialize access to the
/// single connection.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Webhook notifier, when configured.
    notifier: Option<Notifier>,
}

/// Path parameter for routes addressed by a numeric id.
#[derive(Debug, Deserialize)]
struct IdPath {
    id: i64,
}

/// Path parameters for the survey lookup route.
#[derive(Debug, Deserialize)]
struct SurveyPath {
    id: i64,
    worker_id: i64,
}

/// API response for operations without a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse {
    /// Success indicator.
    success: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { rule, .. } if rule.starts_with("unique") => {
                StatusCode::CONFLICT
            }
            ApiError::DomainRuleViolation { .. } | ApiError::NotEligible { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::MissingField { .. }
            | ApiError::InvalidInput { .. }
            | ApiError::PasswordPolicyViolation { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::StorageError { .. } | ApiError::Internal { .. } => {
                error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Renders a CSV export as a file download.
fn csv_download(export: CsvExport) -> Response {
    (
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.content,
    )
        .into_response()
}

// ============================================================================
// Auth & users
// ============================================================================

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = sst_api::login(&mut persistence, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, token): SessionActor,
) -> Result<Json<WriteResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    sst_api::logout(&mut persistence, &token)?;
    info!(user_id = actor.user_id, "User logged out");
    Ok(Json(WriteResponse {
        success: true,
        message: None,
    }))
}

/// Handler for GET `/auth/whoami`.
async fn handle_whoami(SessionActor(actor, _): SessionActor) -> Json<WhoAmIResponse> {
    Json(sst_api::whoami(&actor))
}

/// Handler for POST `/users`.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, HttpError> {
    info!(actor_id = actor.user_id, role = %req.role, "Handling create_user request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::create_user(&mut persistence, &actor, req)?))
}

/// Handler for GET `/users/workers`.
async fn handle_list_workers(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<ListWorkersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_workers(&mut persistence, &actor)?))
}

/// Handler for GET `/areas`.
async fn handle_list_areas(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Result<Json<ListAreasResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_areas(&mut persistence)?))
}

/// Handler for POST `/areas`.
async fn handle_create_area(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateAreaRequest>,
) -> Result<Json<CreateAreaResponse>, HttpError> {
    info!(actor_id = actor.user_id, name = %req.name, "Handling create_area request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::create_area(&mut persistence, &actor, &req)?))
}

// ============================================================================
// Risks
// ============================================================================

/// Handler for POST `/risks`.
async fn handle_create_risk(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateRiskRequest>,
) -> Result<Json<RiskResponse>, HttpError> {
    info!(actor_id = actor.user_id, code = %req.code, "Handling create_risk request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::create_risk(&mut persistence, &actor, req)?))
}

/// Handler for GET `/risks`.
async fn handle_list_risks(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Query(query): Query<ListRisksRequest>,
) -> Result<Json<ListRisksResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_risks(&mut persistence, &actor, &query)?))
}

/// Handler for GET `/risks/export`.
async fn handle_export_risks(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Query(query): Query<ListRisksRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let export: CsvExport =
        sst_api::export_risk_matrix(&mut persistence, &actor, &query, today())?;
    Ok(csv_download(export))
}

/// Handler for PATCH `/risks/{id}`.
async fn handle_update_risk(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
    Json(req): Json<UpdateRiskRequest>,
) -> Result<Json<RiskResponse>, HttpError> {
    info!(actor_id = actor.user_id, risk_id = path.id, "Handling update_risk request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::update_risk(
        &mut persistence,
        &actor,
        path.id,
        req,
    )?))
}

/// Handler for GET `/risks/dashboard`.
async fn handle_risk_dashboard(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<RiskDashboardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::risk_dashboard(&mut persistence, &actor)?))
}

// ============================================================================
// Trainings
// ============================================================================

/// Handler for POST `/trainings`.
///
/// The webhook is called after the training is stored; a delivery failure
/// is reported in `warnings` and does not fail the request.
async fn handle_schedule_training(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateTrainingRequest>,
) -> Result<Json<CreateTrainingResponse>, HttpError> {
    info!(actor_id = actor.user_id, code = %req.code, "Handling schedule_training request");

    let mut persistence = app_state.persistence.lock().await;
    let (mut response, event): (CreateTrainingResponse, TrainingScheduledEvent) =
        sst_api::schedule_training(&mut persistence, &actor, req)?;
    drop(persistence);

    if let Some(notifier) = &app_state.notifier
        && let Err(e) = notifier.training_scheduled(&event).await
    {
        warn!(
            training_id = event.capacitacion_id,
            error = %e,
            "Training notification failed"
        );
        response
            .warnings
            .push(format!("Notification not delivered: {e}"));
    }

    Ok(Json(response))
}

/// Handler for GET `/trainings`.
async fn handle_list_trainings(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Query(query): Query<ListTrainingsRequest>,
) -> Result<Json<ListTrainingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_trainings(
        &mut persistence,
        &actor,
        &query,
    )?))
}

/// Handler for GET `/trainings/{id}`.
async fn handle_get_training(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
) -> Result<Json<TrainingDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::get_training_detail(
        &mut persistence,
        &actor,
        path.id,
    )?))
}

/// Handler for POST `/trainings/{id}/attendees`.
async fn handle_add_attendees(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
    Json(req): Json<AddAttendeesRequest>,
) -> Result<Json<AddAttendeesResponse>, HttpError> {
    info!(
        actor_id = actor.user_id,
        training_id = path.id,
        count = req.worker_ids.len(),
        "Handling add_attendees request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::add_attendees(
        &mut persistence,
        &actor,
        path.id,
        &req,
    )?))
}

/// Handler for GET `/trainings/{id}/candidates`.
async fn handle_list_candidates(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
) -> Result<Json<ListWorkersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_candidates(
        &mut persistence,
        &actor,
        path.id,
    )?))
}

/// Handler for GET `/trainings/{id}/attendees/export`.
async fn handle_export_attendees(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let export: CsvExport = sst_api::export_attendees(&mut persistence, &actor, path.id)?;
    Ok(csv_download(export))
}

/// Handler for PUT `/attendance/{id}`.
async fn handle_record_attendance(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
    Json(req): Json<RecordAttendanceRequest>,
) -> Result<Json<AttendanceInfo>, HttpError> {
    info!(
        actor_id = actor.user_id,
        attendance_id = path.id,
        "Handling record_attendance request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::record_attendance(
        &mut persistence,
        &actor,
        path.id,
        req,
        today(),
    )?))
}

/// Handler for POST `/trainings/{id}/held`.
async fn handle_mark_training_held(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
) -> Result<Json<TrainingInfo>, HttpError> {
    info!(actor_id = actor.user_id, training_id = path.id, "Handling mark_training_held request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::mark_training_held(
        &mut persistence,
        &actor,
        path.id,
        today(),
    )?))
}

/// Handler for POST `/trainings/{id}/materials`.
async fn handle_add_material(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
    Json(req): Json<AddMaterialRequest>,
) -> Result<Json<MaterialInfo>, HttpError> {
    info!(actor_id = actor.user_id, training_id = path.id, "Handling add_material request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::add_material(
        &mut persistence,
        &actor,
        path.id,
        &req,
    )?))
}

/// Handler for GET `/trainings/{id}/materials`.
async fn handle_list_materials(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
) -> Result<Json<ListMaterialsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_materials(
        &mut persistence,
        &actor,
        path.id,
    )?))
}

/// Handler for DELETE `/materials/{id}`.
async fn handle_delete_material(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
) -> Result<Json<WriteResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    sst_api::delete_material(&mut persistence, &actor, path.id)?;
    Ok(Json(WriteResponse {
        success: true,
        message: Some(format!("Material {} deleted", path.id)),
    }))
}

/// Handler for POST `/trainings/{id}/surveys`.
async fn handle_submit_survey(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<IdPath>,
    Json(req): Json<SubmitSurveyRequest>,
) -> Result<Json<SurveyInfo>, HttpError> {
    info!(actor_id = actor.user_id, training_id = path.id, "Handling submit_survey request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::submit_survey(
        &mut persistence,
        &actor,
        path.id,
        req,
        OffsetDateTime::now_utc(),
    )?))
}

/// Handler for GET `/trainings/{id}/surveys/{worker_id}`.
async fn handle_lookup_survey(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(path): Path<SurveyPath>,
) -> Result<Json<SurveyLookupResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::lookup_survey(
        &mut persistence,
        &actor,
        path.id,
        path.worker_id,
    )?))
}

/// Handler for GET `/trainings/effectiveness`.
async fn handle_training_effectiveness(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<EffectivenessResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::training_effectiveness(
        &mut persistence,
        &actor,
    )?))
}

/// Handler for GET `/trainings/effectiveness/export`.
async fn handle_export_effectiveness(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let export: CsvExport = sst_api::export_effectiveness(&mut persistence, &actor, today())?;
    Ok(csv_download(export))
}

// ============================================================================
// PPE
// ============================================================================

/// Handler for POST `/ppe/catalog`.
async fn handle_create_catalog_item(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateCatalogItemRequest>,
) -> Result<Json<CatalogItemInfo>, HttpError> {
    info!(actor_id = actor.user_id, name = %req.name, "Handling create_catalog_item request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::create_catalog_item(
        &mut persistence,
        &actor,
        &req,
    )?))
}

/// Handler for GET `/ppe/catalog`.
async fn handle_list_catalog(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<ListCatalogResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_catalog(&mut persistence, &actor)?))
}

/// Handler for POST `/ppe/assignments`.
async fn handle_create_assignment(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<Json<AssignmentInfo>, HttpError> {
    info!(
        actor_id = actor.user_id,
        item_id = req.item_id,
        worker_id = req.worker_id,
        "Handling create_assignment request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::create_assignment(
        &mut persistence,
        &actor,
        &req,
        today(),
    )?))
}

/// Handler for GET `/ppe/assignments`.
async fn handle_list_assignments(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Query(query): Query<ListAssignmentsRequest>,
) -> Result<Json<ListAssignmentsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::list_assignments(
        &mut persistence,
        &actor,
        &query,
        today(),
    )?))
}

/// Handler for GET `/ppe/dashboard`.
async fn handle_ppe_dashboard(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<PpeDashboardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(sst_api::ppe_dashboard(
        &mut persistence,
        &actor,
        today(),
    )?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/users", post(handle_create_user))
        .route("/users/workers", get(handle_list_workers))
        .route("/areas", get(handle_list_areas).post(handle_create_area))
        .route("/risks", post(handle_create_risk).get(handle_list_risks))
        .route("/risks/export", get(handle_export_risks))
        .route("/risks/dashboard", get(handle_risk_dashboard))
        .route("/risks/{id}", patch(handle_update_risk))
        .route(
            "/trainings",
            post(handle_schedule_training).get(handle_list_trainings),
        )
        .route(
            "/trainings/effectiveness",
            get(handle_training_effectiveness),
        )
        .route(
            "/trainings/effectiveness/export",
            get(handle_export_effectiveness),
        )
        .route("/trainings/{id}", get(handle_get_training))
        .route("/trainings/{id}/attendees", post(handle_add_attendees))
        .route(
            "/trainings/{id}/attendees/export",
            get(handle_export_attendees),
        )
        .route("/trainings/{id}/candidates", get(handle_list_candidates))
        .route("/trainings/{id}/held", post(handle_mark_training_held))
        .route(
            "/trainings/{id}/materials",
            post(handle_add_material).get(handle_list_materials),
        )
        .route("/trainings/{id}/surveys", post(handle_submit_survey))
        .route(
            "/trainings/{id}/surveys/{worker_id}",
            get(handle_lookup_survey),
        )
        .route("/attendance/{id}", put(handle_record_attendance))
        .route("/materials/{id}", delete(handle_delete_material))
        .route("/ppe/catalog", post(handle_create_catalog_item).get(handle_list_catalog))
        .route(
            "/ppe/assignments",
            post(handle_create_assignment).get(handle_list_assignments),
        )
        .route("/ppe/dashboard", get(handle_ppe_dashboard))
        .with_state(app_state)
}

/// Creates the bootstrap admin account unless a user with that email exists.
fn seed_admin(
    persistence: &mut Persistence,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.get_user_by_email(email)?.is_some() {
        info!(email, "Bootstrap admin already present");
        return Ok(());
    }

    PasswordPolicy::default().validate(password, password, email, "Administrador")?;
    let user_id: i64 =
        persistence.create_user(email, "Administrador", password, Role::Admin, None)?;
    info!(user_id, email, "Bootstrap admin created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing SST Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        seed_admin(&mut persistence, email, password)?;
    }

    let notifier: Option<Notifier> = match &args.webhook_url {
        Some(url) => {
            info!(url = %url, timeout_secs = args.webhook_timeout_secs, "Webhook notifications enabled");
            Some(Notifier::new(
                url,
                Duration::from_secs(args.webhook_timeout_secs),
            )?)
        }
        None => {
            info!("Webhook notifications disabled");
            None
        }
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        notifier,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
