// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sst_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::{date, datetime};

use crate::{
    AddAttendeesRequest, AddMaterialRequest, ApiError, AuthenticatedActor, CreateTrainingRequest,
    ListTrainingsRequest, RecordAttendanceRequest, SubmitSurveyRequest, TrainingInfo,
    add_attendees, add_material, delete_material, export_attendees, export_effectiveness,
    get_training_detail, list_candidates, list_materials, list_trainings, lookup_survey,
    mark_training_held, record_attendance, schedule_training, submit_survey,
    training_effectiveness,
};

use super::helpers::{
    TRAINING_DAY, create_test_officer, create_test_persistence, create_test_worker,
    create_training_request, hold_training_with_attendee, schedule_test_training,
};

const SUBMITTED_AT: OffsetDateTime = datetime!(2026 - 02 - 16 10:00:00 UTC);

fn survey(rating: u8) -> SubmitSurveyRequest {
    SubmitSurveyRequest {
        worker_id: None,
        rating,
        comments: String::from("Muy útil"),
    }
}

fn first_attendance_id(persistence: &mut Persistence, training_id: i64) -> i64 {
    persistence.list_attendance(training_id).unwrap()[0]
        .attendance_id
        .unwrap()
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_schedule_training_builds_notification_event() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let (response, event) =
        schedule_training(&mut persistence, &officer, create_training_request("CAP-001")).unwrap();

    assert_eq!(response.training.status, "programada");
    assert_eq!(response.training.scheduled_at, "2026-02-15 09:00:00");
    assert!(response.warnings.is_empty());
    assert_eq!(event.capacitacion_id, response.training.training_id);
    assert_eq!(event.codigo, "CAP-001");
    assert_eq!(event.tema, "Uso de extintores");
    assert_eq!(event.fecha, "2026-02-15T09:00:00");
    assert_eq!(event.area, "Producción, Almacén");
}

#[test]
fn test_schedule_training_rejects_duplicate_code() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    schedule_test_training(&mut persistence, &officer, "CAP-001");
    let result = schedule_training(&mut persistence, &officer, create_training_request("CAP-001"));
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "unique_training_code"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_schedule_training_rejects_zero_duration_and_bad_date() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let mut request: CreateTrainingRequest = create_training_request("CAP-001");
    request.duration_hours = 0;
    assert!(matches!(
        schedule_training(&mut persistence, &officer, request),
        Err(ApiError::InvalidInput { .. })
    ));

    let mut request: CreateTrainingRequest = create_training_request("CAP-002");
    request.scheduled_at = String::from("2026-02-15T09:00");
    match schedule_training(&mut persistence, &officer, request) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "scheduled_at"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_schedule_training_with_blank_topic_persists_nothing() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let mut request: CreateTrainingRequest = create_training_request("CAP-001");
    request.topic = String::from("   ");
    match schedule_training(&mut persistence, &officer, request) {
        Err(ApiError::MissingField { field }) => assert_eq!(field, "topic"),
        other => panic!("expected MissingField, got {other:?}"),
    }

    let listed = list_trainings(&mut persistence, &officer, &ListTrainingsRequest::default())
        .unwrap();
    assert!(listed.trainings.is_empty());
    assert!(persistence.list_training_codes().unwrap().is_empty());
}

#[test]
fn test_list_trainings_filters_by_status() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let held: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    schedule_test_training(&mut persistence, &officer, "CAP-002");
    mark_training_held(&mut persistence, &officer, held.training_id, TRAINING_DAY).unwrap();

    let scheduled = list_trainings(
        &mut persistence,
        &officer,
        &ListTrainingsRequest {
            status: Some(String::from("programada")),
        },
    )
    .unwrap();
    assert_eq!(scheduled.trainings.len(), 1);
    assert_eq!(scheduled.trainings[0].code, "CAP-002");

    let all = list_trainings(&mut persistence, &officer, &ListTrainingsRequest::default()).unwrap();
    assert_eq!(all.trainings.len(), 2);
}

#[test]
fn test_mark_training_held_requires_date_and_is_one_way() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");

    match mark_training_held(
        &mut persistence,
        &officer,
        training.training_id,
        date!(2026 - 02 - 14),
    ) {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "attendance_open"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }

    let held: TrainingInfo =
        mark_training_held(&mut persistence, &officer, training.training_id, TRAINING_DAY)
            .unwrap();
    assert_eq!(held.status, "realizada");

    match mark_training_held(&mut persistence, &officer, training.training_id, TRAINING_DAY) {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "forward_transition"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }
}

// ============================================================================
// Roster & attendance
// ============================================================================

#[test]
fn test_add_attendees_skips_duplicates() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let rosa = create_test_worker(&mut persistence, "rosa@example.com", "Rosa", "Almacén");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");

    let first = add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id, luis.user_id],
        },
    )
    .unwrap();
    assert_eq!(first.added, 1);
    assert_eq!(first.roster_size, 1);

    let second = add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id, rosa.user_id],
        },
    )
    .unwrap();
    assert_eq!(second.added, 1);
    assert_eq!(second.roster_size, 2);
}

#[test]
fn test_add_attendees_rejects_unknown_worker() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");

    let result = add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![777],
        },
    );
    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "worker_ids"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(persistence.list_attendance(training.training_id).unwrap().is_empty());
}

#[test]
fn test_add_attendees_closed_once_held() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    mark_training_held(&mut persistence, &officer, training.training_id, TRAINING_DAY).unwrap();

    let result = add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    );
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "training_scheduled"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_list_candidates_filters_area_and_roster() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let rosa = create_test_worker(&mut persistence, "rosa@example.com", "Rosa", "Almacén");
    create_test_worker(&mut persistence, "omar@example.com", "Omar", "Oficinas");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");

    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();

    let candidates = list_candidates(&mut persistence, &officer, training.training_id).unwrap();
    let ids: Vec<i64> = candidates.workers.iter().map(|w| w.user_id).collect();
    assert_eq!(ids, vec![rosa.user_id]);
}

#[test]
fn test_list_candidates_matches_area_names_containing_commas() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let nadia = create_test_worker(
        &mut persistence,
        "nadia@example.com",
        "Nadia",
        "Planta Norte, Línea 2",
    );
    create_test_worker(&mut persistence, "omar@example.com", "Omar", "Planta Norte");

    let mut request: CreateTrainingRequest = create_training_request("CAP-001");
    request.target_areas = vec![String::from("Planta Norte, Línea 2")];
    let (response, event) = schedule_training(&mut persistence, &officer, request).unwrap();
    assert_eq!(
        response.training.target_areas,
        vec![String::from("Planta Norte, Línea 2")]
    );
    assert_eq!(event.area, "Planta Norte, Línea 2");

    let candidates =
        list_candidates(&mut persistence, &officer, response.training.training_id).unwrap();
    let ids: Vec<i64> = candidates.workers.iter().map(|w| w.user_id).collect();
    assert_eq!(ids, vec![nadia.user_id]);
}

#[test]
fn test_record_attendance_opens_on_training_day() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();
    let attendance_id: i64 = first_attendance_id(&mut persistence, training.training_id);

    let request = RecordAttendanceRequest {
        attended: true,
        rating: 4,
        feedback: String::from("Buena práctica"),
    };
    match record_attendance(
        &mut persistence,
        &officer,
        attendance_id,
        request.clone(),
        date!(2026 - 02 - 14),
    ) {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "attendance_open"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }

    let recorded =
        record_attendance(&mut persistence, &officer, attendance_id, request, TRAINING_DAY)
            .unwrap();
    assert!(recorded.attended);
    assert_eq!(recorded.rating, Some(4));
    assert_eq!(recorded.feedback.as_deref(), Some("Buena práctica"));
}

#[test]
fn test_record_attendance_rejects_rating_out_of_scale() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();
    let attendance_id: i64 = first_attendance_id(&mut persistence, training.training_id);

    let result = record_attendance(
        &mut persistence,
        &officer,
        attendance_id,
        RecordAttendanceRequest {
            attended: true,
            rating: 0,
            feedback: String::new(),
        },
        TRAINING_DAY,
    );
    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "rating"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_training_detail_and_attendee_export() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();

    let detail = get_training_detail(&mut persistence, &officer, training.training_id).unwrap();
    assert_eq!(detail.roster.len(), 1);
    assert_eq!(detail.roster[0].full_name, "Luis");
    assert_eq!(detail.roster[0].area.as_deref(), Some("Producción"));
    assert!(detail.materials.is_empty());

    let export = export_attendees(&mut persistence, &officer, training.training_id).unwrap();
    assert_eq!(export.file_name, "asistentes_CAP-001.csv");
    let lines: Vec<&str> = export.content.lines().collect();
    assert_eq!(lines[0], "ID,Nombre,Área,Asistió,Calificación,Comentarios");
    assert_eq!(lines[1], format!("{},Luis,Producción,No,N/A,", luis.user_id));
}

#[test]
fn test_unknown_training_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    assert!(matches!(
        get_training_detail(&mut persistence, &officer, 99),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

// ============================================================================
// Materials
// ============================================================================

#[test]
fn test_materials_add_list_delete() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");

    let material = add_material(
        &mut persistence,
        &officer,
        training.training_id,
        &AddMaterialRequest {
            kind: String::from("Video"),
            description: String::new(),
            url: String::from("https://example.com/extintores.mp4"),
        },
    )
    .unwrap();
    assert_eq!(material.description, "Material externo");
    assert_eq!(material.uploaded_by, officer.user_id);

    let listed = list_materials(&mut persistence, &luis, training.training_id).unwrap();
    assert_eq!(listed.materials, vec![material.clone()]);

    delete_material(&mut persistence, &officer, material.material_id).unwrap();
    assert!(
        list_materials(&mut persistence, &luis, training.training_id)
            .unwrap()
            .materials
            .is_empty()
    );
}

#[test]
fn test_add_material_rejects_unknown_kind_and_blank_url() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");

    let result = add_material(
        &mut persistence,
        &officer,
        training.training_id,
        &AddMaterialRequest {
            kind: String::from("Podcast"),
            description: String::new(),
            url: String::from("https://example.com"),
        },
    );
    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "kind"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }

    let result = add_material(
        &mut persistence,
        &officer,
        training.training_id,
        &AddMaterialRequest {
            kind: String::from("Guía"),
            description: String::new(),
            url: String::from("  "),
        },
    );
    assert!(matches!(result, Err(ApiError::MissingField { .. })));
}

// ============================================================================
// Surveys
// ============================================================================

#[test]
fn test_worker_submits_own_survey_once() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();
    hold_training_with_attendee(
        &mut persistence,
        &officer,
        training.training_id,
        luis.user_id,
        4,
    );

    let lookup = lookup_survey(&mut persistence, &luis, training.training_id, luis.user_id).unwrap();
    assert_eq!(lookup.status, "pending");

    let submitted = submit_survey(
        &mut persistence,
        &luis,
        training.training_id,
        survey(5),
        SUBMITTED_AT,
    )
    .unwrap();
    assert_eq!(submitted.worker_id, luis.user_id);
    assert_eq!(submitted.submitted_at, "2026-02-16T10:00:00Z");

    let lookup = lookup_survey(&mut persistence, &luis, training.training_id, luis.user_id).unwrap();
    assert_eq!(lookup.status, "completed");
    assert_eq!(lookup.survey, Some(submitted));

    match submit_survey(
        &mut persistence,
        &luis,
        training.training_id,
        survey(3),
        SUBMITTED_AT,
    ) {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "single_survey"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_worker_cannot_answer_for_another_worker() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let rosa = create_test_worker(&mut persistence, "rosa@example.com", "Rosa", "Almacén");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();
    hold_training_with_attendee(
        &mut persistence,
        &officer,
        training.training_id,
        luis.user_id,
        4,
    );

    let mut request: SubmitSurveyRequest = survey(5);
    request.worker_id = Some(luis.user_id);
    assert!(matches!(
        submit_survey(
            &mut persistence,
            &rosa,
            training.training_id,
            request,
            SUBMITTED_AT
        ),
        Err(ApiError::Forbidden { .. })
    ));
    assert!(matches!(
        lookup_survey(&mut persistence, &rosa, training.training_id, luis.user_id),
        Err(ApiError::Forbidden { .. })
    ));
}

#[test]
fn test_survey_requires_attendance() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let rosa = create_test_worker(&mut persistence, "rosa@example.com", "Rosa", "Almacén");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id, rosa.user_id],
        },
    )
    .unwrap();
    hold_training_with_attendee(
        &mut persistence,
        &officer,
        training.training_id,
        luis.user_id,
        4,
    );

    assert!(matches!(
        submit_survey(
            &mut persistence,
            &rosa,
            training.training_id,
            survey(5),
            SUBMITTED_AT
        ),
        Err(ApiError::NotEligible { .. })
    ));
}

#[test]
fn test_officer_records_survey_on_behalf_of_worker() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let training: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    add_attendees(
        &mut persistence,
        &officer,
        training.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id],
        },
    )
    .unwrap();
    hold_training_with_attendee(
        &mut persistence,
        &officer,
        training.training_id,
        luis.user_id,
        4,
    );

    let mut request: SubmitSurveyRequest = survey(4);
    request.worker_id = Some(luis.user_id);
    let submitted = submit_survey(
        &mut persistence,
        &officer,
        training.training_id,
        request,
        SUBMITTED_AT,
    )
    .unwrap();
    assert_eq!(submitted.worker_id, luis.user_id);
}

// ============================================================================
// Effectiveness
// ============================================================================

#[test]
fn test_effectiveness_report_over_held_trainings() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);
    let luis = create_test_worker(&mut persistence, "luis@example.com", "Luis", "Producción");
    let rosa = create_test_worker(&mut persistence, "rosa@example.com", "Rosa", "Almacén");
    let held: TrainingInfo = schedule_test_training(&mut persistence, &officer, "CAP-001");
    schedule_test_training(&mut persistence, &officer, "CAP-002");
    add_attendees(
        &mut persistence,
        &officer,
        held.training_id,
        &AddAttendeesRequest {
            worker_ids: vec![luis.user_id, rosa.user_id],
        },
    )
    .unwrap();
    hold_training_with_attendee(&mut persistence, &officer, held.training_id, luis.user_id, 4);
    submit_survey(
        &mut persistence,
        &luis,
        held.training_id,
        survey(4),
        SUBMITTED_AT,
    )
    .unwrap();

    let report = training_effectiveness(&mut persistence, &officer).unwrap();
    assert_eq!(report.total_trainings, 1);
    assert_eq!(report.total_invited, 2);
    assert_eq!(report.total_attended, 1);
    assert!((report.global_attendance_rate - 0.5).abs() < f64::EPSILON);
    assert!((report.global_satisfaction - 4.0).abs() < f64::EPSILON);
    assert_eq!(report.trainings[0].code, "CAP-001");
    assert_eq!(report.trainings[0].date, "2026-02-15");
    assert_eq!(report.trainings[0].survey_count, 1);

    let export = export_effectiveness(&mut persistence, &officer, date!(2026 - 03 - 01)).unwrap();
    assert_eq!(export.file_name, "reporte_efectividad_20260301.csv");
    let lines: Vec<&str> = export.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[1],
        "CAP-001,Uso de extintores,2026-02-15,2,1,0.500,1,4.00"
    );
}
