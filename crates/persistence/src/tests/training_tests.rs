// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for training, roster, material and survey persistence.

use sst_domain::{
    Area, Attendance, AttendanceUpdate, MaterialKind, Role, Survey, SurveySubmission, Training,
    TrainingStatus, Viewer, add_attendees, mark_training_held, new_material_link,
    record_attendance, submit_survey,
};
use time::macros::{date, datetime};

use super::{create_test_officer, create_test_persistence, create_test_training, create_test_worker};
use crate::{Persistence, PersistenceError};

fn scheduled_training(persistence: &mut Persistence, officer_id: i64) -> Training {
    let training_id = persistence
        .insert_training(&create_test_training("CAP-001"), officer_id)
        .unwrap();
    persistence.get_training(training_id).unwrap().unwrap()
}

#[test]
fn test_insert_and_read_back_training() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);

    let training = scheduled_training(&mut persistence, officer_id);

    assert_eq!(training.code, "CAP-001");
    assert_eq!(training.status, TrainingStatus::Scheduled);
    assert_eq!(training.scheduled_at, datetime!(2026 - 02 - 15 09:00:00));
    assert_eq!(training.duration_hours, 2);
    assert_eq!(
        training.target_areas,
        vec![Area::new("Producción"), Area::new("Almacén")]
    );
}

#[test]
fn test_target_area_names_with_commas_round_trip() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let mut training = create_test_training("CAP-001");
    training.target_areas = vec![Area::new("Planta Norte, Línea 2"), Area::new("Almacén")];

    let training_id = persistence.insert_training(&training, officer_id).unwrap();

    let stored = persistence.get_training(training_id).unwrap().unwrap();
    assert_eq!(stored.target_areas, training.target_areas);
    let listed = persistence.list_trainings(None).unwrap();
    assert_eq!(listed[0].target_areas, training.target_areas);
}

#[test]
fn test_training_without_target_areas_reads_back_empty() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let mut training = create_test_training("CAP-001");
    training.target_areas.clear();

    let training_id = persistence.insert_training(&training, officer_id).unwrap();

    let stored = persistence.get_training(training_id).unwrap().unwrap();
    assert!(stored.target_areas.is_empty());
}

#[test]
fn test_duplicate_training_code_is_unique_violation() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    scheduled_training(&mut persistence, officer_id);

    let result = persistence.insert_training(&create_test_training("CAP-001"), officer_id);

    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
    assert_eq!(persistence.list_training_codes().unwrap(), vec!["CAP-001"]);
}

#[test]
fn test_list_trainings_filters_by_status() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let training = scheduled_training(&mut persistence, officer_id);
    persistence
        .insert_training(&create_test_training("CAP-002"), officer_id)
        .unwrap();

    let held = mark_training_held(&training, date!(2026 - 02 - 15)).unwrap();
    persistence
        .update_training_status(held.training_id.unwrap(), held.status)
        .unwrap();

    assert_eq!(persistence.list_trainings(None).unwrap().len(), 2);
    let held_only = persistence
        .list_trainings(Some(TrainingStatus::Held))
        .unwrap();
    assert_eq!(held_only.len(), 1);
    assert_eq!(held_only[0].code, "CAP-001");
}

#[test]
fn test_roster_insert_is_unique_per_worker() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let worker_id = create_test_worker(&mut persistence, "ana@example.com", "Ana", "Producción");
    let training = scheduled_training(&mut persistence, officer_id);

    let entries = add_attendees(&training, &[], &[worker_id]).unwrap();
    assert_eq!(persistence.insert_attendances(&entries).unwrap(), 1);

    let duplicate = persistence.insert_attendances(&[Attendance::invited(
        training.training_id.unwrap(),
        worker_id,
    )]);
    assert!(matches!(duplicate, Err(PersistenceError::UniqueViolation(_))));

    let existing = persistence
        .list_attendance(training.training_id.unwrap())
        .unwrap();
    let again = add_attendees(&training, &existing, &[worker_id]).unwrap();
    assert!(again.is_empty());
    assert_eq!(persistence.insert_attendances(&again).unwrap(), 0);
}

#[test]
fn test_roster_lists_names_in_order() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let zoe = create_test_worker(&mut persistence, "zoe@example.com", "Zoe", "Almacén");
    let ana = create_test_worker(&mut persistence, "ana@example.com", "Ana", "Producción");
    let training = scheduled_training(&mut persistence, officer_id);
    let entries = add_attendees(&training, &[], &[zoe, ana]).unwrap();
    persistence.insert_attendances(&entries).unwrap();

    let roster = persistence
        .list_roster(training.training_id.unwrap())
        .unwrap();

    let names: Vec<&str> = roster.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Zoe"]);
    assert_eq!(roster[0].area, Some(Area::new("Producción")));
}

#[test]
fn test_record_attendance_round_trips_rating_and_feedback() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let worker_id = create_test_worker(&mut persistence, "ana@example.com", "Ana", "Producción");
    let training = scheduled_training(&mut persistence, officer_id);
    let entries = add_attendees(&training, &[], &[worker_id]).unwrap();
    persistence.insert_attendances(&entries).unwrap();
    let entry = persistence
        .list_attendance(training.training_id.unwrap())
        .unwrap()
        .remove(0);

    let updated = record_attendance(
        &training,
        &entry,
        AttendanceUpdate {
            attended: true,
            rating: 4,
            feedback: String::from("Muy útil"),
        },
        date!(2026 - 02 - 15),
    )
    .unwrap();
    persistence.update_attendance(&updated).unwrap();

    let reread = persistence
        .get_attendance(entry.attendance_id.unwrap())
        .unwrap()
        .unwrap();
    assert!(reread.attended);
    assert_eq!(reread.rating, Some(4));
    assert_eq!(reread.feedback.as_deref(), Some("Muy útil"));
}

#[test]
fn test_materials_add_list_delete() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let training = scheduled_training(&mut persistence, officer_id);
    let training_id = training.training_id.unwrap();

    let link = new_material_link(
        training_id,
        MaterialKind::Guide,
        "",
        "https://example.com/guia.pdf",
        officer_id,
    )
    .unwrap();
    let material_id = persistence.insert_material(&link).unwrap();

    let materials = persistence.list_materials(training_id).unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].kind, MaterialKind::Guide);
    assert_eq!(materials[0].description, "Material externo");

    persistence.delete_material(material_id).unwrap();
    assert!(persistence.list_materials(training_id).unwrap().is_empty());
    assert!(matches!(
        persistence.delete_material(material_id),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_survey_is_unique_per_worker_and_feeds_aggregates() {
    let mut persistence = create_test_persistence();
    let officer_id = create_test_officer(&mut persistence);
    let worker_id = create_test_worker(&mut persistence, "ana@example.com", "Ana", "Producción");
    let training = scheduled_training(&mut persistence, officer_id);
    let training_id = training.training_id.unwrap();
    let entries = add_attendees(&training, &[], &[worker_id]).unwrap();
    persistence.insert_attendances(&entries).unwrap();

    let entry: Attendance = persistence
        .list_attendance(training_id)
        .unwrap()
        .remove(0);
    let attended: Attendance = record_attendance(
        &training,
        &entry,
        AttendanceUpdate {
            attended: true,
            rating: 5,
            feedback: String::new(),
        },
        date!(2026 - 02 - 15),
    )
    .unwrap();
    persistence.update_attendance(&attended).unwrap();

    let held = mark_training_held(&training, date!(2026 - 02 - 16)).unwrap();
    persistence
        .update_training_status(training_id, held.status)
        .unwrap();

    let attendances = persistence.list_attendance(training_id).unwrap();
    let survey: Survey = submit_survey(
        &Viewer::new(worker_id, Role::Worker),
        &held,
        &attendances,
        &[],
        worker_id,
        SurveySubmission {
            rating: 5,
            comments: String::from("Excelente"),
        },
        datetime!(2026 - 02 - 16 10:30:00 UTC),
    )
    .unwrap();
    persistence.insert_survey(&survey).unwrap();

    let duplicate = persistence.insert_survey(&survey);
    assert!(matches!(duplicate, Err(PersistenceError::UniqueViolation(_))));

    let stored = persistence.list_surveys(training_id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].submitted_at, datetime!(2026 - 02 - 16 10:30:00 UTC));

    let aggregates = persistence.list_held_training_aggregates().unwrap();
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].attendances.len(), 1);
    assert_eq!(aggregates[0].surveys.len(), 1);
}
