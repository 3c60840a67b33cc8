// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use sst_domain::{Area, Role};
use sst_persistence::Persistence;
use time::Date;
use time::macros::date;

use crate::{
    AuthenticatedActor, CreateRiskRequest, CreateTrainingRequest, RecordAttendanceRequest,
    TrainingInfo, mark_training_held, record_attendance, schedule_training,
};

/// A password that satisfies the default policy.
pub const TEST_PASSWORD: &str = "Segur1dad#2026";

/// The day the fixture training takes place.
pub const TRAINING_DAY: Date = date!(2026 - 02 - 15);

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Creates a user directly in the store and returns the matching actor.
pub fn create_actor(
    persistence: &mut Persistence,
    email: &str,
    name: &str,
    role: Role,
    area: Option<&str>,
) -> AuthenticatedActor {
    let area: Option<Area> = area.map(Area::new);
    let user_id: i64 = persistence
        .create_user(email, name, TEST_PASSWORD, role, area.as_ref())
        .unwrap();
    AuthenticatedActor::new(user_id, email.to_string(), name.to_string(), role, area)
}

pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "admin@example.com", "Administrador", Role::Admin, None)
}

pub fn create_test_officer(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(
        persistence,
        "sst@example.com",
        "Oficial SST",
        Role::SafetyOfficer,
        None,
    )
}

pub fn create_test_worker(
    persistence: &mut Persistence,
    email: &str,
    name: &str,
    area: &str,
) -> AuthenticatedActor {
    create_actor(persistence, email, name, Role::Worker, Some(area))
}

pub fn create_risk_request(code: &str, responsible_id: i64) -> CreateRiskRequest {
    CreateRiskRequest {
        code: code.to_string(),
        area: String::from("Producción"),
        workstation: String::from("Operador de prensa"),
        activity: String::from("Alimentación manual"),
        hazard: String::from("Atrapamiento"),
        hazard_category: String::from("Mecánico"),
        probability: 4,
        severity: 4,
        controls: String::from("Guardas fijas"),
        responsible_id,
        status: None,
        evaluation_date: String::from("2026-01-10"),
        next_review: None,
    }
}

pub fn create_training_request(code: &str) -> CreateTrainingRequest {
    CreateTrainingRequest {
        code: code.to_string(),
        topic: String::from("Uso de extintores"),
        target_areas: vec![String::from("Producción"), String::from("Almacén")],
        scheduled_at: String::from("2026-02-15 09:00:00"),
        duration_hours: 2,
        instructor: String::from("Ing. Rojas"),
    }
}

/// Schedules the fixture training and returns it.
pub fn schedule_test_training(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    code: &str,
) -> TrainingInfo {
    schedule_training(persistence, actor, create_training_request(code))
        .unwrap()
        .0
        .training
}

/// Records `worker_id` as attended with `rating` and marks the training held.
pub fn hold_training_with_attendee(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    training_id: i64,
    worker_id: i64,
    rating: u8,
) {
    let attendance_id: i64 = persistence
        .list_attendance(training_id)
        .unwrap()
        .into_iter()
        .find(|a| a.worker_id == worker_id)
        .and_then(|a| a.attendance_id)
        .unwrap();
    record_attendance(
        persistence,
        actor,
        attendance_id,
        RecordAttendanceRequest {
            attended: true,
            rating,
            feedback: String::new(),
        },
        TRAINING_DAY,
    )
    .unwrap();
    mark_training_held(persistence, actor, training_id, TRAINING_DAY).unwrap();
}
