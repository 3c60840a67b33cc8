// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod training_tests;

use sst_domain::{
    Area, HazardCategory, RiskRecord, RiskScore, RiskStatus, Role, ScheduleTrainingRequest,
    Training, schedule_training,
};
use time::macros::{date, datetime};

use crate::Persistence;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Creates an SST officer and returns its id.
pub fn create_test_officer(persistence: &mut Persistence) -> i64 {
    persistence
        .create_user(
            "sst@example.com",
            "Oficial SST",
            "password",
            Role::SafetyOfficer,
            None,
        )
        .unwrap()
}

/// Creates a worker in the given area and returns its id.
pub fn create_test_worker(persistence: &mut Persistence, email: &str, name: &str, area: &str) -> i64 {
    persistence
        .create_user(email, name, "password", Role::Worker, Some(&Area::new(area)))
        .unwrap()
}

pub fn create_test_risk(code: &str, responsible_id: i64) -> RiskRecord {
    RiskRecord {
        risk_id: None,
        code: code.to_string(),
        area: Area::new("Producción"),
        workstation: String::from("Operador de prensa"),
        activity: String::from("Alimentación manual"),
        hazard: String::from("Atrapamiento"),
        hazard_category: HazardCategory::Mechanical,
        score: RiskScore::new(4, 4).unwrap(),
        controls: String::from("Guardas fijas"),
        responsible_id,
        status: RiskStatus::Pending,
        evaluation_date: date!(2026 - 01 - 10),
        next_review: date!(2027 - 01 - 10),
    }
}

pub fn create_test_training(code: &str) -> Training {
    schedule_training(ScheduleTrainingRequest {
        code: code.to_string(),
        topic: String::from("Uso de extintores"),
        target_areas: vec![Area::new("Producción"), Area::new("Almacén")],
        scheduled_at: datetime!(2026 - 02 - 15 09:00:00),
        duration_hours: 2,
        instructor: String::from("Ing. Rojas"),
    })
    .unwrap()
}
