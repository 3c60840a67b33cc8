// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Training, roster, material and survey mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use sst_domain::{Attendance, MaterialLink, Survey, Training, TrainingStatus};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{format_datetime, format_timestamp};
use crate::diesel_schema::{
    training_areas, training_attendance, training_materials, training_surveys, trainings,
};
use crate::error::PersistenceError;

/// Inserts a newly scheduled training.
///
/// # Errors
///
/// Returns `UniqueViolation` if the code is taken, or another error if the
/// insert fails.
pub fn insert_training(
    conn: &mut SqliteConnection,
    training: &Training,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    info!(
        "Scheduling training {} ({}) at {}",
        training.code, training.topic, training.scheduled_at
    );

    let training_id: i64 = conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(trainings::table)
            .values((
                trainings::code.eq(&training.code),
                trainings::topic.eq(&training.topic),
                trainings::scheduled_at.eq(format_datetime(training.scheduled_at)?),
                trainings::duration_hours.eq(i32::from(training.duration_hours)),
                trainings::instructor.eq(&training.instructor),
                trainings::status.eq(training.status.as_str()),
                trainings::created_by.eq(created_by),
            ))
            .execute(conn)?;

        let training_id: i64 = get_last_insert_rowid(conn)?;

        // `position` preserves the requested area order.
        for (position, area) in (0_i32..).zip(&training.target_areas) {
            diesel::insert_into(training_areas::table)
                .values((
                    training_areas::training_id.eq(training_id),
                    training_areas::position.eq(position),
                    training_areas::area.eq(area.name()),
                ))
                .execute(conn)?;
        }

        Ok(training_id)
    })?;

    info!(training_id, "Training scheduled");
    Ok(training_id)
}

/// Sets the status of a training.
///
/// # Errors
///
/// Returns `NotFound` if no training matches the ID.
pub fn update_training_status(
    conn: &mut SqliteConnection,
    training_id: i64,
    status: TrainingStatus,
) -> Result<(), PersistenceError> {
    info!("Setting training ID {} to status {}", training_id, status);

    let rows_affected: usize = diesel::update(trainings::table)
        .filter(trainings::training_id.eq(training_id))
        .set(trainings::status.eq(status.as_str()))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Training with ID {training_id} not found"
        )));
    }
    Ok(())
}

/// Inserts roster entries in a single transaction.
///
/// # Errors
///
/// Returns an error if any insert fails; no entries are written in that case.
pub fn insert_attendances(
    conn: &mut SqliteConnection,
    entries: &[Attendance],
) -> Result<usize, PersistenceError> {
    if entries.is_empty() {
        return Ok(0);
    }

    conn.transaction::<usize, PersistenceError, _>(|conn| {
        let mut inserted: usize = 0;
        for entry in entries {
            inserted += diesel::insert_into(training_attendance::table)
                .values((
                    training_attendance::training_id.eq(entry.training_id),
                    training_attendance::worker_id.eq(entry.worker_id),
                    training_attendance::attended.eq(i32::from(entry.attended)),
                    training_attendance::rating.eq(entry.rating.map(i32::from)),
                    training_attendance::feedback.eq(entry.feedback.as_deref()),
                ))
                .execute(conn)?;
        }
        info!("Added {} workers to training roster", inserted);
        Ok(inserted)
    })
}

/// Writes the attendance, rating and feedback of a roster entry.
///
/// # Errors
///
/// Returns `NotFound` if the entry has no ID or no row matches it.
pub fn update_attendance(
    conn: &mut SqliteConnection,
    entry: &Attendance,
) -> Result<(), PersistenceError> {
    let attendance_id: i64 = entry
        .attendance_id
        .ok_or_else(|| PersistenceError::NotFound("Attendance entry has no ID".to_string()))?;

    debug!(
        "Recording attendance ID {}: attended={}",
        attendance_id, entry.attended
    );

    let rows_affected: usize = diesel::update(training_attendance::table)
        .filter(training_attendance::attendance_id.eq(attendance_id))
        .set((
            training_attendance::attended.eq(i32::from(entry.attended)),
            training_attendance::rating.eq(entry.rating.map(i32::from)),
            training_attendance::feedback.eq(entry.feedback.as_deref()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Attendance with ID {attendance_id} not found"
        )));
    }
    Ok(())
}

/// Inserts a material link.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_material(
    conn: &mut SqliteConnection,
    material: &MaterialLink,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(training_materials::table)
        .values((
            training_materials::training_id.eq(material.training_id),
            training_materials::kind.eq(material.kind.as_str()),
            training_materials::description.eq(&material.description),
            training_materials::url.eq(&material.url),
            training_materials::uploaded_by.eq(material.uploaded_by),
        ))
        .execute(conn)?;

    let material_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        material_id,
        training_id = material.training_id,
        "Material link added"
    );
    Ok(material_id)
}

/// Deletes a material link.
///
/// # Errors
///
/// Returns `NotFound` if no link matches the ID.
pub fn delete_material(conn: &mut SqliteConnection, material_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(training_materials::table)
        .filter(training_materials::material_id.eq(material_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Material with ID {material_id} not found"
        )));
    }

    info!("Deleted material ID: {}", material_id);
    Ok(())
}

/// Inserts a survey.
///
/// # Errors
///
/// Returns `UniqueViolation` if the worker already answered the survey.
pub fn insert_survey(conn: &mut SqliteConnection, survey: &Survey) -> Result<i64, PersistenceError> {
    diesel::insert_into(training_surveys::table)
        .values((
            training_surveys::training_id.eq(survey.training_id),
            training_surveys::worker_id.eq(survey.worker_id),
            training_surveys::rating.eq(i32::from(survey.rating)),
            training_surveys::comments.eq(survey.comments.as_deref()),
            training_surveys::submitted_at.eq(format_timestamp(survey.submitted_at)?),
        ))
        .execute(conn)?;

    let survey_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        survey_id,
        training_id = survey.training_id,
        worker_id = survey.worker_id,
        "Survey recorded"
    );
    Ok(survey_id)
}
