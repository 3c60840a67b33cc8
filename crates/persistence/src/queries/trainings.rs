// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Training, roster, material and survey queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use sst_domain::{
    Area, Attendance, MaterialKind, MaterialLink, Survey, Training, TrainingAggregate,
    TrainingStatus,
};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::data_models::{
    RosterEntry, column_u8, corrupt, parse_datetime, parse_timestamp,
};
use crate::diesel_schema::{
    training_areas, training_attendance, training_materials, training_surveys, trainings, users,
};
use crate::error::PersistenceError;

/// Diesel Queryable struct for training rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = trainings)]
struct TrainingRow {
    training_id: i64,
    code: String,
    topic: String,
    scheduled_at: String,
    duration_hours: i32,
    instructor: String,
    status: String,
}

impl TrainingRow {
    fn into_training(self, target_areas: Vec<Area>) -> Result<Training, PersistenceError> {
        Ok(Training {
            training_id: Some(self.training_id),
            code: self.code,
            topic: self.topic,
            target_areas,
            scheduled_at: parse_datetime("trainings", &self.scheduled_at)?,
            duration_hours: column_u8("trainings", self.duration_hours)?,
            instructor: self.instructor,
            status: TrainingStatus::from_str(&self.status).map_err(corrupt("trainings"))?,
        })
    }
}

/// Loads the target areas of the given trainings, in requested order.
fn load_target_areas(
    conn: &mut SqliteConnection,
    training_ids: &[i64],
) -> Result<HashMap<i64, Vec<Area>>, PersistenceError> {
    let rows: Vec<(i64, String)> = training_areas::table
        .filter(training_areas::training_id.eq_any(training_ids))
        .select((training_areas::training_id, training_areas::area))
        .order_by((training_areas::training_id.asc(), training_areas::position.asc()))
        .load(conn)?;

    let mut by_training: HashMap<i64, Vec<Area>> = HashMap::new();
    for (training_id, area) in rows {
        by_training
            .entry(training_id)
            .or_default()
            .push(Area::new(&area));
    }
    Ok(by_training)
}

/// Diesel Queryable struct for attendance rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = training_attendance)]
struct AttendanceRow {
    attendance_id: i64,
    training_id: i64,
    worker_id: i64,
    attended: i32,
    rating: Option<i32>,
    feedback: Option<String>,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = PersistenceError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            attendance_id: Some(row.attendance_id),
            training_id: row.training_id,
            worker_id: row.worker_id,
            attended: row.attended != 0,
            rating: row
                .rating
                .map(|r| column_u8("training_attendance", r))
                .transpose()?,
            feedback: row.feedback,
        })
    }
}

/// Diesel Queryable struct for material rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = training_materials)]
struct MaterialRow {
    material_id: i64,
    training_id: i64,
    kind: String,
    description: String,
    url: String,
    uploaded_by: i64,
}

impl TryFrom<MaterialRow> for MaterialLink {
    type Error = PersistenceError;

    fn try_from(row: MaterialRow) -> Result<Self, Self::Error> {
        Ok(Self {
            material_id: Some(row.material_id),
            training_id: row.training_id,
            kind: MaterialKind::from_str(&row.kind).map_err(corrupt("training_materials"))?,
            description: row.description,
            url: row.url,
            uploaded_by: row.uploaded_by,
        })
    }
}

/// Diesel Queryable struct for survey rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = training_surveys)]
struct SurveyRow {
    survey_id: i64,
    training_id: i64,
    worker_id: i64,
    rating: i32,
    comments: Option<String>,
    submitted_at: String,
}

impl TryFrom<SurveyRow> for Survey {
    type Error = PersistenceError;

    fn try_from(row: SurveyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            survey_id: Some(row.survey_id),
            training_id: row.training_id,
            worker_id: row.worker_id,
            rating: column_u8("training_surveys", row.rating)?,
            comments: row.comments,
            submitted_at: parse_timestamp("training_surveys", &row.submitted_at)?,
        })
    }
}

/// Lists trainings, most recently scheduled first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_trainings(
    conn: &mut SqliteConnection,
    status: Option<TrainingStatus>,
) -> Result<Vec<Training>, PersistenceError> {
    debug!("Listing trainings with status filter: {:?}", status);

    let mut query = trainings::table
        .select(TrainingRow::as_select())
        .order_by((trainings::scheduled_at.desc(), trainings::training_id.desc()))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(trainings::status.eq(status.as_str()));
    }

    let rows: Vec<TrainingRow> = query.load(conn)?;
    let ids: Vec<i64> = rows.iter().map(|row| row.training_id).collect();
    let mut areas: HashMap<i64, Vec<Area>> = load_target_areas(conn, &ids)?;

    rows.into_iter()
        .map(|row| {
            let target_areas: Vec<Area> = areas.remove(&row.training_id).unwrap_or_default();
            row.into_training(target_areas)
        })
        .collect()
}

/// Retrieves a training by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
/// Returns `Ok(None)` if the training is not found.
pub fn get_training(
    conn: &mut SqliteConnection,
    training_id: i64,
) -> Result<Option<Training>, PersistenceError> {
    debug!("Looking up training ID: {}", training_id);

    let result: Result<TrainingRow, diesel::result::Error> = trainings::table
        .filter(trainings::training_id.eq(training_id))
        .select(TrainingRow::as_select())
        .first(conn);

    match result {
        Ok(row) => {
            let target_areas: Vec<Area> = load_target_areas(conn, &[training_id])?
                .remove(&training_id)
                .unwrap_or_default();
            row.into_training(target_areas).map(Some)
        }
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists every training code in use.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_training_codes(conn: &mut SqliteConnection) -> Result<Vec<String>, PersistenceError> {
    Ok(trainings::table.select(trainings::code).load(conn)?)
}

/// Lists the roster of a training.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_attendance(
    conn: &mut SqliteConnection,
    training_id: i64,
) -> Result<Vec<Attendance>, PersistenceError> {
    let rows: Vec<AttendanceRow> = training_attendance::table
        .filter(training_attendance::training_id.eq(training_id))
        .select(AttendanceRow::as_select())
        .order_by(training_attendance::attendance_id.asc())
        .load(conn)?;

    rows.into_iter().map(Attendance::try_from).collect()
}

/// Lists the roster of a training with worker names, ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_roster(
    conn: &mut SqliteConnection,
    training_id: i64,
) -> Result<Vec<RosterEntry>, PersistenceError> {
    let rows: Vec<(AttendanceRow, String, Option<String>)> = training_attendance::table
        .inner_join(users::table)
        .filter(training_attendance::training_id.eq(training_id))
        .select((AttendanceRow::as_select(), users::full_name, users::area))
        .order_by((users::full_name.asc(), training_attendance::attendance_id.asc()))
        .load(conn)?;

    rows.into_iter()
        .map(|(row, full_name, area)| {
            Ok(RosterEntry {
                attendance: Attendance::try_from(row)?,
                full_name,
                area: area.as_deref().map(Area::new),
            })
        })
        .collect()
}

/// Retrieves a roster entry by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
/// Returns `Ok(None)` if the entry is not found.
pub fn get_attendance(
    conn: &mut SqliteConnection,
    attendance_id: i64,
) -> Result<Option<Attendance>, PersistenceError> {
    let result: Result<AttendanceRow, diesel::result::Error> = training_attendance::table
        .filter(training_attendance::attendance_id.eq(attendance_id))
        .select(AttendanceRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Attendance::try_from(row).map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists the material links of a training.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_materials(
    conn: &mut SqliteConnection,
    training_id: i64,
) -> Result<Vec<MaterialLink>, PersistenceError> {
    let rows: Vec<MaterialRow> = training_materials::table
        .filter(training_materials::training_id.eq(training_id))
        .select(MaterialRow::as_select())
        .order_by(training_materials::material_id.asc())
        .load(conn)?;

    rows.into_iter().map(MaterialLink::try_from).collect()
}

/// Lists the surveys received for a training.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_surveys(
    conn: &mut SqliteConnection,
    training_id: i64,
) -> Result<Vec<Survey>, PersistenceError> {
    let rows: Vec<SurveyRow> = training_surveys::table
        .filter(training_surveys::training_id.eq(training_id))
        .select(SurveyRow::as_select())
        .order_by(training_surveys::survey_id.asc())
        .load(conn)?;

    rows.into_iter().map(Survey::try_from).collect()
}

/// Loads every held training together with its roster and surveys.
///
/// # Errors
///
/// Returns an error if any query fails or a row cannot be decoded.
pub fn list_held_training_aggregates(
    conn: &mut SqliteConnection,
) -> Result<Vec<TrainingAggregate>, PersistenceError> {
    let held: Vec<Training> = list_trainings(conn, Some(TrainingStatus::Held))?;

    let mut aggregates: Vec<TrainingAggregate> = Vec::with_capacity(held.len());
    for training in held {
        let Some(training_id) = training.training_id else {
            continue;
        };
        let attendances: Vec<Attendance> = list_attendance(conn, training_id)?;
        let surveys: Vec<Survey> = list_surveys(conn, training_id)?;
        aggregates.push(TrainingAggregate {
            training,
            attendances,
            surveys,
        });
    }

    debug!("Loaded {} held training aggregates", aggregates.len());
    Ok(aggregates)
}
