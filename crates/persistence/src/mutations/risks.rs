// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Risk matrix mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use sst_domain::RiskRecord;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_date;
use crate::diesel_schema::risks;
use crate::error::PersistenceError;

/// Inserts a validated risk record.
///
/// # Errors
///
/// Returns `UniqueViolation` if the code is taken, or another error if the
/// insert fails.
pub fn insert_risk(
    conn: &mut SqliteConnection,
    record: &RiskRecord,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    info!(
        "Registering risk {} in area {} (score {}, {})",
        record.code,
        record.area,
        record.score.value(),
        record.tier()
    );

    diesel::insert_into(risks::table)
        .values((
            risks::code.eq(&record.code),
            risks::area.eq(record.area.name()),
            risks::workstation.eq(&record.workstation),
            risks::activity.eq(&record.activity),
            risks::hazard.eq(&record.hazard),
            risks::hazard_category.eq(record.hazard_category.as_str()),
            risks::probability.eq(i32::from(record.score.probability())),
            risks::severity.eq(i32::from(record.score.severity())),
            risks::controls.eq(&record.controls),
            risks::responsible_id.eq(record.responsible_id),
            risks::status.eq(record.status.as_str()),
            risks::evaluation_date.eq(format_date(record.evaluation_date)?),
            risks::next_review.eq(format_date(record.next_review)?),
            risks::created_by.eq(created_by),
        ))
        .execute(conn)?;

    let risk_id: i64 = get_last_insert_rowid(conn)?;

    info!(risk_id, "Risk registered");
    Ok(risk_id)
}

/// Writes the status and controls of an existing risk.
///
/// # Errors
///
/// Returns `NotFound` if the record has no ID or no row matches it.
pub fn update_risk(conn: &mut SqliteConnection, record: &RiskRecord) -> Result<(), PersistenceError> {
    let risk_id: i64 = record
        .risk_id
        .ok_or_else(|| PersistenceError::NotFound(format!("Risk '{}' has no ID", record.code)))?;

    info!("Updating risk ID {} to status {}", risk_id, record.status);

    let rows_affected: usize = diesel::update(risks::table)
        .filter(risks::risk_id.eq(risk_id))
        .set((
            risks::status.eq(record.status.as_str()),
            risks::controls.eq(&record.controls),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Risk with ID {risk_id} not found"
        )));
    }
    Ok(())
}
