// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Risk matrix queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use sst_domain::{Area, HazardCategory, RiskRecord, RiskScore, RiskStatus};
use std::str::FromStr;
use tracing::debug;

use crate::data_models::{column_u8, corrupt, parse_date};
use crate::diesel_schema::risks;
use crate::error::PersistenceError;

const TABLE: &str = "risks";

/// Diesel Queryable struct for risk rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = risks)]
struct RiskRow {
    risk_id: i64,
    code: String,
    area: String,
    workstation: String,
    activity: String,
    hazard: String,
    hazard_category: String,
    probability: i32,
    severity: i32,
    controls: String,
    responsible_id: i64,
    status: String,
    evaluation_date: String,
    next_review: String,
}

impl TryFrom<RiskRow> for RiskRecord {
    type Error = PersistenceError;

    fn try_from(row: RiskRow) -> Result<Self, Self::Error> {
        let probability: u8 = column_u8(TABLE, row.probability)?;
        let severity: u8 = column_u8(TABLE, row.severity)?;

        Ok(Self {
            risk_id: Some(row.risk_id),
            code: row.code,
            area: Area::new(&row.area),
            workstation: row.workstation,
            activity: row.activity,
            hazard: row.hazard,
            hazard_category: HazardCategory::from_str(&row.hazard_category)
                .map_err(corrupt(TABLE))?,
            score: RiskScore::new(probability, severity).map_err(corrupt(TABLE))?,
            controls: row.controls,
            responsible_id: row.responsible_id,
            status: RiskStatus::from_str(&row.status).map_err(corrupt(TABLE))?,
            evaluation_date: parse_date(TABLE, &row.evaluation_date)?,
            next_review: parse_date(TABLE, &row.next_review)?,
        })
    }
}

/// Lists all risks in registration order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_risks(conn: &mut SqliteConnection) -> Result<Vec<RiskRecord>, PersistenceError> {
    debug!("Listing risks");

    let rows: Vec<RiskRow> = risks::table
        .select(RiskRow::as_select())
        .order_by(risks::risk_id.asc())
        .load(conn)?;

    rows.into_iter().map(RiskRecord::try_from).collect()
}

/// Retrieves a risk by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
/// Returns `Ok(None)` if the risk is not found.
pub fn get_risk(
    conn: &mut SqliteConnection,
    risk_id: i64,
) -> Result<Option<RiskRecord>, PersistenceError> {
    debug!("Looking up risk ID: {}", risk_id);

    let result: Result<RiskRow, diesel::result::Error> = risks::table
        .filter(risks::risk_id.eq(risk_id))
        .select(RiskRow::as_select())
        .first(conn);

    match result {
        Ok(row) => RiskRecord::try_from(row).map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists every risk code in use.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_risk_codes(conn: &mut SqliteConnection) -> Result<Vec<String>, PersistenceError> {
    Ok(risks::table.select(risks::code).load(conn)?)
}
