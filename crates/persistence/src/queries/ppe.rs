// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! PPE catalog and assignment queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use sst_domain::{Area, PpeAssignment, PpeCatalogItem};
use tracing::debug;

use crate::data_models::{AssignmentDetail, column_u16, parse_date};
use crate::diesel_schema::{ppe_assignments, ppe_catalog, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for catalog rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = ppe_catalog)]
struct CatalogRow {
    item_id: i64,
    name: String,
    description: String,
    certification: String,
    lifespan_months: i32,
}

impl TryFrom<CatalogRow> for PpeCatalogItem {
    type Error = PersistenceError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item_id: Some(row.item_id),
            name: row.name,
            description: row.description,
            certification: row.certification,
            lifespan_months: column_u16("ppe_catalog", row.lifespan_months)?,
        })
    }
}

/// Diesel Queryable struct for assignment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = ppe_assignments)]
struct AssignmentRow {
    assignment_id: i64,
    item_id: i64,
    worker_id: i64,
    issue_date: String,
    expiry_date: String,
}

impl TryFrom<AssignmentRow> for PpeAssignment {
    type Error = PersistenceError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            assignment_id: Some(row.assignment_id),
            item_id: row.item_id,
            worker_id: row.worker_id,
            issue_date: parse_date("ppe_assignments", &row.issue_date)?,
            expiry_date: parse_date("ppe_assignments", &row.expiry_date)?,
        })
    }
}

/// Lists the catalog in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_catalog(conn: &mut SqliteConnection) -> Result<Vec<PpeCatalogItem>, PersistenceError> {
    let rows: Vec<CatalogRow> = ppe_catalog::table
        .select(CatalogRow::as_select())
        .order_by(ppe_catalog::item_id.asc())
        .load(conn)?;

    rows.into_iter().map(PpeCatalogItem::try_from).collect()
}

/// Retrieves a catalog item by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
/// Returns `Ok(None)` if the item is not found.
pub fn get_catalog_item(
    conn: &mut SqliteConnection,
    item_id: i64,
) -> Result<Option<PpeCatalogItem>, PersistenceError> {
    debug!("Looking up catalog item ID: {}", item_id);

    let result: Result<CatalogRow, diesel::result::Error> = ppe_catalog::table
        .filter(ppe_catalog::item_id.eq(item_id))
        .select(CatalogRow::as_select())
        .first(conn);

    match result {
        Ok(row) => PpeCatalogItem::try_from(row).map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists all assignments with item and worker details, newest issue first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_assignments(
    conn: &mut SqliteConnection,
) -> Result<Vec<AssignmentDetail>, PersistenceError> {
    let rows: Vec<(AssignmentRow, String, String, Option<String>)> = ppe_assignments::table
        .inner_join(ppe_catalog::table)
        .inner_join(users::table.on(users::user_id.eq(ppe_assignments::worker_id)))
        .select((
            AssignmentRow::as_select(),
            ppe_catalog::name,
            users::full_name,
            users::area,
        ))
        .order_by((
            ppe_assignments::issue_date.desc(),
            ppe_assignments::assignment_id.desc(),
        ))
        .load(conn)?;

    debug!("Loaded {} PPE assignments", rows.len());

    rows.into_iter()
        .map(|(row, item_name, worker_name, worker_area)| {
            Ok(AssignmentDetail {
                assignment: PpeAssignment::try_from(row)?,
                item_name,
                worker_name,
                worker_area: worker_area.as_deref().map(Area::new),
            })
        })
        .collect()
}
