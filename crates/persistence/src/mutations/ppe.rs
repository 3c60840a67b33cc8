// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! PPE catalog and assignment mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use sst_domain::{PpeAssignment, PpeCatalogItem};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_date;
use crate::diesel_schema::{ppe_assignments, ppe_catalog};
use crate::error::PersistenceError;

/// Inserts a catalog item.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_catalog_item(
    conn: &mut SqliteConnection,
    item: &PpeCatalogItem,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(ppe_catalog::table)
        .values((
            ppe_catalog::name.eq(&item.name),
            ppe_catalog::description.eq(&item.description),
            ppe_catalog::certification.eq(&item.certification),
            ppe_catalog::lifespan_months.eq(i32::from(item.lifespan_months)),
        ))
        .execute(conn)?;

    let item_id: i64 = get_last_insert_rowid(conn)?;

    info!(item_id, name = %item.name, "PPE catalog item added");
    Ok(item_id)
}

/// Inserts an assignment.
///
/// # Errors
///
/// Returns an error if the insert fails, including when the item or worker
/// does not exist.
pub fn insert_assignment(
    conn: &mut SqliteConnection,
    assignment: &PpeAssignment,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(ppe_assignments::table)
        .values((
            ppe_assignments::item_id.eq(assignment.item_id),
            ppe_assignments::worker_id.eq(assignment.worker_id),
            ppe_assignments::issue_date.eq(format_date(assignment.issue_date)?),
            ppe_assignments::expiry_date.eq(format_date(assignment.expiry_date)?),
            ppe_assignments::created_by.eq(created_by),
        ))
        .execute(conn)?;

    let assignment_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        assignment_id,
        item_id = assignment.item_id,
        worker_id = assignment.worker_id,
        expiry = %assignment.expiry_date,
        "PPE assigned"
    );
    Ok(assignment_id)
}
