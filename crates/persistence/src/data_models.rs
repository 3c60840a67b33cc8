// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use sst_domain::{Area, Attendance, PpeAssignment};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::error::PersistenceError;

/// Stored format for calendar dates.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Stored format for local date-times.
pub const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// User account data, including the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
    pub area: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// Session data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A roster entry joined with the worker's name and area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub attendance: Attendance,
    pub full_name: String,
    pub area: Option<Area>,
}

/// A PPE assignment joined with catalog and worker details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDetail {
    pub assignment: PpeAssignment,
    pub item_name: String,
    pub worker_name: String,
    pub worker_area: Option<Area>,
}

pub(crate) fn format_date(date: Date) -> Result<String, PersistenceError> {
    date.format(DATE_FORMAT)
        .map_err(|e| PersistenceError::Other(format!("Failed to format date: {e}")))
}

pub(crate) fn format_datetime(value: PrimitiveDateTime) -> Result<String, PersistenceError> {
    value
        .format(DATETIME_FORMAT)
        .map_err(|e| PersistenceError::Other(format!("Failed to format date-time: {e}")))
}

pub(crate) fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::Other(format!("Failed to format timestamp: {e}")))
}

pub(crate) fn parse_date(table: &'static str, raw: &str) -> Result<Date, PersistenceError> {
    Date::parse(raw, DATE_FORMAT).map_err(|e| PersistenceError::CorruptRow {
        table,
        message: format!("invalid date '{raw}': {e}"),
    })
}

pub(crate) fn parse_datetime(
    table: &'static str,
    raw: &str,
) -> Result<PrimitiveDateTime, PersistenceError> {
    PrimitiveDateTime::parse(raw, DATETIME_FORMAT).map_err(|e| PersistenceError::CorruptRow {
        table,
        message: format!("invalid date-time '{raw}': {e}"),
    })
}

pub(crate) fn parse_timestamp(
    table: &'static str,
    raw: &str,
) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| PersistenceError::CorruptRow {
        table,
        message: format!("invalid timestamp '{raw}': {e}"),
    })
}

pub(crate) fn column_u8(table: &'static str, value: i32) -> Result<u8, PersistenceError> {
    value.to_u8().ok_or_else(|| PersistenceError::CorruptRow {
        table,
        message: format!("value {value} out of range"),
    })
}

pub(crate) fn column_u16(table: &'static str, value: i32) -> Result<u16, PersistenceError> {
    value.to_u16().ok_or_else(|| PersistenceError::CorruptRow {
        table,
        message: format!("value {value} out of range"),
    })
}

/// Wraps a domain parse error as a corrupt-row error.
pub(crate) fn corrupt<E: std::fmt::Display>(
    table: &'static str,
) -> impl FnOnce(E) -> PersistenceError {
    move |e| PersistenceError::CorruptRow {
        table,
        message: e.to_string(),
    }
}
