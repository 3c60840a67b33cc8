// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the SST compliance system.
//!
//! This crate stores users, sessions, risk assessments, trainings (with
//! rosters, material links and surveys) and PPE records in `SQLite` through
//! Diesel. Rows are decoded into `sst-domain` types at the query boundary;
//! no business rules live here beyond the schema's UNIQUE and foreign key
//! constraints.
//!
//! ## Testing Philosophy
//!
//! - Tests run against isolated shared in-memory databases
//! - Each `Persistence::new_in_memory()` call gets its own database

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use sst_domain::{
    Area, Attendance, MaterialLink, PpeAssignment, PpeCatalogItem, RiskRecord, Role, Survey,
    Training, TrainingAggregate, TrainingStatus, Worker,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AssignmentDetail, DATE_FORMAT, DATETIME_FORMAT, RosterEntry, SessionData, UserData,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the SST store.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared in-memory database, so tests are
    /// isolated from one another.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_sst_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Users, Sessions & Areas
    // ========================================================================

    /// Creates a user with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the email is taken.
    pub fn create_user(
        &mut self,
        email: &str,
        full_name: &str,
        password: &str,
        role: Role,
        area: Option<&Area>,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, email, full_name, password, role, area)
    }

    /// Retrieves a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_email(&mut self.conn, email)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Lists active users as domain workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_workers(&mut self) -> Result<Vec<Worker>, PersistenceError> {
        queries::users::list_active_workers(&mut self.conn)
    }

    /// Counts all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        mutations::users::update_last_login(&mut self.conn, user_id)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(&mut self.conn, session_token, user_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Touches a session's activity timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::users::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, now)
    }

    /// Adds an area to the master list.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the area exists.
    pub fn create_area(&mut self, area: &Area) -> Result<i64, PersistenceError> {
        mutations::users::create_area(&mut self.conn, area)
    }

    /// Lists the area master list.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_areas(&mut self) -> Result<Vec<Area>, PersistenceError> {
        queries::users::list_areas(&mut self.conn)
    }

    // ========================================================================
    // Risks
    // ========================================================================

    /// Inserts a validated risk record.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the code is taken.
    pub fn insert_risk(
        &mut self,
        record: &RiskRecord,
        created_by: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::risks::insert_risk(&mut self.conn, record, created_by)
    }

    /// Writes a risk's status and controls.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the risk does not exist.
    pub fn update_risk(&mut self, record: &RiskRecord) -> Result<(), PersistenceError> {
        mutations::risks::update_risk(&mut self.conn, record)
    }

    /// Lists all risks.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_risks(&mut self) -> Result<Vec<RiskRecord>, PersistenceError> {
        queries::risks::list_risks(&mut self.conn)
    }

    /// Retrieves a risk by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_risk(&mut self, risk_id: i64) -> Result<Option<RiskRecord>, PersistenceError> {
        queries::risks::get_risk(&mut self.conn, risk_id)
    }

    /// Lists every risk code in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_risk_codes(&mut self) -> Result<Vec<String>, PersistenceError> {
        queries::risks::list_risk_codes(&mut self.conn)
    }

    // ========================================================================
    // Trainings
    // ========================================================================

    /// Inserts a scheduled training.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the code is taken.
    pub fn insert_training(
        &mut self,
        training: &Training,
        created_by: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::trainings::insert_training(&mut self.conn, training, created_by)
    }

    /// Sets a training's status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist.
    pub fn update_training_status(
        &mut self,
        training_id: i64,
        status: TrainingStatus,
    ) -> Result<(), PersistenceError> {
        mutations::trainings::update_training_status(&mut self.conn, training_id, status)
    }

    /// Lists trainings, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_trainings(
        &mut self,
        status: Option<TrainingStatus>,
    ) -> Result<Vec<Training>, PersistenceError> {
        queries::trainings::list_trainings(&mut self.conn, status)
    }

    /// Retrieves a training by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_training(&mut self, training_id: i64) -> Result<Option<Training>, PersistenceError> {
        queries::trainings::get_training(&mut self.conn, training_id)
    }

    /// Lists every training code in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_training_codes(&mut self) -> Result<Vec<String>, PersistenceError> {
        queries::trainings::list_training_codes(&mut self.conn)
    }

    /// Inserts roster entries atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub fn insert_attendances(&mut self, entries: &[Attendance]) -> Result<usize, PersistenceError> {
        mutations::trainings::insert_attendances(&mut self.conn, entries)
    }

    /// Writes a roster entry's attendance details.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub fn update_attendance(&mut self, entry: &Attendance) -> Result<(), PersistenceError> {
        mutations::trainings::update_attendance(&mut self.conn, entry)
    }

    /// Lists a training's roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_attendance(
        &mut self,
        training_id: i64,
    ) -> Result<Vec<Attendance>, PersistenceError> {
        queries::trainings::list_attendance(&mut self.conn, training_id)
    }

    /// Lists a training's roster with worker names.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_roster(&mut self, training_id: i64) -> Result<Vec<RosterEntry>, PersistenceError> {
        queries::trainings::list_roster(&mut self.conn, training_id)
    }

    /// Retrieves a roster entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_attendance(
        &mut self,
        attendance_id: i64,
    ) -> Result<Option<Attendance>, PersistenceError> {
        queries::trainings::get_attendance(&mut self.conn, attendance_id)
    }

    /// Inserts a material link.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_material(&mut self, material: &MaterialLink) -> Result<i64, PersistenceError> {
        mutations::trainings::insert_material(&mut self.conn, material)
    }

    /// Lists a training's material links.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_materials(
        &mut self,
        training_id: i64,
    ) -> Result<Vec<MaterialLink>, PersistenceError> {
        queries::trainings::list_materials(&mut self.conn, training_id)
    }

    /// Deletes a material link.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the link does not exist.
    pub fn delete_material(&mut self, material_id: i64) -> Result<(), PersistenceError> {
        mutations::trainings::delete_material(&mut self.conn, material_id)
    }

    /// Inserts a survey.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the worker already answered.
    pub fn insert_survey(&mut self, survey: &Survey) -> Result<i64, PersistenceError> {
        mutations::trainings::insert_survey(&mut self.conn, survey)
    }

    /// Lists a training's surveys.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_surveys(&mut self, training_id: i64) -> Result<Vec<Survey>, PersistenceError> {
        queries::trainings::list_surveys(&mut self.conn, training_id)
    }

    /// Loads every held training with its roster and surveys.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub fn list_held_training_aggregates(
        &mut self,
    ) -> Result<Vec<TrainingAggregate>, PersistenceError> {
        queries::trainings::list_held_training_aggregates(&mut self.conn)
    }

    // ========================================================================
    // PPE
    // ========================================================================

    /// Inserts a catalog item.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_catalog_item(&mut self, item: &PpeCatalogItem) -> Result<i64, PersistenceError> {
        mutations::ppe::insert_catalog_item(&mut self.conn, item)
    }

    /// Lists the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_catalog(&mut self) -> Result<Vec<PpeCatalogItem>, PersistenceError> {
        queries::ppe::list_catalog(&mut self.conn)
    }

    /// Retrieves a catalog item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_catalog_item(
        &mut self,
        item_id: i64,
    ) -> Result<Option<PpeCatalogItem>, PersistenceError> {
        queries::ppe::get_catalog_item(&mut self.conn, item_id)
    }

    /// Inserts an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_assignment(
        &mut self,
        assignment: &PpeAssignment,
        created_by: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::ppe::insert_assignment(&mut self.conn, assignment, created_by)
    }

    /// Lists assignments with item and worker details.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_assignments(&mut self) -> Result<Vec<AssignmentDetail>, PersistenceError> {
        queries::ppe::list_assignments(&mut self.conn)
    }
}
