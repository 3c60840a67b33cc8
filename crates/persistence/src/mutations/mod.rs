// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Mutations use Diesel DSL, with `last_insert_rowid()` imported from the
//! `backend` module.
//!
//! ## Module Organization
//!
//! - `users`: Users, sessions and the area master list
//! - `risks`: Risk matrix rows
//! - `trainings`: Trainings, rosters, material links and surveys
//! - `ppe`: PPE catalog and assignments

pub mod ppe;
pub mod risks;
pub mod trainings;
pub mod users;
