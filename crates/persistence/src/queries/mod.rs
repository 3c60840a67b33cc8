// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//! Rows are decoded into `sst-domain` types here; a stored value that does
//! not decode surfaces as `PersistenceError::CorruptRow`.
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
