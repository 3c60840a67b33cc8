// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod ppe;
mod reporting;
mod risk;
mod training;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use ppe::{
    DAYS_PER_LIFESPAN_MONTH, DEFAULT_LIFESPAN_MONTHS, EXPIRING_SOON_WINDOW_DAYS, ExpiryTier,
    PpeAssignment, PpeCatalogItem, build_assignment, classify_expiry, expected_expiry,
};
pub use reporting::{
    AreaExpiryCounts, AreaStatusCounts, EffectivenessReport, ExpiryCounts, HEATMAP_SIZE,
    PpeSummary, RiskSummary, StatusCounts, TierCounts, TrainingAggregate, TrainingEffectiveness,
    ppe_tier_by_area, risk_heatmap, status_by_area, summarize_ppe, summarize_risks,
    summarize_training_effectiveness,
};
pub use risk::{
    HazardCategory, LOW_RISK_MAX, MEDIUM_RISK_MAX, RiskFilter, RiskRecord, RiskScore, RiskStatus,
    RiskSubmission, RiskTier, apply_risk_update, score, validate_risk_submission,
};
pub use training::{
    Attendance, AttendanceUpdate, DEFAULT_MATERIAL_DESCRIPTION, MaterialKind, MaterialLink,
    ScheduleTrainingRequest, Survey, SurveyLookup, SurveySubmission, Training, TrainingStatus,
    add_attendees, authorize_survey_viewer, candidate_attendees, is_attendance_open,
    lookup_survey, mark_training_held, new_material_link, record_attendance, schedule_training,
    submit_survey,
};
pub use types::{Area, Role, Viewer, Worker};
pub use validation::{
    SCALE_MAX, SCALE_MIN, require_non_blank, validate_code_unique, validate_scale,
};
