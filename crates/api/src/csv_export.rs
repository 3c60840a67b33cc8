// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV rendering for the risk matrix, training rosters and the
//! effectiveness report.
//!
//! Each export writes a header row followed by one record per item, in a
//! fixed column order. Headers are in Spanish to match the downloads users
//! already rely on.

use sst_domain::{EffectivenessReport, RiskRecord};
use sst_persistence::RosterEntry;

use crate::error::ApiError;

/// Column headers of the risk matrix export.
pub const RISK_MATRIX_HEADERS: [&str; 15] = [
    "Código",
    "Área",
    "Puesto",
    "Actividad",
    "Peligro",
    "Tipo de Peligro",
    "Probabilidad",
    "Severidad",
    "Nivel (PxS)",
    "Evaluación",
    "Controles",
    "Responsable",
    "Estado",
    "Fecha Evaluación",
    "Próxima Revisión",
];

/// Column headers of the attendee export.
pub const ATTENDEE_HEADERS: [&str; 6] = [
    "ID",
    "Nombre",
    "Área",
    "Asistió",
    "Calificación",
    "Comentarios",
];

/// Column headers of the effectiveness export.
pub const EFFECTIVENESS_HEADERS: [&str; 8] = [
    "Código",
    "Tema",
    "Fecha",
    "Invitados",
    "Asistentes",
    "Tasa Asistencia",
    "Encuestas",
    "Satisfacción",
];

fn render<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> Result<String, ApiError> {
    let mut writer: csv::Writer<Vec<u8>> = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(headers)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to write CSV header: {e}"),
        })?;
    for row in rows {
        writer.write_record(row).map_err(|e| ApiError::Internal {
            message: format!("Failed to write CSV row: {e}"),
        })?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to flush CSV: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV output is not UTF-8: {e}"),
    })
}

/// Renders the risk matrix.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn risk_matrix_csv(records: &[RiskRecord]) -> Result<String, ApiError> {
    let rows: Vec<[String; 15]> = records
        .iter()
        .map(|record| {
            [
                record.code.clone(),
                record.area.name().to_string(),
                record.workstation.clone(),
                record.activity.clone(),
                record.hazard.clone(),
                record.hazard_category.as_str().to_string(),
                record.score.probability().to_string(),
                record.score.severity().to_string(),
                record.score.value().to_string(),
                record.tier().label().to_string(),
                record.controls.clone(),
                record.responsible_id.to_string(),
                record.status.as_str().to_string(),
                record.evaluation_date.to_string(),
                record.next_review.to_string(),
            ]
        })
        .collect();

    render(&RISK_MATRIX_HEADERS, &rows)
}

/// Renders a training's roster.
///
/// A missing rating is written as `N/A`.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn attendees_csv(roster: &[RosterEntry]) -> Result<String, ApiError> {
    let rows: Vec<[String; 6]> = roster
        .iter()
        .map(|entry| {
            [
                entry.attendance.worker_id.to_string(),
                entry.full_name.clone(),
                entry
                    .area
                    .as_ref()
                    .map_or_else(String::new, |a| a.name().to_string()),
                if entry.attendance.attended {
                    String::from("Sí")
                } else {
                    String::from("No")
                },
                entry
                    .attendance
                    .rating
                    .map_or_else(|| String::from("N/A"), |r| r.to_string()),
                entry.attendance.feedback.clone().unwrap_or_default(),
            ]
        })
        .collect();

    render(&ATTENDEE_HEADERS, &rows)
}

/// Renders the training effectiveness report.
///
/// Rates are written with three decimals; trainings without surveys leave
/// the satisfaction column empty.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn effectiveness_csv(report: &EffectivenessReport) -> Result<String, ApiError> {
    let rows: Vec<[String; 8]> = report
        .trainings
        .iter()
        .map(|row| {
            [
                row.code.clone(),
                row.topic.clone(),
                row.date.to_string(),
                row.invited.to_string(),
                row.attended.to_string(),
                format!("{:.3}", row.attendance_rate),
                row.survey_count.to_string(),
                row.mean_rating
                    .map_or_else(String::new, |mean| format!("{mean:.2}")),
            ]
        })
        .collect();

    render(&EFFECTIVENESS_HEADERS, &rows)
}
