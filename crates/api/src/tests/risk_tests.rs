// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sst_persistence::Persistence;
use time::macros::date;

use crate::{
    ApiError, AuthenticatedActor, CreateRiskRequest, ListRisksRequest, RiskResponse,
    UpdateRiskRequest, create_risk, export_risk_matrix, list_risks, risk_dashboard, update_risk,
};

use super::helpers::{create_risk_request, create_test_officer, create_test_persistence};

#[test]
fn test_create_risk_scores_and_defaults() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let response: RiskResponse = create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", officer.user_id),
    )
    .unwrap();

    assert_eq!(response.risk.score, 16);
    assert_eq!(response.risk.tier, "Riesgo Alto");
    assert_eq!(response.risk.status, "pendiente");
    assert_eq!(response.risk.hazard_category, "Mecánico");
    assert_eq!(response.risk.evaluation_date, "2026-01-10");
    assert_eq!(response.risk.next_review, "2027-01-10");
}

#[test]
fn test_create_risk_rejects_duplicate_code() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", officer.user_id),
    )
    .unwrap();
    let result = create_risk(
        &mut persistence,
        &officer,
        create_risk_request(" RIE-001 ", officer.user_id),
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "unique_risk_code"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_create_risk_rejects_out_of_scale_probability() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let mut request: CreateRiskRequest = create_risk_request("RIE-001", officer.user_id);
    request.probability = 6;

    match create_risk(&mut persistence, &officer, request) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "probability"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_create_risk_rejects_unknown_responsible() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    match create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", 9999),
    ) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "responsible_id"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_create_risk_rejects_bad_date_and_category() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let mut request: CreateRiskRequest = create_risk_request("RIE-001", officer.user_id);
    request.evaluation_date = String::from("10/01/2026");
    assert!(matches!(
        create_risk(&mut persistence, &officer, request),
        Err(ApiError::InvalidInput { .. })
    ));

    let mut request: CreateRiskRequest = create_risk_request("RIE-002", officer.user_id);
    request.hazard_category = String::from("Cósmico");
    match create_risk(&mut persistence, &officer, request) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "hazard_category"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_list_risks_filters_by_area_and_tier() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", officer.user_id),
    )
    .unwrap();
    let mut low: CreateRiskRequest = create_risk_request("RIE-002", officer.user_id);
    low.area = String::from("Almacén");
    low.probability = 2;
    low.severity = 3;
    create_risk(&mut persistence, &officer, low).unwrap();

    let all = list_risks(&mut persistence, &officer, &ListRisksRequest::default()).unwrap();
    assert_eq!(all.risks.len(), 2);

    let high = list_risks(
        &mut persistence,
        &officer,
        &ListRisksRequest {
            area: None,
            tier: Some(String::from("high")),
        },
    )
    .unwrap();
    assert_eq!(high.risks.len(), 1);
    assert_eq!(high.risks[0].code, "RIE-001");

    let almacen = list_risks(
        &mut persistence,
        &officer,
        &ListRisksRequest {
            area: Some(String::from("Almacén")),
            tier: Some(String::from("Riesgo Bajo")),
        },
    )
    .unwrap();
    assert_eq!(almacen.risks.len(), 1);
    assert_eq!(almacen.risks[0].score, 6);

    assert!(matches!(
        list_risks(
            &mut persistence,
            &officer,
            &ListRisksRequest {
                area: None,
                tier: Some(String::from("extreme")),
            },
        ),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_update_risk_moves_forward_only() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let risk_id: i64 = create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", officer.user_id),
    )
    .unwrap()
    .risk
    .risk_id;

    let updated: RiskResponse = update_risk(
        &mut persistence,
        &officer,
        risk_id,
        UpdateRiskRequest {
            status: Some(String::from("en_mitigacion")),
            controls: Some(String::from("Guardas y bloqueo")),
        },
    )
    .unwrap();
    assert_eq!(updated.risk.status, "en_mitigacion");
    assert_eq!(updated.risk.controls, "Guardas y bloqueo");

    let result = update_risk(
        &mut persistence,
        &officer,
        risk_id,
        UpdateRiskRequest {
            status: Some(String::from("pendiente")),
            controls: None,
        },
    );
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "forward_transition"),
        other => panic!("expected DomainRuleViolation, got {other:?}"),
    }

    let stored = persistence.get_risk(risk_id).unwrap().unwrap();
    assert_eq!(stored.status.as_str(), "en_mitigacion");
}

#[test]
fn test_update_missing_risk_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    let result = update_risk(
        &mut persistence,
        &officer,
        42,
        UpdateRiskRequest::default(),
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_risk_dashboard_counts() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", officer.user_id),
    )
    .unwrap();
    let mut medium: CreateRiskRequest = create_risk_request("RIE-002", officer.user_id);
    medium.probability = 3;
    medium.severity = 3;
    medium.status = Some(String::from("controlado"));
    create_risk(&mut persistence, &officer, medium).unwrap();

    let dashboard = risk_dashboard(&mut persistence, &officer).unwrap();
    assert_eq!(dashboard.summary.total, 2);
    assert_eq!(dashboard.summary.by_tier.high, 1);
    assert_eq!(dashboard.summary.by_tier.medium, 1);
    assert_eq!(dashboard.summary.by_status.controlled, 1);
    assert_eq!(dashboard.heatmap[3][3], 1);
    assert_eq!(dashboard.heatmap[2][2], 1);
    assert_eq!(dashboard.status_by_area.len(), 1);
}

#[test]
fn test_export_risk_matrix_names_file_by_date() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = create_test_officer(&mut persistence);

    create_risk(
        &mut persistence,
        &officer,
        create_risk_request("RIE-001", officer.user_id),
    )
    .unwrap();

    let export = export_risk_matrix(
        &mut persistence,
        &officer,
        &ListRisksRequest::default(),
        date!(2026 - 03 - 05),
    )
    .unwrap();
    assert_eq!(export.file_name, "matriz_iperc_20260305.csv");
    let lines: Vec<&str> = export.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Código,Área,Puesto"));
    assert!(lines[1].starts_with("RIE-001,Producción"));
    assert!(lines[1].contains("Riesgo Alto"));
}
