// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sst_domain::Role;
use sst_persistence::{Persistence, PersistenceError};

use crate::{
    ApiError, AuthError, AuthenticatedActor, AuthenticationService, CreateAreaRequest,
    CreateUserRequest, LoginRequest, LoginResponse, create_area, create_user, list_areas, login,
    logout, whoami,
};

use super::helpers::{TEST_PASSWORD, create_test_admin, create_test_persistence};

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn user_request(email: &str, role: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        full_name: String::from("Ana Torres"),
        password: String::from(TEST_PASSWORD),
        password_confirmation: String::from(TEST_PASSWORD),
        role: role.to_string(),
        area: Some(String::from("Producción")),
    }
}

// ============================================================================
// Login & sessions
// ============================================================================

#[test]
fn test_login_opens_session_that_validates() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let response: LoginResponse =
        login(&mut persistence, &login_request("admin@example.com", TEST_PASSWORD)).unwrap();
    assert_eq!(response.user_id, admin.user_id);
    assert_eq!(response.role, "admin");
    assert!(response.session_token.starts_with("session_"));

    let actor: AuthenticatedActor =
        AuthenticationService::validate_session(&mut persistence, &response.session_token)
            .unwrap();
    assert_eq!(actor, admin);
}

#[test]
fn test_login_email_is_case_insensitive() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_admin(&mut persistence);

    let result = login(
        &mut persistence,
        &login_request("  ADMIN@Example.com ", TEST_PASSWORD),
    );
    assert!(result.is_ok());
}

#[test]
fn test_login_rejects_wrong_password() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_admin(&mut persistence);

    let result = login(&mut persistence, &login_request("admin@example.com", "nope"));
    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_login_rejects_unknown_email() {
    let mut persistence: Persistence = create_test_persistence();

    let result = login(
        &mut persistence,
        &login_request("nobody@example.com", TEST_PASSWORD),
    );
    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_admin(&mut persistence);

    let response: LoginResponse =
        login(&mut persistence, &login_request("admin@example.com", TEST_PASSWORD)).unwrap();
    logout(&mut persistence, &response.session_token).unwrap();

    let result: Result<AuthenticatedActor, AuthError> =
        AuthenticationService::validate_session(&mut persistence, &response.session_token);
    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_validate_session_rejects_unknown_token() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<AuthenticatedActor, AuthError> =
        AuthenticationService::validate_session(&mut persistence, "session_bogus");
    assert!(result.is_err());
}

#[test]
fn test_store_failures_surface_as_storage_errors() {
    let err: AuthError = AuthenticationService::map_persistence_error(
        PersistenceError::DatabaseError(String::from("disk I/O error")),
    );
    assert!(matches!(err, AuthError::StorageError { .. }));
    assert!(matches!(
        ApiError::from(err),
        ApiError::StorageError { .. }
    ));
}

#[test]
fn test_whoami_reports_identity() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let response = whoami(&admin);
    assert_eq!(response.user_id, admin.user_id);
    assert_eq!(response.email, "admin@example.com");
    assert_eq!(response.role, "admin");
    assert_eq!(response.area, None);
}

// ============================================================================
// Users & areas
// ============================================================================

#[test]
fn test_create_user_then_login() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let created = create_user(
        &mut persistence,
        &admin,
        user_request("Ana@Example.com", "trabajador"),
    )
    .unwrap();
    assert_eq!(created.email, "ana@example.com");
    assert_eq!(created.role, "trabajador");

    let response: LoginResponse =
        login(&mut persistence, &login_request("ana@example.com", TEST_PASSWORD)).unwrap();
    assert_eq!(response.user_id, created.user_id);
    assert_eq!(response.full_name, "Ana Torres");
}

#[test]
fn test_create_user_rejects_weak_password() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let mut request: CreateUserRequest = user_request("ana@example.com", "trabajador");
    request.password = String::from("short");
    request.password_confirmation = String::from("short");

    let result = create_user(&mut persistence, &admin, request);
    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
}

#[test]
fn test_create_user_rejects_unknown_role() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let result = create_user(
        &mut persistence,
        &admin,
        user_request("ana@example.com", "capataz"),
    );
    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "role"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_create_user_rejects_duplicate_email() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    create_user(
        &mut persistence,
        &admin,
        user_request("ana@example.com", "trabajador"),
    )
    .unwrap();
    let result = create_user(
        &mut persistence,
        &admin,
        user_request("ANA@example.com", "supervisor"),
    );
    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { .. })
    ));
}

#[test]
fn test_create_user_rejects_non_admin() {
    let mut persistence: Persistence = create_test_persistence();
    let officer: AuthenticatedActor = super::helpers::create_test_officer(&mut persistence);

    let result = create_user(
        &mut persistence,
        &officer,
        user_request("ana@example.com", "trabajador"),
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_create_area_and_list() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    create_area(
        &mut persistence,
        &admin,
        &CreateAreaRequest {
            name: String::from("Producción"),
        },
    )
    .unwrap();
    create_area(
        &mut persistence,
        &admin,
        &CreateAreaRequest {
            name: String::from("Almacén"),
        },
    )
    .unwrap();

    let areas = list_areas(&mut persistence).unwrap();
    assert_eq!(areas.areas, vec!["Almacén", "Producción"]);
}

#[test]
fn test_create_area_rejects_blank_name() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let result = create_area(
        &mut persistence,
        &admin,
        &CreateAreaRequest {
            name: String::from("   "),
        },
    );
    assert!(matches!(result, Err(ApiError::MissingField { .. })));
}

#[test]
fn test_manager_login_reports_role() {
    let mut persistence: Persistence = create_test_persistence();
    persistence
        .create_user(
            "ger@example.com",
            "Gerente",
            TEST_PASSWORD,
            Role::Manager,
            None,
        )
        .unwrap();

    let response: LoginResponse =
        login(&mut persistence, &login_request("ger@example.com", TEST_PASSWORD)).unwrap();
    assert_eq!(response.role, "gerente");
}
