// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use sst_domain::{Area, Role, Viewer};
use sst_persistence::{Persistence, PersistenceError, SessionData, UserData};
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::error::AuthError;

/// An authenticated user.
///
/// Every API operation receives the caller's identity explicitly through
/// this value; nothing is read from ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's identifier.
    pub user_id: i64,
    /// The user's email.
    pub email: String,
    /// The user's display name.
    pub display_name: String,
    /// The user's role.
    pub role: Role,
    /// The user's area, if assigned.
    pub area: Option<Area>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(
        user_id: i64,
        email: String,
        display_name: String,
        role: Role,
        area: Option<Area>,
    ) -> Self {
        Self {
            user_id,
            email,
            display_name,
            role,
            area,
        }
    }

    /// Returns the identity the domain uses for viewer scoping.
    #[must_use]
    pub const fn viewer(&self) -> Viewer {
        Viewer::new(self.user_id, self.role)
    }

    fn from_user(user: &UserData) -> Result<Self, AuthError> {
        let role: Role =
            Role::from_str(&user.role).map_err(|_| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", user.role),
            })?;
        Ok(Self::new(
            user.user_id,
            user.email.clone(),
            user.full_name.clone(),
            role,
            user.area.as_deref().map(Area::new),
        ))
    }
}

/// Roles allowed to manage the risk matrix.
const RISK_ROLES: &[Role] = &[Role::Admin, Role::SafetyOfficer, Role::Supervisor];

/// Roles allowed to manage trainings.
const TRAINING_ROLES: &[Role] = &[
    Role::Admin,
    Role::SafetyOfficer,
    Role::Supervisor,
    Role::Manager,
];

/// Roles allowed to manage PPE.
const PPE_ROLES: &[Role] = &[Role::Admin, Role::SafetyOfficer, Role::Supervisor];

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(
        actor: &AuthenticatedActor,
        action: &str,
        allowed: &[Role],
    ) -> Result<(), AuthError> {
        if allowed.contains(&actor.role) {
            return Ok(());
        }
        warn!(
            user_id = actor.user_id,
            role = %actor.role,
            action,
            "Authorization denied"
        );
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<&str>>()
                .join("|"),
        })
    }

    /// Checks if an actor may register and update risks.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is admin, sst or supervisor.
    pub fn authorize_manage_risks(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require(actor, action, RISK_ROLES)
    }

    /// Checks if an actor may schedule and run trainings.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is admin, sst, supervisor or gerente.
    pub fn authorize_manage_trainings(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require(actor, action, TRAINING_ROLES)
    }

    /// Checks if an actor may manage the PPE catalog and assignments.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is admin, sst or supervisor.
    pub fn authorize_manage_ppe(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require(actor, action, PPE_ROLES)
    }

    /// Checks if an actor may create users and areas.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an admin.
    pub fn authorize_manage_users(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require(actor, action, &[Role::Admin])
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Verifies credentials and opens a session.
    ///
    /// Expired sessions are purged on every login.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `expires_at`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the account is
    /// inactive, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, String), AuthError> {
        let user: UserData = persistence
            .get_user_by_email(email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!(email, "Login rejected: unknown email");
                Self::invalid_credentials()
            })?;

        if !user.is_active {
            warn!(user_id = user.user_id, "Login rejected: account inactive");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is inactive"),
            });
        }

        let password_ok: bool = Persistence::verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_ok {
            warn!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(Self::invalid_credentials());
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let now_str: String = Self::format_instant(now)?;
        let purged: usize = persistence
            .delete_expired_sessions(&now_str)
            .map_err(Self::map_persistence_error)?;
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }

        let session_token: String = Self::generate_session_token(now);
        let expires_at: String = Self::format_instant(now + Self::DEFAULT_SESSION_EXPIRATION)?;

        persistence
            .create_session(&session_token, user.user_id, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, role = %actor.role, "User logged in");
        Ok((session_token, actor, expires_at))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the user
    /// is missing or inactive.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(&session.expires_at, &Rfc3339)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        if !user.is_active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is inactive"),
            });
        }

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        AuthenticatedActor::from_user(&user)
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;

        Ok(())
    }

    fn generate_session_token(now: OffsetDateTime) -> String {
        format!(
            "session_{}_{:016x}{:016x}",
            now.unix_timestamp_nanos(),
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn format_instant(instant: OffsetDateTime) -> Result<String, AuthError> {
        instant
            .format(&Rfc3339)
            .map_err(|e| AuthError::Internal {
                message: format!("Failed to format timestamp: {e}"),
            })
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        }
    }

    /// Maps a store failure to `AuthError::StorageError`.
    pub(crate) fn map_persistence_error(err: PersistenceError) -> AuthError {
        error!(error = %err, "Store failure during authentication");
        AuthError::StorageError {
            message: err.to_string(),
        }
    }
}
