//! Authentication extractors.
//!
//! Identity is a Bearer token carrying the user id. When `AUTH_SECRET` is
//! configured the token must be `<user_id>:<secret>`. WebSocket clients that
//! cannot set headers may pass the same token as `?access_token=`.

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use mccoy_engine::{AdminCapability, Session, SessionUser};
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

/// Header carrying the user's email for display on reservations.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Authenticated user extracted from request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Resolve a bearer token to a user id.
pub fn user_id_from_token(token: &str, secret: Option<&str>) -> Result<String, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token"));
    }

    let user_id = match secret {
        Some(secret) => match token.rsplit_once(':') {
            Some((user_id, given)) if given == secret => user_id,
            _ => return Err(AppError::Unauthorized("Invalid bearer token")),
        },
        None => token,
    };

    if user_id.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token"));
    }
    Ok(user_id.to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = match auth_header {
            Some(header) => header
                .strip_prefix("Bearer ")
                .ok_or(AppError::Unauthorized("Invalid authorization header format"))?
                .to_string(),
            None => Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.access_token)
                .ok_or(AppError::Unauthorized("Missing authorization header"))?,
        };

        let user_id = user_id_from_token(&token, state.config.auth_secret.as_deref())?;

        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(AuthUser { user_id, email })
    }
}

/// An authenticated user whose profile has the admin role.
///
/// The role is read once per request through the engine's [`Session`].
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: AuthUser,
    pub capability: AdminCapability,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let backend = state.backend();
        let session = Session::establish(&backend, user.session_user()).await;
        let capability = session.admin_capability().map_err(|_| {
            tracing::warn!(user_id = %user.user_id, role = %session.role(), "admin access denied");
            AppError::Forbidden("Admin role required".to_string())
        })?;

        Ok(AdminUser { user, capability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_user_id_without_secret() {
        assert_eq!(user_id_from_token("user-1", None).unwrap(), "user-1");
        assert!(user_id_from_token("  ", None).is_err());
    }

    #[test]
    fn token_must_carry_secret_when_configured() {
        assert_eq!(
            user_id_from_token("user-1:s3cret", Some("s3cret")).unwrap(),
            "user-1"
        );
        assert!(user_id_from_token("user-1", Some("s3cret")).is_err());
        assert!(user_id_from_token("user-1:wrong", Some("s3cret")).is_err());
        assert!(user_id_from_token(":s3cret", Some("s3cret")).is_err());
    }

    #[test]
    fn session_user_carries_email() {
        let user = AuthUser {
            user_id: "u1".into(),
            email: Some("ana@example.com".into()),
        };
        assert_eq!(user.session_user().email.as_deref(), Some("ana@example.com"));
    }
}
