//! Extractors resolving the signed-in user.
//!
//! The user row is reloaded from the database on every request, so role and
//! `enabled` changes take effect immediately. A disabled account counts as
//! signed out.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use model::entities::user;
use tower_sessions::Session;
use tracing::{trace, warn};

use super::session::USER_ID_KEY;
use crate::error::ApiError;
use crate::schemas::AppState;

/// The signed-in user, if any.
pub struct CurrentUser(pub Option<user::Model>);

/// Rejects with 401 "Login required" when nobody is signed in.
pub struct RequireAuth(pub user::Model);

/// Rejects with 401 "Unauthorized" unless the user is an admin or employee.
pub struct RequireStaff(pub user::Model);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Err(ApiError::Session("Session layer missing".to_string()));
        };

        let Some(user_id) = session.get::<i32>(USER_ID_KEY).await? else {
            trace!("Anonymous request");
            return Ok(Self(None));
        };

        match storage::users::find_user(&state.db, user_id).await? {
            Some(user) if user.enabled => Ok(Self(Some(user))),
            Some(_) => {
                warn!("Session of disabled user {} ignored", user_id);
                Ok(Self(None))
            }
            None => {
                warn!("Session refers to missing user {}", user_id);
                Ok(Self(None))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        user.map(Self).ok_or(ApiError::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        match user {
            Some(user) if user.role.is_staff() => Ok(Self(user)),
            Some(user) => {
                warn!("User {} is not staff", user.id);
                Err(ApiError::Unauthorized)
            }
            None => Err(ApiError::Unauthorized),
        }
    }
}
