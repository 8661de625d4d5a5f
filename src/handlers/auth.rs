use crate::auth::{
    CurrentUser,
    password::{hash_password, verify_password},
    session::{log_in, log_out},
};
use crate::error::{ApiError, ApiResult};
use crate::handlers::UserResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use model::entities::user::Role;
use serde::{Deserialize, Serialize};
use storage::users::{self, NewUser};
use tower_sessions::Session;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a customer account
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    /// At least 6 characters
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 2))]
    pub name: String,
    pub phone: Option<String>,
}

/// Request body for signing in
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// The account email
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Register a customer account and sign it in
#[utoipa::path(
    post,
    path = "/api/v1/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request or email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Valid(Json(request)): Valid<Json<RegisterRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    trace!("Entering register function");
    debug!("Registering account for {}", request.email);

    let password_hash = hash_password(&request.password)?;
    let user = users::create_user(
        &state.db,
        NewUser {
            email: request.email,
            password_hash,
            role: Role::User,
            name: Some(request.name),
            phone: request.phone,
            address: None,
            city: None,
        },
    )
    .await?;

    log_in(&session, user.id).await?;
    info!("User {} registered and signed in", user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::from(user), "Registered successfully")),
    ))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Invalid credentials or disabled account", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Valid(Json(request)): Valid<Json<LoginRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering login function");

    let Some(user) = users::find_by_email(&state.db, &request.username).await? else {
        warn!("Login attempt for unknown email");
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(&request.password, &user.password) {
        warn!("Wrong password for user {}", user.id);
        return Err(ApiError::InvalidCredentials);
    }
    if !user.enabled {
        warn!("Disabled user {} tried to sign in", user.id);
        return Err(ApiError::InvalidCredentials);
    }

    log_in(&session, user.id).await?;
    info!("User {} signed in", user.id);
    Ok(Json(ApiResponse::new(UserResponse::from(user), "Signed in successfully")))
}

/// Sign out and drop the session
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Signed out successfully")
    )
)]
#[instrument(skip_all)]
pub async fn logout(session: Session) -> ApiResult<Json<ApiResponse<()>>> {
    log_out(&session).await?;
    debug!("Session flushed");
    Ok(Json(ApiResponse::new((), "Signed out successfully")))
}

/// The signed-in user, or `null`
#[utoipa::path(
    get,
    path = "/api/v1/user",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>)
    )
)]
#[instrument(skip_all)]
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<ApiResponse<Option<UserResponse>>> {
    let message = if user.is_some() { "Signed in" } else { "Not signed in" };
    Json(ApiResponse::new(user.map(UserResponse::from), message))
}
