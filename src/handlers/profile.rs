use crate::auth::RequireAuth;
use crate::error::ApiResult;
use crate::handlers::UserResponse;
use crate::handlers::customers::rehash_if_valid;
use crate::handlers::orders::OrderResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, response::Json};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use storage::{
    orders,
    users::{self, UserChanges},
};
use tracing::{debug, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Fields a customer may change on their own account
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// Re-hashed when at least 6 characters, ignored otherwise
    pub password: Option<String>,
}

/// The signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn get_profile(RequireAuth(user): RequireAuth) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::new(UserResponse::from(user), "Profile retrieved successfully"))
}

/// Update the signed-in user's profile
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Valid(Json(request)): Valid<Json<UpdateProfileRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_profile function");
    let password_hash = rehash_if_valid(request.password.as_deref())?;

    let updated = users::update_user(
        &state.db,
        user.id,
        UserChanges {
            password_hash,
            name: request.name,
            phone: request.phone,
            address: request.address,
            city: request.city,
            ..Default::default()
        },
    )
    .await?;
    debug!("Profile of user {} updated", updated.id);

    Ok(Json(ApiResponse::new(
        UserResponse::from(updated),
        "Profile updated successfully",
    )))
}

/// The signed-in user's orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/profile/orders",
    tag = "profile",
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_profile_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<ApiResponse<Vec<OrderResponse>>>> {
    let found = orders::list_orders(&state.db, Some(user.id)).await?;
    let data = found.into_iter().map(OrderResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Orders retrieved successfully")))
}
