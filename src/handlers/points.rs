use crate::auth::{RequireAuth, RequireStaff};
use crate::error::ApiResult;
use crate::handlers::UserResponse;
use crate::handlers::activity::audit;
use crate::handlers::orders::OrderResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use storage::activity::ActivityEntry;
use storage::{points, users};
use tracing::{info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for exchanging points for a book
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RedeemPointsRequest {
    pub book_id: i32,
    /// Defaults to 1
    #[validate(range(min = 1, max = 10000))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedemptionResponse {
    pub points_used: i32,
    pub remaining_points: i32,
    pub order: OrderResponse,
}

/// Request body for overwriting a customer's balance
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SetPointsRequest {
    #[validate(range(min = 0))]
    pub points: i32,
}

/// Redeem loyalty points for a book
///
/// Costs one point per started 350 DZD of the book price, per copy. The book
/// is recorded as a free order.
#[utoipa::path(
    post,
    path = "/api/v1/points/redeem",
    tag = "points",
    request_body = RedeemPointsRequest,
    responses(
        (status = 200, description = "Points redeemed successfully", body = ApiResponse<RedemptionResponse>),
        (status = 400, description = "Not enough points", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn redeem_points(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Valid(Json(request)): Valid<Json<RedeemPointsRequest>>,
) -> ApiResult<Json<ApiResponse<RedemptionResponse>>> {
    trace!("Entering redeem_points function");
    let quantity = request.quantity.unwrap_or(1);

    let redemption = points::redeem(&state.db, user.id, request.book_id, quantity).await?;
    info!(
        "User {} redeemed {} points, {} left",
        user.id, redemption.points_used, redemption.remaining_points
    );

    Ok(Json(ApiResponse::new(
        RedemptionResponse {
            points_used: redemption.points_used,
            remaining_points: redemption.remaining_points,
            order: OrderResponse::from(redemption.order),
        },
        "Points redeemed successfully",
    )))
}

/// Set a customer's points balance
#[utoipa::path(
    put,
    path = "/api/v1/admin/customers/{user_id}/points",
    tag = "points",
    params(("user_id" = i32, Path, description = "Customer ID")),
    request_body = SetPointsRequest,
    responses(
        (status = 200, description = "Points updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid balance", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn set_customer_points(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<i32>,
    Valid(Json(request)): Valid<Json<SetPointsRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering set_customer_points function");

    let customer = users::set_points(&state.db, user_id, request.points).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new(format!("Set points to {}", request.points))
            .entity("user", user_id)
            .details(customer.email.clone()),
    )
    .await?;

    Ok(Json(ApiResponse::new(
        UserResponse::from(customer),
        "Points updated successfully",
    )))
}
