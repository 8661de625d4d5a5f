use crate::auth::{RequireAuth, RequireStaff};
use crate::error::{ApiError, ApiResult};
use crate::handlers::activity::audit;
use crate::handlers::books::BookResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::order::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storage::activity::ActivityEntry;
use storage::orders::{self, ItemWithBook, LineRequest, NewOrder, OrderWithItems};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// One requested line of a checkout
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct OrderLineRequest {
    pub book_id: i32,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: i32,
}

/// Checkout request body
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 2))]
    pub customer_name: String,
    #[validate(length(min = 8))]
    pub phone: String,
    #[validate(length(min = 5))]
    pub address: String,
    #[validate(length(min = 2))]
    pub city: String,
    /// Shipping zone; unknown or inactive zones ship free
    pub wilaya_code: Option<i32>,
    pub wilaya_name: Option<String>,
    pub baladiya: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderLineRequest>,
}

/// Request body for moving an order to another status
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// `pending`, `confirmed`, `shipped`, `delivered` or `cancelled`
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    /// `null` once the book has been deleted
    pub book_id: Option<i32>,
    pub quantity: i32,
    /// Price per copy captured when the order was placed
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub book: Option<BookResponse>,
}

impl From<ItemWithBook> for OrderItemResponse {
    fn from(line: ItemWithBook) -> Self {
        Self {
            id: line.item.id,
            book_id: line.item.book_id,
            quantity: line.item.quantity,
            unit_price: line.item.unit_price,
            book: line.book.map(BookResponse::from),
        }
    }
}

/// Order response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub wilaya_code: Option<i32>,
    pub wilaya_name: Option<String>,
    pub baladiya: Option<String>,
    #[schema(value_type = String)]
    pub shipping_price: Decimal,
    pub status: String,
    /// Item subtotal plus shipping
    #[schema(value_type = String)]
    pub total: Decimal,
    pub notes: Option<String>,
    pub points_awarded: bool,
    pub points_used: i32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(value: OrderWithItems) -> Self {
        let order = value.order;
        Self {
            id: order.id,
            user_id: order.user_id,
            customer_name: order.customer_name,
            phone: order.phone,
            address: order.address,
            city: order.city,
            wilaya_code: order.wilaya_code,
            wilaya_name: order.wilaya_name,
            baladiya: order.baladiya,
            shipping_price: order.shipping_price,
            status: order.status.as_str().to_string(),
            total: order.total,
            notes: order.notes,
            points_awarded: order.points_awarded,
            points_used: order.points_used,
            created_at: order.created_at,
            items: value.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// Place an order for the signed-in user
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request or unknown book", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Valid(Json(request)): Valid<Json<CreateOrderRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OrderResponse>>)> {
    trace!("Entering create_order function");
    debug!("Placing order with {} lines", request.items.len());

    let placed = orders::place_order(
        &state.db,
        NewOrder {
            user_id: Some(user.id),
            customer_name: request.customer_name,
            phone: request.phone,
            address: request.address,
            city: request.city,
            wilaya_code: request.wilaya_code,
            wilaya_name: request.wilaya_name,
            baladiya: request.baladiya,
            notes: request.notes,
            items: request
                .items
                .iter()
                .map(|line| LineRequest {
                    book_id: line.book_id,
                    quantity: line.quantity,
                })
                .collect(),
        },
    )
    .await?;
    info!("Order {} placed by user {}", placed.order.id, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(OrderResponse::from(placed), "Order placed successfully")),
    ))
}

/// List orders: every order for staff, own orders otherwise
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<ApiResponse<Vec<OrderResponse>>>> {
    trace!("Entering get_orders function");
    let owner = if user.role.is_staff() { None } else { Some(user.id) };

    let found = orders::list_orders(&state.db, owner).await?;
    debug!("Retrieved {} orders", found.len());

    let data = found.into_iter().map(OrderResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Orders retrieved successfully")))
}

/// Get one order. Customers only see their own.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    tag = "orders",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    trace!("Entering get_order function");

    let found = orders::find_order(&state.db, order_id).await?;
    match found {
        Some(found) if user.role.is_staff() || found.order.user_id == Some(user.id) => Ok(Json(
            ApiResponse::new(OrderResponse::from(found), "Order retrieved successfully"),
        )),
        _ => {
            warn!("Order {} not visible to user {}", order_id, user.id);
            Err(ApiError::NotFound("Order"))
        }
    }
}

/// Move an order to another status
///
/// The first move to `confirmed` credits the customer with one point per
/// full 350 DZD of item subtotal.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{order_id}/status",
    tag = "orders",
    params(("order_id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(order_id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateOrderStatusRequest>>,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    trace!("Entering update_order_status function");
    let Some(status) = OrderStatus::parse(&request.status) else {
        warn!("Unknown order status {:?}", request.status);
        return Err(ApiError::BadRequest(format!("Invalid status: {}", request.status)));
    };

    let change = orders::update_status(&state.db, order_id, status).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new(format!("Updated order status to {}", status.as_str())).entity("order", order_id),
    )
    .await?;

    let mut message = "Order status updated successfully".to_string();
    if change.points_awarded > 0 {
        if let Some(customer_id) = change.order.user_id {
            audit(
                &state,
                &staff,
                ActivityEntry::new(format!("Awarded {} points", change.points_awarded))
                    .entity("order", order_id)
                    .details(format!("Customer #{customer_id}")),
            )
            .await?;
        }
        message = format!("{message}; {} points awarded", change.points_awarded);
    }

    let updated = orders::find_order(&state.db, order_id)
        .await?
        .ok_or(ApiError::NotFound("Order"))?;
    info!("Order {} is now {}", order_id, status.as_str());

    Ok(Json(ApiResponse::new(OrderResponse::from(updated), message)))
}

/// Delete an order and its lines
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{order_id}",
    tag = "orders",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted successfully"),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(order_id): Path<i32>,
) -> ApiResult<StatusCode> {
    trace!("Entering delete_order function");

    let order = orders::delete_order(&state.db, order_id).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Deleted order")
            .entity("order", order_id)
            .details(order.customer_name),
    )
    .await?;
    info!("Order {} deleted successfully", order_id);

    Ok(StatusCode::NO_CONTENT)
}
