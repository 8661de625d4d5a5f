use crate::auth::{RequireStaff, password::hash_password};
use crate::error::{ApiError, ApiResult};
use crate::handlers::UserResponse;
use crate::handlers::activity::audit;
use crate::handlers::orders::OrderResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::user::Role;
use serde::{Deserialize, Serialize};
use storage::activity::ActivityEntry;
use storage::{
    orders,
    users::{self, NewUser, UserChanges},
};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Shortest password accepted on create or change.
pub(crate) const MIN_PASSWORD_LEN: usize = 6;

/// Request body for creating a customer from the back office
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 2))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Partial update of a customer account
///
/// `role` is applied only when it names a known role. `password` is
/// re-hashed when it has at least 6 characters and ignored otherwise.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    pub enabled: Option<bool>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Hash `password` when it is long enough to be accepted.
pub(crate) fn rehash_if_valid(password: Option<&str>) -> ApiResult<Option<String>> {
    match password {
        Some(password) if password.chars().count() >= MIN_PASSWORD_LEN => {
            Ok(Some(hash_password(password)?))
        }
        Some(_) => {
            debug!("Ignoring password shorter than {} characters", MIN_PASSWORD_LEN);
            Ok(None)
        }
        None => Ok(None),
    }
}

/// List every account
#[utoipa::path(
    get,
    path = "/api/v1/admin/customers",
    tag = "customers",
    responses(
        (status = 200, description = "Customers retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 401, description = "Staff only", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn get_customers(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    trace!("Entering get_customers function");
    let found = users::list_users(&state.db).await?;
    debug!("Retrieved {} accounts", found.len());

    let data = found.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Customers retrieved successfully")))
}

/// Get one account
#[utoipa::path(
    get,
    path = "/api/v1/admin/customers/{user_id}",
    tag = "customers",
    params(("user_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn get_customer(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering get_customer function");
    let customer = users::find_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(ApiResponse::new(
        UserResponse::from(customer),
        "Customer retrieved successfully",
    )))
}

/// Orders placed by one customer
#[utoipa::path(
    get,
    path = "/api/v1/admin/customers/{user_id}/orders",
    tag = "customers",
    params(("user_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn get_customer_orders(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<OrderResponse>>>> {
    trace!("Entering get_customer_orders function");
    if users::find_user(&state.db, user_id).await?.is_none() {
        warn!("Customer {} not found", user_id);
        return Err(ApiError::NotFound("User"));
    }

    let found = orders::list_orders(&state.db, Some(user_id)).await?;
    let data = found.into_iter().map(OrderResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Orders retrieved successfully")))
}

/// Create a customer account
#[utoipa::path(
    post,
    path = "/api/v1/admin/customers",
    tag = "customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request or email already registered", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff, request), fields(staff_id = staff.id))]
pub async fn create_customer(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Valid(Json(request)): Valid<Json<CreateCustomerRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    trace!("Entering create_customer function");

    let password_hash = hash_password(&request.password)?;
    let customer = users::create_user(
        &state.db,
        NewUser {
            email: request.email,
            password_hash,
            role: Role::User,
            name: Some(request.name),
            phone: request.phone,
            address: request.address,
            city: request.city,
        },
    )
    .await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Created customer")
            .entity("user", customer.id)
            .details(customer.email.clone()),
    )
    .await?;
    info!("Customer created successfully with ID: {}", customer.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            UserResponse::from(customer),
            "Customer created successfully",
        )),
    ))
}

/// Update a customer account
#[utoipa::path(
    put,
    path = "/api/v1/admin/customers/{user_id}",
    tag = "customers",
    params(("user_id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff, request), fields(staff_id = staff.id))]
pub async fn update_customer(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateCustomerRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_customer function");

    let role = request.role.as_deref().and_then(|name| {
        let parsed = Role::parse(name);
        if parsed.is_none() {
            warn!("Ignoring unknown role {:?}", name);
        }
        parsed
    });
    let password_hash = rehash_if_valid(request.password.as_deref())?;

    let customer = users::update_user(
        &state.db,
        user_id,
        UserChanges {
            email: request.email,
            password_hash,
            role,
            enabled: request.enabled,
            name: request.name,
            phone: request.phone,
            address: request.address,
            city: request.city,
        },
    )
    .await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Updated customer")
            .entity("user", customer.id)
            .details(customer.email.clone()),
    )
    .await?;

    Ok(Json(ApiResponse::new(
        UserResponse::from(customer),
        "Customer updated successfully",
    )))
}

/// Delete a customer account; admin accounts are protected
#[utoipa::path(
    delete,
    path = "/api/v1/admin/customers/{user_id}",
    tag = "customers",
    params(("user_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted successfully"),
        (status = 400, description = "Admin accounts cannot be deleted", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn delete_customer(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<i32>,
) -> ApiResult<StatusCode> {
    trace!("Entering delete_customer function");

    let customer = users::delete_user(&state.db, user_id).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Deleted customer")
            .entity("user", user_id)
            .details(customer.email),
    )
    .await?;
    info!("Customer {} deleted successfully", user_id);

    Ok(StatusCode::NO_CONTENT)
}
