use moka::future::Cache;
use model::entities::wilaya;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use utoipa::{OpenApi, ToSchema};

use crate::config::AppConfig;
use crate::handlers::{
    activity::{ActivityLogResponse, ActivityQuery},
    auth::{LoginRequest, RegisterRequest},
    books::{BookResponse, CreateBookRequest, UpdateBookRequest},
    categories::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
    customers::{CreateCustomerRequest, UpdateCustomerRequest},
    orders::{
        CreateOrderRequest, OrderItemResponse, OrderLineRequest, OrderResponse,
        UpdateOrderStatusRequest,
    },
    points::{RedeemPointsRequest, RedemptionResponse, SetPointsRequest},
    profile::UpdateProfileRequest,
    shipping::{BulkPriceRequest, BulkPriceResponse, UpdateWilayaRequest, WilayaQuery, WilayaResponse},
    stats::StatsResponse,
    UserResponse,
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for read-mostly lookups
    pub cache: Cache<String, CachedData>,
    /// Bumped on every shipping change; part of the wilaya cache keys
    pub shipping_version: Arc<AtomicU64>,
    pub config: Arc<AppConfig>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Wilayas(Vec<wilaya::Model>),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Stable machine-readable error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::current_user,
        crate::handlers::books::get_books,
        crate::handlers::books::get_book,
        crate::handlers::books::create_book,
        crate::handlers::books::update_book,
        crate::handlers::books::delete_book,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::delete_order,
        crate::handlers::points::redeem_points,
        crate::handlers::points::set_customer_points,
        crate::handlers::customers::get_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::get_customer_orders,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::profile::get_profile_orders,
        crate::handlers::shipping::get_wilayas,
        crate::handlers::shipping::get_wilaya,
        crate::handlers::shipping::update_wilaya,
        crate::handlers::shipping::set_default_price,
        crate::handlers::activity::get_activity,
        crate::handlers::stats::get_stats,
    ),
    components(
        schemas(
            ApiResponse<UserResponse>,
            ApiResponse<BookResponse>,
            ApiResponse<OrderResponse>,
            ErrorResponse,
            HealthResponse,
            UserResponse,
            RegisterRequest,
            LoginRequest,
            BookResponse,
            CreateBookRequest,
            UpdateBookRequest,
            CategoryResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            OrderResponse,
            OrderItemResponse,
            OrderLineRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            RedeemPointsRequest,
            RedemptionResponse,
            SetPointsRequest,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            UpdateProfileRequest,
            WilayaResponse,
            WilayaQuery,
            UpdateWilayaRequest,
            BulkPriceRequest,
            BulkPriceResponse,
            ActivityLogResponse,
            ActivityQuery,
            StatsResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "books", description = "Catalogue endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "orders", description = "Checkout and order management endpoints"),
        (name = "points", description = "Loyalty points endpoints"),
        (name = "customers", description = "Back-office customer management"),
        (name = "profile", description = "Signed-in customer profile"),
        (name = "shipping", description = "Shipping zones and prices"),
        (name = "admin", description = "Activity log and dashboard statistics"),
    ),
    info(
        title = "Bookstore API",
        description = "Online bookstore backend: storefront, checkout, loyalty points and back office",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
