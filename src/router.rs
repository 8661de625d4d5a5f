use crate::auth::session::create_session_layer;
use crate::handlers::{
    activity::get_activity,
    auth::{current_user, login, logout, register},
    books::{create_book, delete_book, get_book, get_books, update_book},
    categories::{create_category, delete_category, get_categories, update_category},
    customers::{
        create_customer, delete_customer, get_customer, get_customer_orders, get_customers,
        update_customer,
    },
    health::health_check,
    orders::{create_order, delete_order, get_order, get_orders, update_order_status},
    points::{redeem_points, set_customer_points},
    profile::{get_profile, get_profile_orders, update_profile},
    shipping::{get_wilaya, get_wilayas, set_default_price, update_wilaya},
    stats::get_stats,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let session_layer = create_session_layer(&state.config);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Session authentication
        .route("/api/v1/register", post(register))
        .route("/api/v1/login", post(login))
        .route("/api/v1/logout", post(logout))
        .route("/api/v1/user", get(current_user))
        // Catalogue
        .route("/api/v1/books", get(get_books).post(create_book))
        .route(
            "/api/v1/books/:book_id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/v1/categories", get(get_categories).post(create_category))
        .route(
            "/api/v1/categories/:category_id",
            put(update_category).delete(delete_category),
        )
        // Orders and loyalty points
        .route("/api/v1/orders", get(get_orders).post(create_order))
        .route("/api/v1/orders/:order_id", get(get_order).delete(delete_order))
        .route("/api/v1/orders/:order_id/status", put(update_order_status))
        .route("/api/v1/points/redeem", post(redeem_points))
        // Profile
        .route("/api/v1/profile", get(get_profile).put(update_profile))
        .route("/api/v1/profile/orders", get(get_profile_orders))
        // Shipping
        .route("/api/v1/shipping/wilayas", get(get_wilayas))
        .route("/api/v1/shipping/wilayas/:code", get(get_wilaya))
        // Back office
        .route(
            "/api/v1/admin/customers",
            get(get_customers).post(create_customer),
        )
        .route(
            "/api/v1/admin/customers/:user_id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/api/v1/admin/customers/:user_id/orders", get(get_customer_orders))
        .route("/api/v1/admin/customers/:user_id/points", put(set_customer_points))
        .route("/api/v1/admin/shipping/wilayas", put(set_default_price))
        .route("/api/v1/admin/shipping/wilayas/:wilaya_id", put(update_wilaya))
        .route("/api/v1/admin/activity", get(get_activity))
        .route("/api/v1/admin/stats", get(get_stats))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive())
                .layer(session_layer),
        )
        .with_state(state)
}
