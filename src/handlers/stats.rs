use crate::auth::RequireStaff;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, response::Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storage::stats::{self, DashboardStats};
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Dashboard counters
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_books: u64,
    pub total_orders: u64,
    /// Accounts with the `user` role
    pub total_customers: u64,
    /// Books with fewer than 5 copies in stock
    pub low_stock_books: u64,
    /// Sum of totals of orders that were not cancelled
    #[schema(value_type = String)]
    pub revenue: Decimal,
}

impl From<DashboardStats> for StatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_books: stats.total_books,
            total_orders: stats.total_orders,
            total_customers: stats.total_customers,
            low_stock_books: stats.low_stock_books,
            revenue: stats.revenue,
        }
    }
}

/// Back-office dashboard statistics
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<StatsResponse>),
        (status = 401, description = "Staff only", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn get_stats(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> ApiResult<Json<ApiResponse<StatsResponse>>> {
    let dashboard = stats::dashboard(&state.db).await?;
    debug!("Dashboard: {:?}", dashboard);
    Ok(Json(ApiResponse::new(
        StatsResponse::from(dashboard),
        "Statistics retrieved successfully",
    )))
}
