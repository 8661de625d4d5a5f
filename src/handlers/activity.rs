use crate::auth::RequireStaff;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Query, State},
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::{activity_log, user};
use serde::{Deserialize, Serialize};
use storage::activity::{self, ActivityEntry};
use tracing::{debug, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for the activity log
#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
pub struct ActivityQuery {
    /// Number of entries to return (1-1000, default 200)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: i32,
    pub admin_id: i32,
    pub admin_email: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<activity_log::Model> for ActivityLogResponse {
    fn from(model: activity_log::Model) -> Self {
        Self {
            id: model.id,
            admin_id: model.admin_id,
            admin_email: model.admin_email,
            action: model.action,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            details: model.details,
            created_at: model.created_at,
        }
    }
}

/// Append an audit entry for a staff mutation.
pub(crate) async fn audit(state: &AppState, staff: &user::Model, entry: ActivityEntry) -> ApiResult<()> {
    activity::record(&state.db, staff, entry).await?;
    Ok(())
}

/// Recent staff activity, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/activity",
    tag = "admin",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Activity retrieved successfully", body = ApiResponse<Vec<ActivityLogResponse>>),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn get_activity(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Valid(Query(query)): Valid<Query<ActivityQuery>>,
) -> ApiResult<Json<ApiResponse<Vec<ActivityLogResponse>>>> {
    trace!("Entering get_activity function");
    let limit = query.limit.unwrap_or(activity::DEFAULT_LIMIT);

    let entries = activity::recent(&state.db, limit).await?;
    debug!("Retrieved {} activity entries", entries.len());

    let data = entries.into_iter().map(ActivityLogResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Activity retrieved successfully")))
}
