use crate::auth::RequireStaff;
use crate::error::{ApiError, ApiResult};
use crate::handlers::activity::audit;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use axum_valid::Valid;
use model::entities::wilaya;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use storage::StorageError;
use storage::activity::ActivityEntry;
use storage::wilayas::{self, WilayaChanges};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const WILAYA_SCOPES: [&str; 2] = ["all", "active"];

/// Query parameters for listing wilayas
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct WilayaQuery {
    /// Only return zones that currently ship
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateWilayaRequest {
    #[validate(custom(function = "super::money_amount"))]
    #[schema(value_type = Option<String>)]
    pub shipping_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Request body for applying one price to every wilaya
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct BulkPriceRequest {
    #[validate(custom(function = "super::money_amount"))]
    #[schema(value_type = String)]
    pub default_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkPriceResponse {
    /// Number of wilayas updated
    pub updated: u64,
}

/// Shipping zone response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WilayaResponse {
    pub id: i32,
    /// Official wilaya number, 1 to 58
    pub code: i32,
    pub name_ar: String,
    pub name_en: String,
    #[schema(value_type = String)]
    pub shipping_price: Decimal,
    pub is_active: bool,
}

impl From<wilaya::Model> for WilayaResponse {
    fn from(model: wilaya::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name_ar: model.name_ar,
            name_en: model.name_en,
            shipping_price: model.shipping_price,
            is_active: model.is_active,
        }
    }
}

/// Cache key for the wilaya list at the current shipping version.
pub(crate) fn wilaya_cache_key(state: &AppState, active_only: bool) -> String {
    let version = state.shipping_version.load(Ordering::Acquire);
    let scope = WILAYA_SCOPES[usize::from(active_only)];
    format!("wilayas:{version}:{scope}")
}

/// Move readers to a new key version, then drop the old entries. A list
/// loaded before the bump can only land under the retired version.
async fn invalidate_wilaya_cache(state: &AppState) {
    let retired = state.shipping_version.fetch_add(1, Ordering::AcqRel);
    for scope in WILAYA_SCOPES {
        state.cache.invalidate(&format!("wilayas:{retired}:{scope}")).await;
    }
    debug!("Wilaya cache moved past version {}", retired);
}

/// List wilayas ordered by code
#[utoipa::path(
    get,
    path = "/api/v1/shipping/wilayas",
    tag = "shipping",
    params(WilayaQuery),
    responses(
        (status = 200, description = "Wilayas retrieved successfully", body = ApiResponse<Vec<WilayaResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_wilayas(
    State(state): State<AppState>,
    Query(query): Query<WilayaQuery>,
) -> ApiResult<Json<ApiResponse<Vec<WilayaResponse>>>> {
    trace!("Entering get_wilayas function");
    let active_only = query.active.unwrap_or(false);
    let cache_key = wilaya_cache_key(&state, active_only);

    // Concurrent misses on the same key share one load
    let db = state.db.clone();
    let entry = state
        .cache
        .entry(cache_key.clone())
        .or_try_insert_with(async move {
            wilayas::list_wilayas(&db, active_only)
                .await
                .map(CachedData::Wilayas)
        })
        .await
        .map_err(|err: std::sync::Arc<StorageError>| {
            StorageError::Database(DbErr::Custom(err.to_string()))
        })?;

    let message = if entry.is_fresh() {
        "Wilayas retrieved successfully"
    } else {
        "Wilayas retrieved from cache"
    };
    let CachedData::Wilayas(zones) = entry.into_value();
    debug!("Serving {} wilayas under {}", zones.len(), cache_key);

    let data = zones.into_iter().map(WilayaResponse::from).collect();
    Ok(Json(ApiResponse::new(data, message)))
}

/// Get a wilaya by its official code
#[utoipa::path(
    get,
    path = "/api/v1/shipping/wilayas/{code}",
    tag = "shipping",
    params(("code" = i32, Path, description = "Wilaya code")),
    responses(
        (status = 200, description = "Wilaya retrieved successfully", body = ApiResponse<WilayaResponse>),
        (status = 404, description = "Wilaya not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_wilaya(
    State(state): State<AppState>,
    Path(code): Path<i32>,
) -> ApiResult<Json<ApiResponse<WilayaResponse>>> {
    trace!("Entering get_wilaya function");
    match wilayas::find_by_code(&state.db, code).await? {
        Some(zone) => Ok(Json(ApiResponse::new(
            WilayaResponse::from(zone),
            "Wilaya retrieved successfully",
        ))),
        None => {
            warn!("Wilaya {} not found", code);
            Err(ApiError::NotFound("Wilaya"))
        }
    }
}

/// Change one wilaya's price or availability
#[utoipa::path(
    put,
    path = "/api/v1/admin/shipping/wilayas/{wilaya_id}",
    tag = "shipping",
    params(("wilaya_id" = i32, Path, description = "Wilaya row ID")),
    request_body = UpdateWilayaRequest,
    responses(
        (status = 200, description = "Wilaya updated successfully", body = ApiResponse<WilayaResponse>),
        (status = 400, description = "Invalid price", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Wilaya not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn update_wilaya(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(wilaya_id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateWilayaRequest>>,
) -> ApiResult<Json<ApiResponse<WilayaResponse>>> {
    trace!("Entering update_wilaya function");

    let zone = wilayas::update_wilaya(
        &state.db,
        wilaya_id,
        WilayaChanges {
            shipping_price: request.shipping_price,
            is_active: request.is_active,
        },
    )
    .await?;
    invalidate_wilaya_cache(&state).await;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Updated shipping")
            .entity("wilaya", zone.id)
            .details(format!("{}: {} DZD", zone.name_en, zone.shipping_price)),
    )
    .await?;
    info!("Wilaya {} updated", zone.code);

    Ok(Json(ApiResponse::new(
        WilayaResponse::from(zone),
        "Wilaya updated successfully",
    )))
}

/// Apply one shipping price to every wilaya
#[utoipa::path(
    put,
    path = "/api/v1/admin/shipping/wilayas",
    tag = "shipping",
    request_body = BulkPriceRequest,
    responses(
        (status = 200, description = "Shipping prices updated successfully", body = ApiResponse<BulkPriceResponse>),
        (status = 400, description = "Invalid price", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn set_default_price(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Valid(Json(request)): Valid<Json<BulkPriceRequest>>,
) -> ApiResult<Json<ApiResponse<BulkPriceResponse>>> {
    trace!("Entering set_default_price function");

    let updated = wilayas::set_all_prices(&state.db, request.default_price).await?;
    invalidate_wilaya_cache(&state).await;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Updated all shipping prices")
            .details(format!("{} DZD for {} wilayas", request.default_price, updated)),
    )
    .await?;

    Ok(Json(ApiResponse::new(
        BulkPriceResponse { updated },
        "Shipping prices updated successfully",
    )))
}
