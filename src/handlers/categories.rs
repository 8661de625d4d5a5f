use crate::auth::RequireStaff;
use crate::error::ApiResult;
use crate::handlers::activity::audit;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::category;
use serde::{Deserialize, Serialize};
use storage::activity::ActivityEntry;
use storage::categories::{self, CategoryChanges, NewCategory};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a category
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1))]
    pub name_ar: String,
    #[validate(length(min = 1))]
    pub name_en: String,
    /// Unique URL-friendly identifier
    #[validate(length(min = 1))]
    pub slug: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1))]
    pub name_ar: Option<String>,
    #[validate(length(min = 1))]
    pub name_en: Option<String>,
    #[validate(length(min = 1))]
    pub slug: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name_ar: String,
    pub name_en: String,
    pub slug: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name_ar: model.name_ar,
            name_en: model.name_en,
            slug: model.slug,
        }
    }
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<CategoryResponse>>>> {
    trace!("Entering get_categories function");
    let found = categories::list_categories(&state.db).await?;
    debug!("Retrieved {} categories", found.len());

    let data = found.into_iter().map(CategoryResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Categories retrieved successfully")))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Valid(Json(request)): Valid<Json<CreateCategoryRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CategoryResponse>>)> {
    trace!("Entering create_category function");

    let category = categories::create_category(
        &state.db,
        NewCategory {
            name_ar: request.name_ar,
            name_en: request.name_en,
            slug: request.slug,
        },
    )
    .await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Created category")
            .entity("category", category.id)
            .details(category.name_en.clone()),
    )
    .await?;
    info!("Category created successfully with ID: {}", category.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            CategoryResponse::from(category),
            "Category created successfully",
        )),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(("category_id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(category_id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateCategoryRequest>>,
) -> ApiResult<Json<ApiResponse<CategoryResponse>>> {
    trace!("Entering update_category function");

    let category = categories::update_category(
        &state.db,
        category_id,
        CategoryChanges {
            name_ar: request.name_ar,
            name_en: request.name_en,
            slug: request.slug,
        },
    )
    .await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Updated category")
            .entity("category", category.id)
            .details(category.name_en.clone()),
    )
    .await?;

    Ok(Json(ApiResponse::new(
        CategoryResponse::from(category),
        "Category updated successfully",
    )))
}

/// Delete a category; its books keep their label and lose the link
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted successfully"),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(category_id): Path<i32>,
) -> ApiResult<StatusCode> {
    trace!("Entering delete_category function");

    let category = categories::delete_category(&state.db, category_id).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Deleted category")
            .entity("category", category_id)
            .details(category.name_en),
    )
    .await?;
    info!("Category {} deleted successfully", category_id);

    Ok(StatusCode::NO_CONTENT)
}
