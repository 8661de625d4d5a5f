use crate::auth::{CurrentUser, RequireStaff};
use crate::error::{ApiError, ApiResult};
use crate::handlers::activity::audit;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::book;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storage::activity::ActivityEntry;
use storage::books::{self, BookChanges, BookFilter, NewBook};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

fn default_language() -> String {
    "ar".to_string()
}

fn default_published() -> bool {
    true
}

/// Query parameters for listing books
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct BookQuery {
    /// Category label or category slug
    pub category: Option<String>,
    /// Case-insensitive match on titles and author
    pub search: Option<String>,
}

/// Request body for creating a book
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateBookRequest {
    #[validate(length(min = 1))]
    pub title_ar: String,
    #[validate(length(min = 1))]
    pub title_en: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub description_en: String,
    #[validate(custom(function = "super::money_amount"))]
    #[schema(value_type = String)]
    pub price: Decimal,
    #[validate(length(min = 1))]
    pub category: String,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub image: String,
    /// `ar`, `en`, `fr` or `both`
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_published")]
    pub published: bool,
    pub isbn: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
}

/// Request body for updating a book; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1))]
    pub title_ar: Option<String>,
    #[validate(length(min = 1))]
    pub title_en: Option<String>,
    #[validate(length(min = 1))]
    pub author: Option<String>,
    pub description_ar: Option<String>,
    pub description_en: Option<String>,
    #[validate(custom(function = "super::money_amount"))]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    pub category_id: Option<i32>,
    pub image: Option<String>,
    pub language: Option<String>,
    pub published: Option<bool>,
    pub isbn: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
}

/// Book response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title_ar: String,
    pub title_en: String,
    pub author: String,
    pub description_ar: String,
    pub description_en: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category: String,
    pub category_id: Option<i32>,
    pub image: String,
    pub language: String,
    pub published: bool,
    pub isbn: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<book::Model> for BookResponse {
    fn from(model: book::Model) -> Self {
        Self {
            id: model.id,
            title_ar: model.title_ar,
            title_en: model.title_en,
            author: model.author,
            description_ar: model.description_ar,
            description_en: model.description_en,
            price: model.price,
            category: model.category,
            category_id: model.category_id,
            image: model.image,
            language: model.language,
            published: model.published,
            isbn: model.isbn,
            stock: model.stock,
            created_at: model.created_at,
        }
    }
}

impl From<UpdateBookRequest> for BookChanges {
    fn from(request: UpdateBookRequest) -> Self {
        Self {
            title_ar: request.title_ar,
            title_en: request.title_en,
            author: request.author,
            description_ar: request.description_ar,
            description_en: request.description_en,
            price: request.price,
            category: request.category,
            category_id: request.category_id.map(Some),
            image: request.image,
            language: request.language,
            published: request.published,
            isbn: request.isbn.map(Some),
            stock: request.stock,
        }
    }
}

/// List books, newest first
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books retrieved successfully", body = ApiResponse<Vec<BookResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn get_books(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BookQuery>,
) -> ApiResult<Json<ApiResponse<Vec<BookResponse>>>> {
    trace!("Entering get_books function");
    let filter = BookFilter {
        category: query.category,
        search: query.search,
        include_unpublished: user.is_some_and(|user| user.role.is_staff()),
    };

    let found = books::list_books(&state.db, &filter).await?;
    debug!("Retrieved {} books", found.len());

    let data = found.into_iter().map(BookResponse::from).collect();
    Ok(Json(ApiResponse::new(data, "Books retrieved successfully")))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/v1/books/{book_id}",
    tag = "books",
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book retrieved successfully", body = ApiResponse<BookResponse>),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn get_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(book_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<BookResponse>>> {
    trace!("Entering get_book function");
    let staff = user.is_some_and(|user| user.role.is_staff());
    match books::find_book(&state.db, book_id).await? {
        Some(book) if book.published || staff => Ok(Json(ApiResponse::new(
            BookResponse::from(book),
            "Book retrieved successfully",
        ))),
        _ => {
            warn!("Book {} not found or unpublished", book_id);
            Err(ApiError::NotFound("Book"))
        }
    }
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/v1/books",
    tag = "books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created successfully", body = ApiResponse<BookResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff, request), fields(staff_id = staff.id))]
pub async fn create_book(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Valid(Json(request)): Valid<Json<CreateBookRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BookResponse>>)> {
    trace!("Entering create_book function");
    debug!("Creating book {:?}", request.title_en);

    let book = books::create_book(
        &state.db,
        NewBook {
            title_ar: request.title_ar,
            title_en: request.title_en,
            author: request.author,
            description_ar: request.description_ar,
            description_en: request.description_en,
            price: request.price,
            category: request.category,
            category_id: request.category_id,
            image: request.image,
            language: request.language,
            published: request.published,
            isbn: request.isbn,
            stock: request.stock,
        },
    )
    .await?;

    audit(
        &state,
        &staff,
        ActivityEntry::new("Created book")
            .entity("book", book.id)
            .details(book.title_en.clone()),
    )
    .await?;
    info!("Book created successfully with ID: {}", book.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(BookResponse::from(book), "Book created successfully")),
    ))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/v1/books/{book_id}",
    tag = "books",
    params(("book_id" = i32, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated successfully", body = ApiResponse<BookResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff, request), fields(staff_id = staff.id))]
pub async fn update_book(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(book_id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateBookRequest>>,
) -> ApiResult<Json<ApiResponse<BookResponse>>> {
    trace!("Entering update_book function");

    let book = books::update_book(&state.db, book_id, BookChanges::from(request)).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Updated book")
            .entity("book", book.id)
            .details(book.title_en.clone()),
    )
    .await?;
    info!("Book {} updated successfully", book.id);

    Ok(Json(ApiResponse::new(BookResponse::from(book), "Book updated successfully")))
}

/// Delete a book; order history keeps its price snapshot
#[utoipa::path(
    delete,
    path = "/api/v1/books/{book_id}",
    tag = "books",
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted successfully"),
        (status = 401, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, staff), fields(staff_id = staff.id))]
pub async fn delete_book(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(book_id): Path<i32>,
) -> ApiResult<StatusCode> {
    trace!("Entering delete_book function");

    let book = books::delete_book(&state.db, book_id).await?;
    audit(
        &state,
        &staff,
        ActivityEntry::new("Deleted book")
            .entity("book", book_id)
            .details(book.title_en),
    )
    .await?;
    info!("Book {} deleted successfully", book_id);

    Ok(StatusCode::NO_CONTENT)
}
