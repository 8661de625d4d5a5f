use model::entities::{book, category};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::error::{Result, StorageError};

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name_ar: String,
    pub name_en: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name_ar: Option<String>,
    pub name_en: Option<String>,
    pub slug: Option<String>,
}

pub async fn list_categories<C: ConnectionTrait>(conn: &C) -> Result<Vec<category::Model>> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::NameEn)
        .all(conn)
        .await?)
}

pub async fn find_category<C: ConnectionTrait>(conn: &C, category_id: i32) -> Result<Option<category::Model>> {
    Ok(category::Entity::find_by_id(category_id).one(conn).await?)
}

/// Fails with [`StorageError::SlugTaken`] unless the slug is free or already
/// belongs to `except`.
async fn ensure_slug_free<C: ConnectionTrait>(conn: &C, slug: &str, except: Option<i32>) -> Result<()> {
    let holder = category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(conn)
        .await?;
    match holder {
        Some(holder) if Some(holder.id) != except => {
            warn!("Slug {} already used by category {}", slug, holder.id);
            Err(StorageError::SlugTaken(slug.to_string()))
        }
        _ => Ok(()),
    }
}

#[instrument(skip(conn, new_category), fields(slug = %new_category.slug))]
pub async fn create_category<C: ConnectionTrait>(conn: &C, new_category: NewCategory) -> Result<category::Model> {
    ensure_slug_free(conn, &new_category.slug, None).await?;

    let category = category::ActiveModel {
        name_ar: Set(new_category.name_ar),
        name_en: Set(new_category.name_en),
        slug: Set(new_category.slug),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!("Created category {}", category.id);
    Ok(category)
}

#[instrument(skip(conn, changes))]
pub async fn update_category<C: ConnectionTrait>(
    conn: &C,
    category_id: i32,
    changes: CategoryChanges,
) -> Result<category::Model> {
    let existing = category::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("Category", category_id))?;
    if let Some(slug) = changes.slug.as_deref() {
        ensure_slug_free(conn, slug, Some(category_id)).await?;
    }

    let mut active: category::ActiveModel = existing.into();
    if let Some(name_ar) = changes.name_ar {
        active.name_ar = Set(name_ar);
    }
    if let Some(name_en) = changes.name_en {
        active.name_en = Set(name_en);
    }
    if let Some(slug) = changes.slug {
        active.slug = Set(slug);
    }
    Ok(active.update(conn).await?)
}

/// Delete a category and unlink its books. The books keep their label.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i32) -> Result<category::Model> {
    let txn = db.begin().await?;

    let existing = category::Entity::find_by_id(category_id)
        .one(&txn)
        .await?
        .ok_or_else(|| StorageError::not_found("Category", category_id))?;

    let unlinked = book::Entity::update_many()
        .col_expr(book::Column::CategoryId, Expr::value(Option::<i32>::None))
        .filter(book::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    category::Entity::delete_by_id(category_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted category {} and unlinked {} books",
        category_id, unlinked.rows_affected
    );
    Ok(existing)
}
