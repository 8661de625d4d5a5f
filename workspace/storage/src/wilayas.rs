//! Shipping zones (Algerian wilayas) and their flat shipping price.

use model::entities::wilaya;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument};

use crate::error::{Result, StorageError};
use crate::pricing::{MAX_AMOUNT, is_valid_amount};

#[derive(Debug, Clone)]
pub struct NewWilaya {
    pub code: i32,
    pub name_ar: String,
    pub name_en: String,
    pub shipping_price: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WilayaChanges {
    pub shipping_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Zones ordered by code, optionally only the active ones.
pub async fn list_wilayas<C: ConnectionTrait>(conn: &C, active_only: bool) -> Result<Vec<wilaya::Model>> {
    let mut query = wilaya::Entity::find();
    if active_only {
        query = query.filter(wilaya::Column::IsActive.eq(true));
    }
    Ok(query.order_by_asc(wilaya::Column::Code).all(conn).await?)
}

pub async fn find_by_code<C: ConnectionTrait>(conn: &C, code: i32) -> Result<Option<wilaya::Model>> {
    Ok(wilaya::Entity::find()
        .filter(wilaya::Column::Code.eq(code))
        .one(conn)
        .await?)
}

pub async fn count_wilayas<C: ConnectionTrait>(conn: &C) -> Result<u64> {
    Ok(wilaya::Entity::find().count(conn).await?)
}

fn invalid_price() -> StorageError {
    StorageError::Invalid(format!("Shipping price must be between 0 and {MAX_AMOUNT}"))
}

#[instrument(skip(conn, changes))]
pub async fn update_wilaya<C: ConnectionTrait>(
    conn: &C,
    wilaya_id: i32,
    changes: WilayaChanges,
) -> Result<wilaya::Model> {
    if changes.shipping_price.is_some_and(|price| !is_valid_amount(price)) {
        return Err(invalid_price());
    }
    let existing = wilaya::Entity::find_by_id(wilaya_id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("Wilaya", wilaya_id))?;

    let mut active: wilaya::ActiveModel = existing.into();
    if let Some(price) = changes.shipping_price {
        active.shipping_price = Set(price);
    }
    if let Some(is_active) = changes.is_active {
        active.is_active = Set(is_active);
    }
    let updated = active.update(conn).await?;
    debug!("Wilaya {} now ships at {}", updated.code, updated.shipping_price);
    Ok(updated)
}

/// Apply one shipping price to every zone. Returns the number of zones updated.
#[instrument(skip(conn))]
pub async fn set_all_prices<C: ConnectionTrait>(conn: &C, price: Decimal) -> Result<u64> {
    if !is_valid_amount(price) {
        return Err(invalid_price());
    }
    let result = wilaya::Entity::update_many()
        .col_expr(wilaya::Column::ShippingPrice, Expr::value(price))
        .exec(conn)
        .await?;
    info!("Set shipping price {} on {} wilayas", price, result.rows_affected);
    Ok(result.rows_affected)
}

/// Insert zones in bulk. Used by seeding.
pub async fn insert_wilayas<C: ConnectionTrait>(conn: &C, zones: Vec<NewWilaya>) -> Result<usize> {
    let count = zones.len();
    if count == 0 {
        return Ok(0);
    }
    let models = zones.into_iter().map(|zone| wilaya::ActiveModel {
        code: Set(zone.code),
        name_ar: Set(zone.name_ar),
        name_en: Set(zone.name_en),
        shipping_price: Set(zone.shipping_price),
        is_active: Set(true),
        ..Default::default()
    });
    wilaya::Entity::insert_many(models).exec(conn).await?;
    Ok(count)
}
