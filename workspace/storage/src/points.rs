//! Loyalty points.
//!
//! One point is earned per full 350 DZD of item subtotal when an order is
//! first confirmed, and a book costs one point per started 350 DZD of its
//! price when redeemed.

use chrono::Utc;
use model::entities::{book, order, order_item, user};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StorageError};
use crate::orders::{ItemWithBook, OrderWithItems};

/// Dinars per loyalty point.
pub const POINT_VALUE: Decimal = Decimal::from_parts(350, 0, 0, false, 0);

/// Points earned for a confirmed order: floor(subtotal / 350).
pub fn points_earned(subtotal: Decimal) -> i32 {
    if subtotal <= Decimal::ZERO {
        return 0;
    }
    (subtotal / POINT_VALUE).floor().to_i32().unwrap_or(i32::MAX)
}

/// Points needed to redeem `quantity` copies: ceil(price / 350) per copy.
pub fn redemption_cost(price: Decimal, quantity: i32) -> i32 {
    if price <= Decimal::ZERO || quantity <= 0 {
        return 0;
    }
    let per_copy = (price / POINT_VALUE).ceil().to_i32().unwrap_or(i32::MAX);
    per_copy.saturating_mul(quantity)
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub points_used: i32,
    pub remaining_points: i32,
    pub order: OrderWithItems,
}

/// Exchange points for books.
///
/// Deducts the cost and records a zero-total order for the user in a single
/// transaction. The order copies the user's profile as its customer
/// snapshot and is marked as already awarded so confirming it later earns
/// nothing.
#[instrument(skip(db))]
pub async fn redeem(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    quantity: i32,
) -> Result<Redemption> {
    if quantity < 1 {
        return Err(StorageError::Invalid("Quantity must be at least 1".to_string()));
    }

    let txn = db.begin().await?;

    let customer = user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| StorageError::not_found("User", user_id))?;
    let book = book::Entity::find_by_id(book_id)
        .one(&txn)
        .await?
        .filter(|book| book.published)
        .ok_or_else(|| StorageError::not_found("Book", book_id))?;

    let cost = redemption_cost(book.price, quantity);
    debug!("Redeeming {} x book {} for {} points", quantity, book_id, cost);

    // Conditional decrement: the balance never goes below zero.
    let debited = user::Entity::update_many()
        .col_expr(user::Column::Points, Expr::col(user::Column::Points).sub(cost))
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::Points.gte(cost))
        .exec(&txn)
        .await?;
    if debited.rows_affected == 0 {
        warn!(
            "User {} has {} points, {} required",
            user_id, customer.points, cost
        );
        return Err(StorageError::InsufficientPoints {
            required: cost,
            available: customer.points,
        });
    }

    let order = order::ActiveModel {
        user_id: Set(Some(user_id)),
        customer_name: Set(customer.name.clone().unwrap_or_else(|| customer.email.clone())),
        phone: Set(customer.phone.clone().unwrap_or_default()),
        address: Set(customer.address.clone().unwrap_or_default()),
        city: Set(customer.city.clone().unwrap_or_default()),
        wilaya_code: Set(None),
        wilaya_name: Set(None),
        baladiya: Set(None),
        shipping_price: Set(Decimal::ZERO),
        status: Set(order::OrderStatus::Pending),
        total: Set(Decimal::ZERO),
        notes: Set(Some(format!("Points redemption: {cost} points used"))),
        points_awarded: Set(true),
        points_used: Set(cost),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let item = order_item::ActiveModel {
        order_id: Set(order.id),
        book_id: Set(Some(book.id)),
        quantity: Set(quantity),
        unit_price: Set(Decimal::ZERO),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // Balance after the debit
    let remaining_points = user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .map(|user| user.points)
        .ok_or_else(|| StorageError::not_found("User", user_id))?;

    txn.commit().await?;

    info!(
        "User {} redeemed {} points for order {}, {} left",
        user_id, cost, order.id, remaining_points
    );

    Ok(Redemption {
        points_used: cost,
        remaining_points,
        order: OrderWithItems {
            order,
            items: vec![ItemWithBook {
                item,
                book: Some(book),
            }],
        },
    })
}
