//! The order pipeline: quote, persist, transition, delete.

use std::collections::HashMap;

use chrono::Utc;
use model::entities::{book, order, order::OrderStatus, order_item, user, wilaya};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, StorageError};
use crate::points::points_earned;
use crate::pricing::{PricedLine, Quote, shipping_fee};
use crate::wilayas;

/// Most copies of one book a single order line may ask for.
pub const MAX_QUANTITY: i32 = 10_000;

/// A requested order line before pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub book_id: i32,
    pub quantity: i32,
}

/// Checkout data submitted by a customer.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub wilaya_code: Option<i32>,
    pub wilaya_name: Option<String>,
    pub baladiya: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<LineRequest>,
}

/// An order line together with the book it referenced, if that book still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemWithBook {
    pub item: order_item::Model,
    pub book: Option<book::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<ItemWithBook>,
}

/// Result of a status update.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order: order::Model,
    /// Points credited to the customer by this transition, zero when none.
    pub points_awarded: i32,
}

/// Price the requested lines against the current catalogue and resolve the
/// shipping fee. Returns the quote and the resolved zone.
pub async fn quote<C: ConnectionTrait>(
    conn: &C,
    items: &[LineRequest],
    wilaya_code: Option<i32>,
) -> Result<(Quote, Option<wilaya::Model>)> {
    if items.is_empty() {
        return Err(StorageError::Invalid("An order needs at least one item".to_string()));
    }

    let mut lines = Vec::with_capacity(items.len());
    for request in items {
        if !(1..=MAX_QUANTITY).contains(&request.quantity) {
            return Err(StorageError::Invalid(format!(
                "Quantity for book {} must be between 1 and {}",
                request.book_id, MAX_QUANTITY
            )));
        }
        let book = book::Entity::find_by_id(request.book_id)
            .one(conn)
            .await?
            .filter(|book| book.published)
            .ok_or(StorageError::BookNotFound(request.book_id))?;
        trace!("Book {} priced at {}", book.id, book.price);
        lines.push(PricedLine {
            book_id: book.id,
            quantity: request.quantity,
            unit_price: book.price,
        });
    }

    let zone = match wilaya_code {
        Some(code) => wilayas::find_by_code(conn, code).await?,
        None => None,
    };
    let shipping = shipping_fee(zone.as_ref());

    Ok((Quote::new(lines, shipping)?, zone))
}

/// Price and persist an order with its lines in one transaction.
#[instrument(skip(db, new_order), fields(user_id = ?new_order.user_id, lines = new_order.items.len()))]
pub async fn place_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<OrderWithItems> {
    let txn = db.begin().await?;

    let (quote, zone) = quote(&txn, &new_order.items, new_order.wilaya_code).await?;
    debug!(
        "Quoted subtotal {} + shipping {} = {}",
        quote.subtotal, quote.shipping, quote.total
    );

    let wilaya_name = new_order
        .wilaya_name
        .or_else(|| zone.as_ref().map(|zone| zone.name_en.clone()));

    let order = order::ActiveModel {
        user_id: Set(new_order.user_id),
        customer_name: Set(new_order.customer_name),
        phone: Set(new_order.phone),
        address: Set(new_order.address),
        city: Set(new_order.city),
        wilaya_code: Set(new_order.wilaya_code),
        wilaya_name: Set(wilaya_name),
        baladiya: Set(new_order.baladiya),
        shipping_price: Set(quote.shipping),
        status: Set(OrderStatus::Pending),
        total: Set(quote.total),
        notes: Set(new_order.notes),
        points_awarded: Set(false),
        points_used: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(quote.lines.len());
    for line in &quote.lines {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            book_id: Set(Some(line.book_id)),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    let books = books_by_id(&txn, &items).await?;
    txn.commit().await?;

    info!("Order {} placed with total {}", order.id, order.total);
    Ok(attach_books(order, items, &books))
}

/// All orders, newest first, optionally restricted to one customer.
pub async fn list_orders<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
) -> Result<Vec<OrderWithItems>> {
    let mut query = order::Entity::find();
    if let Some(user_id) = user_id {
        query = query.filter(order::Column::UserId.eq(user_id));
    }
    let orders = query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(conn)
        .await?;
    with_items(conn, orders).await
}

pub async fn find_order<C: ConnectionTrait>(conn: &C, order_id: i32) -> Result<Option<OrderWithItems>> {
    match order::Entity::find_by_id(order_id).one(conn).await? {
        Some(order) => Ok(with_items(conn, vec![order]).await?.pop()),
        None => Ok(None),
    }
}

/// Move an order to `status`.
///
/// The first transition to `Confirmed` of an order that belongs to a customer
/// credits floor(subtotal / 350) points. The `points_awarded` flag is claimed
/// with a conditional update inside the same transaction, so repeating the
/// transition never credits twice.
#[instrument(skip(db))]
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i32,
    status: OrderStatus,
) -> Result<StatusChange> {
    let txn = db.begin().await?;

    let existing = order::Entity::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| StorageError::not_found("Order", order_id))?;
    debug!("Order {} moving from {:?} to {:?}", order_id, existing.status, status);

    let mut points_awarded = 0;
    let mut active: order::ActiveModel = existing.clone().into();
    active.status = Set(status);

    if status == OrderStatus::Confirmed && !existing.points_awarded {
        if let Some(customer_id) = existing.user_id {
            let claimed = order::Entity::update_many()
                .col_expr(order::Column::PointsAwarded, Expr::value(true))
                .filter(order::Column::Id.eq(order_id))
                .filter(order::Column::PointsAwarded.eq(false))
                .exec(&txn)
                .await?;

            if claimed.rows_affected == 1 {
                active.points_awarded = Set(true);
                points_awarded = points_earned(existing.subtotal());
                if points_awarded > 0 {
                    user::Entity::update_many()
                        .col_expr(
                            user::Column::Points,
                            Expr::col(user::Column::Points).add(points_awarded),
                        )
                        .filter(user::Column::Id.eq(customer_id))
                        .exec(&txn)
                        .await?;
                    info!(
                        "Awarded {} points to user {} for order {}",
                        points_awarded, customer_id, order_id
                    );
                }
            } else {
                warn!("Points for order {} were already claimed", order_id);
            }
        }
    }

    let order = active.update(&txn).await?;
    txn.commit().await?;

    Ok(StatusChange {
        order,
        points_awarded,
    })
}

/// Delete an order and its lines. Returns the deleted order.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i32) -> Result<order::Model> {
    let txn = db.begin().await?;

    let existing = order::Entity::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| StorageError::not_found("Order", order_id))?;

    let removed = order_item::Entity::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    order::Entity::delete_by_id(order_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Order {} deleted with {} lines", order_id, removed.rows_affected);
    Ok(existing)
}

async fn with_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await?;
    let books = books_by_id(conn, &items).await?;

    let mut grouped: HashMap<i32, Vec<order_item::Model>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            attach_books(order, items, &books)
        })
        .collect())
}

async fn books_by_id<C: ConnectionTrait>(
    conn: &C,
    items: &[order_item::Model],
) -> Result<HashMap<i32, book::Model>> {
    let mut book_ids: Vec<i32> = items.iter().filter_map(|item| item.book_id).collect();
    book_ids.sort_unstable();
    book_ids.dedup();
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let books = book::Entity::find()
        .filter(book::Column::Id.is_in(book_ids))
        .all(conn)
        .await?;
    Ok(books.into_iter().map(|book| (book.id, book)).collect())
}

fn attach_books(
    order: order::Model,
    items: Vec<order_item::Model>,
    books: &HashMap<i32, book::Model>,
) -> OrderWithItems {
    let items = items
        .into_iter()
        .map(|item| {
            let book = item.book_id.and_then(|id| books.get(&id).cloned());
            ItemWithBook { item, book }
        })
        .collect();
    OrderWithItems { order, items }
}
