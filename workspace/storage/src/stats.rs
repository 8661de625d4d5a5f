use model::entities::{book, order, order::OrderStatus};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use crate::error::Result;
use crate::users;

/// Books with fewer copies than this are reported as low on stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Back-office dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_books: u64,
    pub total_orders: u64,
    pub total_customers: u64,
    pub low_stock_books: u64,
    /// Sum of the totals of every order that was not cancelled.
    pub revenue: Decimal,
}

pub async fn dashboard<C: ConnectionTrait>(conn: &C) -> Result<DashboardStats> {
    let total_books = book::Entity::find().count(conn).await?;
    let total_orders = order::Entity::find().count(conn).await?;
    let total_customers = users::count_customers(conn).await?;
    let low_stock_books = book::Entity::find()
        .filter(book::Column::Stock.lt(LOW_STOCK_THRESHOLD))
        .count(conn)
        .await?;

    // SUM is NULL when no order qualifies
    let revenue: Option<Decimal> = order::Entity::find()
        .select_only()
        .column_as(order::Column::Total.sum(), "revenue")
        .filter(order::Column::Status.ne(OrderStatus::Cancelled))
        .into_tuple()
        .one(conn)
        .await?
        .flatten();
    let revenue = revenue.unwrap_or_default();

    Ok(DashboardStats {
        total_books,
        total_orders,
        total_customers,
        low_stock_books,
        revenue,
    })
}
