//! SeaORM entities for the bookstore schema.
//!
//! Prices are stored as fixed-point decimals in dinars (DZD). Timestamps are
//! UTC and always set by the application, never by database defaults.

pub mod activity_log;
pub mod book;
pub mod category;
pub mod order;
pub mod order_item;
pub mod user;
pub mod wilaya;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::activity_log::Entity as ActivityLog;
    pub use super::book::Entity as Book;
    pub use super::category::Entity as Category;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::user::Entity as User;
    pub use super::wilaya::Entity as Wilaya;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_customer(db: &DatabaseConnection, email: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            email: Set(email.to_string()),
            password: Set("$argon2id$placeholder".to_string()),
            role: Set(user::Role::User),
            name: Set(Some("Customer".to_string())),
            enabled: Set(true),
            points: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn insert_book(
        db: &DatabaseConnection,
        title: &str,
        price: Decimal,
        category_id: Option<i32>,
    ) -> Result<book::Model, DbErr> {
        book::ActiveModel {
            title_ar: Set(title.to_string()),
            title_en: Set(title.to_string()),
            author: Set("Ibn Khaldun".to_string()),
            description_ar: Set(String::new()),
            description_en: Set(String::new()),
            price: Set(price),
            category: Set("History".to_string()),
            category_id: Set(category_id),
            image: Set("https://example.com/cover.jpg".to_string()),
            language: Set("both".to_string()),
            published: Set(true),
            isbn: Set(None),
            stock: Set(3),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn insert_order(
        db: &DatabaseConnection,
        user_id: Option<i32>,
        book: &book::Model,
        quantity: i32,
    ) -> Result<(order::Model, order_item::Model), DbErr> {
        let order = order::ActiveModel {
            user_id: Set(user_id),
            customer_name: Set("Customer".to_string()),
            phone: Set("0555000000".to_string()),
            address: Set("1 Rue Didouche".to_string()),
            city: Set("Alger".to_string()),
            wilaya_code: Set(Some(16)),
            wilaya_name: Set(Some("Algiers".to_string())),
            baladiya: Set(None),
            shipping_price: Set(Decimal::new(400, 0)),
            status: Set(order::OrderStatus::Pending),
            total: Set(book.price * Decimal::from(quantity) + Decimal::new(400, 0)),
            notes: Set(None),
            points_awarded: Set(false),
            points_used: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            book_id: Set(Some(book.id)),
            quantity: Set(quantity),
            unit_price: Set(book.price),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok((order, item))
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let customer = insert_customer(&db, "reader@example.com").await?;
        let history = category::ActiveModel {
            name_ar: Set("تاريخ".to_string()),
            name_en: Set("History".to_string()),
            slug: Set("history".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let book = insert_book(&db, "The Muqaddimah", Decimal::new(2500, 0), Some(history.id)).await?;
        let (order, item) = insert_order(&db, Some(customer.id), &book, 2).await?;

        assert_eq!(order.total, Decimal::new(5400, 0));
        assert_eq!(order.subtotal(), Decimal::new(5000, 0));
        assert_eq!(item.line_total(), Decimal::new(5000, 0));

        // Relations resolve in both directions
        let orders = customer.find_related(Order).all(&db).await?;
        assert_eq!(orders.len(), 1);
        let items = order.find_related(OrderItem).all(&db).await?;
        assert_eq!(items, vec![item.clone()]);
        let books_in_category = history.find_related(Book).all(&db).await?;
        assert_eq!(books_in_category.len(), 1);

        // Status round-trips through the string column
        let stored = Order::find_by_id(order.id).one(&db).await?.unwrap();
        assert_eq!(stored.status, order::OrderStatus::Pending);
        let stored_user = User::find_by_id(customer.id).one(&db).await?.unwrap();
        assert_eq!(stored_user.role, user::Role::User);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_email_and_slug() -> Result<(), DbErr> {
        let db = setup_db().await?;

        insert_customer(&db, "dup@example.com").await?;
        assert!(insert_customer(&db, "dup@example.com").await.is_err());

        let category = |slug: &str| category::ActiveModel {
            name_ar: Set("أدب".to_string()),
            name_en: Set("Literature".to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        };
        category("literature").insert(&db).await?;
        assert!(category("literature").insert(&db).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_keys_keep_order_history() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let customer = insert_customer(&db, "history@example.com").await?;
        let book = insert_book(&db, "Les Miserables", Decimal::new(1800, 0), None).await?;
        let (order, item) = insert_order(&db, Some(customer.id), &book, 1).await?;

        // Removing the book keeps the line and its price snapshot
        Book::delete_by_id(book.id).exec(&db).await?;
        let kept = OrderItem::find_by_id(item.id).one(&db).await?.unwrap();
        assert_eq!(kept.book_id, None);
        assert_eq!(kept.unit_price, Decimal::new(1800, 0));

        // Removing the customer detaches the order
        User::delete_by_id(customer.id).exec(&db).await?;
        let kept_order = Order::find_by_id(order.id).one(&db).await?.unwrap();
        assert_eq!(kept_order.user_id, None);

        // Removing the order removes its lines
        Order::delete_by_id(order.id).exec(&db).await?;
        let remaining = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&db)
            .await?;
        assert!(remaining.is_empty());

        Ok(())
    }
}
