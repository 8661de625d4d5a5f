//! Fixtures shared by the storage tests.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{book, user, user::Role, wilaya};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

/// Create an in-memory SQLite database with the full schema
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn insert_user(db: &DatabaseConnection, email: &str, role: Role, points: i32) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        password: Set("$argon2id$test".to_string()),
        role: Set(role),
        name: Set(Some("Test Reader".to_string())),
        phone: Set(Some("0555123456".to_string())),
        address: Set(Some("12 Rue Larbi Ben M'hidi".to_string())),
        city: Set(Some("Oran".to_string())),
        enabled: Set(true),
        points: Set(points),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn insert_book(db: &DatabaseConnection, title: &str, price: i64) -> book::Model {
    book::ActiveModel {
        title_ar: Set(title.to_string()),
        title_en: Set(title.to_string()),
        author: Set("Malek Bennabi".to_string()),
        description_ar: Set(String::new()),
        description_en: Set(String::new()),
        price: Set(Decimal::from(price)),
        category: Set("Literature".to_string()),
        category_id: Set(None),
        image: Set("https://example.com/cover.jpg".to_string()),
        language: Set("ar".to_string()),
        published: Set(true),
        isbn: Set(None),
        stock: Set(10),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert book")
}

pub async fn insert_wilaya(db: &DatabaseConnection, code: i32, price: i64, active: bool) -> wilaya::Model {
    wilaya::ActiveModel {
        code: Set(code),
        name_ar: Set(format!("ولاية {code}")),
        name_en: Set(format!("Wilaya {code}")),
        shipping_price: Set(Decimal::from(price)),
        is_active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert wilaya")
}
