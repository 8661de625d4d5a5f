//! Startup and demo data.

mod wilayas;

use model::entities::user::{self, Role};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use storage::books::{self, NewBook};
use storage::categories::{self, NewCategory};
use storage::users::{self, NewUser, UserChanges};
use storage::wilayas::NewWilaya;
use tracing::{debug, info};

use crate::auth::password::hash_password;
use crate::error::ApiError;

pub use wilayas::WILAYAS;

/// Email of the demo customer created by [`seed_demo_catalog`].
pub const DEMO_CUSTOMER_EMAIL: &str = "user@example.com";
const DEMO_CUSTOMER_PASSWORD: &str = "user123";

/// Insert every wilaya when the table is empty. Returns how many were added.
pub async fn seed_wilayas(db: &DatabaseConnection) -> storage::Result<usize> {
    if storage::wilayas::count_wilayas(db).await? > 0 {
        return Ok(0);
    }
    let zones = WILAYAS
        .iter()
        .map(|&(code, name_ar, name_en, price)| NewWilaya {
            code,
            name_ar: name_ar.to_string(),
            name_en: name_en.to_string(),
            shipping_price: Decimal::from(price),
        })
        .collect();
    storage::wilayas::insert_wilayas(db, zones).await
}

/// Create or promote an admin account.
pub async fn upsert_admin(
    db: &DatabaseConnection,
    email: &str,
    password_hash: String,
) -> storage::Result<user::Model> {
    match users::find_by_email(db, email).await? {
        Some(existing) => {
            info!("Promoting existing account {} to admin", existing.id);
            users::update_user(
                db,
                existing.id,
                UserChanges {
                    password_hash: Some(password_hash),
                    role: Some(Role::Admin),
                    enabled: Some(true),
                    ..Default::default()
                },
            )
            .await
        }
        None => {
            users::create_user(
                db,
                NewUser {
                    email: email.to_string(),
                    password_hash,
                    role: Role::Admin,
                    name: Some("Admin".to_string()),
                    phone: None,
                    address: None,
                    city: None,
                },
            )
            .await
        }
    }
}

fn demo_book(
    title_ar: &str,
    title_en: &str,
    author: &str,
    (description_ar, description_en): (&str, &str),
    price: i64,
    category: &str,
    language: &str,
    isbn: &str,
    stock: i32,
) -> NewBook {
    NewBook {
        title_ar: title_ar.to_string(),
        title_en: title_en.to_string(),
        author: author.to_string(),
        description_ar: description_ar.to_string(),
        description_en: description_en.to_string(),
        price: Decimal::from(price),
        category: category.to_string(),
        category_id: None,
        image: String::new(),
        language: language.to_string(),
        published: true,
        isbn: Some(isbn.to_string()),
        stock,
    }
}

/// Seed five categories, three books and a test customer.
///
/// Skipped when the demo customer already exists. Returns whether anything
/// was written.
pub async fn seed_demo_catalog(db: &DatabaseConnection) -> Result<bool, ApiError> {
    if users::find_by_email(db, DEMO_CUSTOMER_EMAIL).await?.is_some() {
        debug!("Demo customer present, skipping demo data");
        return Ok(false);
    }

    users::create_user(
        db,
        NewUser {
            email: DEMO_CUSTOMER_EMAIL.to_string(),
            password_hash: hash_password(DEMO_CUSTOMER_PASSWORD)?,
            role: Role::User,
            name: Some("Test User".to_string()),
            phone: None,
            address: None,
            city: None,
        },
    )
    .await?;

    let mut category_ids = Vec::new();
    for (name_ar, name_en, slug) in [
        ("تاريخ", "History", "history"),
        ("أدب", "Literature", "literature"),
        ("رواية", "Fiction", "fiction"),
        ("دين", "Religion", "religion"),
        ("علوم", "Science", "science"),
    ] {
        let category = categories::create_category(
            db,
            NewCategory {
                name_ar: name_ar.to_string(),
                name_en: name_en.to_string(),
                slug: slug.to_string(),
            },
        )
        .await?;
        category_ids.push((category.name_en, category.id));
    }

    let catalogue = [
        demo_book(
            "مقدمة ابن خلدون",
            "The Muqaddimah",
            "Ibn Khaldun",
            (
                "كتاب العبر وديوان المبتدأ والخبر.",
                "Ibn Khaldun's introduction to universal history.",
            ),
            2500,
            "History",
            "both",
            "978-0691174954",
            15,
        ),
        demo_book(
            "ألف ليلة وليلة",
            "One Thousand and One Nights",
            "Unknown",
            (
                "مجموعة قصصية تراثية من الشرق الأوسط.",
                "Middle Eastern folk tales compiled during the Islamic Golden Age.",
            ),
            3000,
            "Literature",
            "ar",
            "978-1234567890",
            10,
        ),
        demo_book(
            "البؤساء",
            "Les Miserables",
            "Victor Hugo",
            (
                "رواية فرنسية تاريخية من تأليف فيكتور هوجو.",
                "A French historical novel by Victor Hugo.",
            ),
            1800,
            "Fiction",
            "both",
            "978-0451419439",
            8,
        ),
    ];
    for mut book in catalogue {
        book.category_id = category_ids
            .iter()
            .find(|(name, _)| *name == book.category)
            .map(|(_, id)| *id);
        books::create_book(db, book).await?;
    }

    info!("Seeded demo catalogue");
    Ok(true)
}
