//! Catalogue queries and book maintenance.

use chrono::Utc;
use model::entities::{book, category, order_item};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::error::{Result, StorageError};
use crate::pricing::{MAX_AMOUNT, is_valid_amount};

/// Filters for [`list_books`].
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Matches the category label or the slug of the linked category.
    pub category: Option<String>,
    /// Case-insensitive substring over both titles and the author.
    pub search: Option<String>,
    pub include_unpublished: bool,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title_ar: String,
    pub title_en: String,
    pub author: String,
    pub description_ar: String,
    pub description_en: String,
    pub price: Decimal,
    pub category: String,
    pub category_id: Option<i32>,
    pub image: String,
    pub language: String,
    pub published: bool,
    pub isbn: Option<String>,
    pub stock: i32,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title_ar: Option<String>,
    pub title_en: Option<String>,
    pub author: Option<String>,
    pub description_ar: Option<String>,
    pub description_en: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub category_id: Option<Option<i32>>,
    pub image: Option<String>,
    pub language: Option<String>,
    pub published: Option<bool>,
    pub isbn: Option<Option<String>>,
    pub stock: Option<i32>,
}

pub async fn list_books<C: ConnectionTrait>(conn: &C, filter: &BookFilter) -> Result<Vec<book::Model>> {
    let mut query = book::Entity::find();
    if !filter.include_unpublished {
        query = query.filter(book::Column::Published.eq(true));
    }

    if let Some(label) = filter.category.as_deref().filter(|label| !label.is_empty()) {
        let linked = category::Entity::find()
            .filter(category::Column::Slug.eq(label))
            .one(conn)
            .await?;
        let mut condition = Condition::any().add(book::Column::Category.eq(label));
        if let Some(linked) = linked {
            condition = condition.add(book::Column::CategoryId.eq(linked.id));
        }
        query = query.filter(condition);
    }

    if let Some(needle) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
    {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        debug!("Searching books for {:?}", pattern);
        let matches = [book::Column::TitleAr, book::Column::TitleEn, book::Column::Author]
            .into_iter()
            .fold(Condition::any(), |condition, column| {
                condition.add(
                    Expr::expr(Func::lower(Expr::col(column)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
            });
        query = query.filter(matches);
    }

    Ok(query
        .order_by_desc(book::Column::CreatedAt)
        .order_by_desc(book::Column::Id)
        .all(conn)
        .await?)
}

/// Escape `LIKE` wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub async fn find_book<C: ConnectionTrait>(conn: &C, book_id: i32) -> Result<Option<book::Model>> {
    Ok(book::Entity::find_by_id(book_id).one(conn).await?)
}

fn ensure_price(price: Decimal) -> Result<()> {
    if !is_valid_amount(price) {
        return Err(StorageError::Invalid(format!(
            "Price must be between 0 and {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, category_id: Option<i32>) -> Result<()> {
    if let Some(category_id) = category_id {
        category::Entity::find_by_id(category_id)
            .one(conn)
            .await?
            .ok_or_else(|| StorageError::not_found("Category", category_id))?;
    }
    Ok(())
}

#[instrument(skip(conn, new_book), fields(title = %new_book.title_en))]
pub async fn create_book<C: ConnectionTrait>(conn: &C, new_book: NewBook) -> Result<book::Model> {
    ensure_price(new_book.price)?;
    ensure_category(conn, new_book.category_id).await?;

    let book = book::ActiveModel {
        title_ar: Set(new_book.title_ar),
        title_en: Set(new_book.title_en),
        author: Set(new_book.author),
        description_ar: Set(new_book.description_ar),
        description_en: Set(new_book.description_en),
        price: Set(new_book.price),
        category: Set(new_book.category),
        category_id: Set(new_book.category_id),
        image: Set(new_book.image),
        language: Set(new_book.language),
        published: Set(new_book.published),
        isbn: Set(new_book.isbn),
        stock: Set(new_book.stock),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!("Created book {}", book.id);
    Ok(book)
}

#[instrument(skip(conn, changes))]
pub async fn update_book<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    changes: BookChanges,
) -> Result<book::Model> {
    if let Some(price) = changes.price {
        ensure_price(price)?;
    }
    let existing = book::Entity::find_by_id(book_id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("Book", book_id))?;
    if let Some(category_id) = changes.category_id {
        ensure_category(conn, category_id).await?;
    }

    let mut active: book::ActiveModel = existing.into();
    if let Some(title_ar) = changes.title_ar {
        active.title_ar = Set(title_ar);
    }
    if let Some(title_en) = changes.title_en {
        active.title_en = Set(title_en);
    }
    if let Some(author) = changes.author {
        active.author = Set(author);
    }
    if let Some(description_ar) = changes.description_ar {
        active.description_ar = Set(description_ar);
    }
    if let Some(description_en) = changes.description_en {
        active.description_en = Set(description_en);
    }
    if let Some(price) = changes.price {
        active.price = Set(price);
    }
    if let Some(category) = changes.category {
        active.category = Set(category);
    }
    if let Some(category_id) = changes.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(image) = changes.image {
        active.image = Set(image);
    }
    if let Some(language) = changes.language {
        active.language = Set(language);
    }
    if let Some(published) = changes.published {
        active.published = Set(published);
    }
    if let Some(isbn) = changes.isbn {
        active.isbn = Set(isbn);
    }
    if let Some(stock) = changes.stock {
        active.stock = Set(stock);
    }

    let book = active.update(conn).await?;
    debug!("Updated book {}", book.id);
    Ok(book)
}

/// Delete a book. Order lines that referenced it keep their price snapshot
/// and lose the link.
#[instrument(skip(db))]
pub async fn delete_book(db: &DatabaseConnection, book_id: i32) -> Result<book::Model> {
    let txn = db.begin().await?;

    let existing = book::Entity::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or_else(|| StorageError::not_found("Book", book_id))?;

    let detached = order_item::Entity::update_many()
        .col_expr(order_item::Column::BookId, Expr::value(Option::<i32>::None))
        .filter(order_item::Column::BookId.eq(book_id))
        .exec(&txn)
        .await?;
    book::Entity::delete_by_id(book_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted book {} and detached {} order lines",
        book_id, detached.rows_affected
    );
    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{self, NewCategory};
    use crate::orders::{self, LineRequest, NewOrder};
    use crate::testing::{insert_book, setup_db};

    fn new_book(title: &str, author: &str, category: &str) -> NewBook {
        NewBook {
            title_ar: format!("{title} (ar)"),
            title_en: title.to_string(),
            author: author.to_string(),
            description_ar: String::new(),
            description_en: String::new(),
            price: Decimal::from(1200),
            category: category.to_string(),
            category_id: None,
            image: "https://example.com/cover.jpg".to_string(),
            language: "en".to_string(),
            published: true,
            isbn: None,
            stock: 3,
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("nedjma"), "nedjma");
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
    }

    #[tokio::test]
    async fn test_list_books_filters_category_search_and_visibility() {
        let db = setup_db().await;
        let history = categories::create_category(
            &db,
            NewCategory {
                name_ar: "تاريخ".to_string(),
                name_en: "History".to_string(),
                slug: "history".to_string(),
            },
        )
        .await
        .unwrap();

        create_book(&db, new_book("Nedjma", "Kateb Yacine", "Novels")).await.unwrap();
        let mut linked = new_book("Algeria 1830", "Mostefa Lacheraf", "Essays");
        linked.category_id = Some(history.id);
        create_book(&db, linked).await.unwrap();
        let mut hidden = new_book("Draft", "Kateb Yacine", "Novels");
        hidden.published = false;
        create_book(&db, hidden).await.unwrap();

        let storefront = list_books(&db, &BookFilter::default()).await.unwrap();
        assert_eq!(storefront.len(), 2);
        // Newest first
        assert_eq!(storefront[0].title_en, "Algeria 1830");

        let staff = BookFilter {
            include_unpublished: true,
            ..Default::default()
        };
        assert_eq!(list_books(&db, &staff).await.unwrap().len(), 3);

        let by_slug = BookFilter {
            category: Some("history".to_string()),
            ..Default::default()
        };
        let found = list_books(&db, &by_slug).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].author, "Mostefa Lacheraf");

        let by_label = BookFilter {
            category: Some("Novels".to_string()),
            ..Default::default()
        };
        assert_eq!(list_books(&db, &by_label).await.unwrap().len(), 1);

        let by_author = BookFilter {
            search: Some("  KATEB ".to_string()),
            include_unpublished: true,
            ..Default::default()
        };
        assert_eq!(list_books(&db, &by_author).await.unwrap().len(), 2);

        let by_title = BookFilter {
            search: Some("algeria".to_string()),
            ..Default::default()
        };
        let found = list_books(&db, &by_title).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title_en, "Algeria 1830");

        let by_arabic_title = BookFilter {
            search: Some("(ar)".to_string()),
            ..Default::default()
        };
        assert_eq!(list_books(&db, &by_arabic_title).await.unwrap().len(), 2);

        // Wildcards in the term are literal
        let wildcard = BookFilter {
            search: Some("%".to_string()),
            include_unpublished: true,
            ..Default::default()
        };
        assert!(list_books(&db, &wildcard).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_book_requires_existing_category() {
        let db = setup_db().await;
        let mut book = new_book("Nedjma", "Kateb Yacine", "Novels");
        book.category_id = Some(41);
        let err = create_book(&db, book).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "Category", id: 41 }));
    }

    #[tokio::test]
    async fn test_update_book_is_partial() {
        let db = setup_db().await;
        let book = insert_book(&db, "Nedjma", 1000).await;

        let updated = update_book(
            &db,
            book.id,
            BookChanges {
                stock: Some(0),
                isbn: Some(Some("9789961000000".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.isbn.as_deref(), Some("9789961000000"));
        assert_eq!(updated.price, Decimal::from(1000));
        assert_eq!(updated.title_en, "Nedjma");

        let err = update_book(&db, 999, BookChanges::default()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "Book", id: 999 }));
    }

    #[tokio::test]
    async fn test_prices_must_fit_money_column() {
        let db = setup_db().await;
        let book = insert_book(&db, "Nedjma", 1000).await;

        let huge: Decimal = "10000000000000000000000".parse().unwrap();
        let err = update_book(
            &db,
            book.id,
            BookChanges {
                price: Some(huge),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));

        let mut priced = new_book("Le Fleuve détourné", "Rachid Mimouni", "Novels");
        priced.price = Decimal::from(-10);
        assert!(matches!(create_book(&db, priced).await, Err(StorageError::Invalid(_))));

        let unchanged = find_book(&db, book.id).await.unwrap().unwrap();
        assert_eq!(unchanged.price, Decimal::from(1000));
    }

    #[tokio::test]
    async fn test_delete_book_keeps_order_history() {
        let db = setup_db().await;
        let book = insert_book(&db, "Nedjma", 1000).await;
        let placed = orders::place_order(
            &db,
            NewOrder {
                customer_name: "Guest".to_string(),
                phone: "0770000000".to_string(),
                address: "Rue Didouche Mourad".to_string(),
                city: "Alger".to_string(),
                items: vec![LineRequest { book_id: book.id, quantity: 2 }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        delete_book(&db, book.id).await.unwrap();
        assert!(find_book(&db, book.id).await.unwrap().is_none());

        let kept = orders::find_order(&db, placed.order.id).await.unwrap().unwrap();
        assert_eq!(kept.items.len(), 1);
        assert_eq!(kept.items[0].item.book_id, None);
        assert!(kept.items[0].book.is_none());
        assert_eq!(kept.items[0].item.unit_price, Decimal::from(1000));
        assert_eq!(kept.order.total, Decimal::from(2000));
    }
}
