use sea_orm::entity::prelude::*;

/// A book in the catalogue.
///
/// `category` is the free-text label shown in the storefront; `category_id`
/// optionally links the book to a managed [`super::category`] row and is
/// cleared when that category is deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title_ar: String,
    pub title_en: String,
    pub author: String,
    #[sea_orm(column_type = "Text")]
    pub description_ar: String,
    #[sea_orm(column_type = "Text")]
    pub description_en: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub category: String,
    pub category_id: Option<i32>,
    pub image: String,
    /// `ar`, `en`, `fr` or `both`.
    pub language: String,
    #[sea_orm(default_value = "true")]
    pub published: bool,
    pub isbn: Option<String>,
    #[sea_orm(default_value = "0")]
    pub stock: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
