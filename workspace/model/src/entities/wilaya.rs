use sea_orm::entity::prelude::*;

/// An Algerian province used as the shipping zone.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wilayas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Official province number (1..=58).
    #[sea_orm(unique)]
    pub code: i32,
    pub name_ar: String,
    pub name_en: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub shipping_price: Decimal,
    /// Checkout resolves no shipping fee for an inactive zone.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
