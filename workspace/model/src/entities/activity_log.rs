use sea_orm::entity::prelude::*;

/// Audit trail entry for a back-office action. Rows are only ever inserted.
///
/// `admin_id` carries no foreign key: entries outlive the staff account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub admin_id: i32,
    pub admin_email: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
