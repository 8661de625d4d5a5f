use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of an account.
///
/// `Admin` and `Employee` are both staff and may use the back office;
/// only admins are protected from deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Parses one of the three known role names. Anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "employee" => Some(Self::Employee),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Employee => "employee",
            Self::Admin => "admin",
        }
    }

    /// Staff may manage the catalogue, orders, shipping and customers.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Employee)
    }
}

/// A storefront customer or a back-office staff member.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    pub password: String,
    pub role: Role,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[sea_orm(default_value = "true")]
    pub enabled: bool,
    /// Loyalty points balance.
    #[sea_orm(default_value = "0")]
    pub points: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
