use chrono::{DateTime, Utc};
use model::entities::user;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

pub mod activity;
pub mod auth;
pub mod books;
pub mod categories;
pub mod customers;
pub mod health;
pub mod orders;
pub mod points;
pub mod profile;
pub mod shipping;
pub mod stats;

/// Account as exposed over the API. The password hash is never included.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    /// `user`, `employee` or `admin`
    pub role: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub enabled: bool,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role.as_str().to_string(),
            name: model.name,
            phone: model.phone,
            address: model.address,
            city: model.city,
            enabled: model.enabled,
            points: model.points,
            created_at: model.created_at,
        }
    }
}

/// Prices and shipping fees are never negative and fit a `decimal(12,2)` column.
pub(crate) fn money_amount(value: &Decimal) -> Result<(), ValidationError> {
    if !storage::pricing::is_valid_amount(*value) {
        return Err(ValidationError::new("money_amount"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_amount() {
        assert!(money_amount(&Decimal::ZERO).is_ok());
        assert!(money_amount(&Decimal::from(1200)).is_ok());
        assert!(money_amount(&storage::pricing::MAX_AMOUNT).is_ok());
        assert!(money_amount(&Decimal::from(-1)).is_err());
        assert!(money_amount(&Decimal::from(10_000_000_000i64)).is_err());
    }
}
