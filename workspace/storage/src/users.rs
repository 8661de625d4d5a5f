//! Account persistence. Password hashing happens in the caller; this module
//! only stores the PHC string it is given.

use chrono::Utc;
use model::entities::{order, user, user::Role};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::error::{Result, StorageError};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub enabled: Option<bool>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Emails are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(user_id).one(conn).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> Result<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(conn)
        .await?)
}

/// Every account, newest first.
pub async fn list_users<C: ConnectionTrait>(conn: &C) -> Result<Vec<user::Model>> {
    Ok(user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .all(conn)
        .await?)
}

/// Accounts with the `user` role.
pub async fn count_customers<C: ConnectionTrait>(conn: &C) -> Result<u64> {
    Ok(user::Entity::find()
        .filter(user::Column::Role.eq(Role::User))
        .count(conn)
        .await?)
}

#[instrument(skip(conn, new_user), fields(email = %new_user.email, role = ?new_user.role))]
pub async fn create_user<C: ConnectionTrait>(conn: &C, new_user: NewUser) -> Result<user::Model> {
    let email = normalize_email(&new_user.email);
    if find_by_email(conn, &email).await?.is_some() {
        warn!("Email {} is already registered", email);
        return Err(StorageError::EmailTaken(email));
    }

    let user = user::ActiveModel {
        email: Set(email),
        password: Set(new_user.password_hash),
        role: Set(new_user.role),
        name: Set(new_user.name),
        phone: Set(new_user.phone),
        address: Set(new_user.address),
        city: Set(new_user.city),
        enabled: Set(true),
        points: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!("Created user {}", user.id);
    Ok(user)
}

#[instrument(skip(conn, changes))]
pub async fn update_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    changes: UserChanges,
) -> Result<user::Model> {
    let existing = user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("User", user_id))?;

    let mut active: user::ActiveModel = existing.clone().into();
    if let Some(email) = changes.email {
        let email = normalize_email(&email);
        if email != existing.email {
            if find_by_email(conn, &email).await?.is_some() {
                return Err(StorageError::EmailTaken(email));
            }
            active.email = Set(email);
        }
    }
    if let Some(password_hash) = changes.password_hash {
        active.password = Set(password_hash);
    }
    if let Some(role) = changes.role {
        active.role = Set(role);
    }
    if let Some(enabled) = changes.enabled {
        active.enabled = Set(enabled);
    }
    if let Some(name) = changes.name {
        active.name = Set(Some(name));
    }
    if let Some(phone) = changes.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = changes.address {
        active.address = Set(Some(address));
    }
    if let Some(city) = changes.city {
        active.city = Set(Some(city));
    }

    Ok(active.update(conn).await?)
}

/// Overwrite a loyalty balance.
pub async fn set_points<C: ConnectionTrait>(conn: &C, user_id: i32, points: i32) -> Result<user::Model> {
    if points < 0 {
        return Err(StorageError::Invalid("Points cannot be negative".to_string()));
    }
    let existing = user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("User", user_id))?;

    let mut active: user::ActiveModel = existing.into();
    active.points = Set(points);
    let user = active.update(conn).await?;
    info!("Points of user {} set to {}", user_id, points);
    Ok(user)
}

/// Delete an account. Admins cannot be deleted; the user's orders stay and
/// lose their owner.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model> {
    let txn = db.begin().await?;

    let existing = user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| StorageError::not_found("User", user_id))?;
    if existing.role == Role::Admin {
        warn!("Refusing to delete admin {}", user_id);
        return Err(StorageError::AdminUndeletable);
    }

    order::Entity::update_many()
        .col_expr(order::Column::UserId, Expr::value(Option::<i32>::None))
        .filter(order::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Deleted user {}", user_id);
    Ok(existing)
}
