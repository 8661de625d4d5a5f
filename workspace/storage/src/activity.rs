//! Append-only audit trail of staff mutations.

use chrono::Utc;
use model::entities::{activity_log, user};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use tracing::debug;

use crate::error::Result;

/// Entries returned by [`recent`] when no limit is given.
pub const DEFAULT_LIMIT: u64 = 200;

/// One audit entry, built up before it is recorded.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
}

impl ActivityEntry {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            entity_type: None,
            entity_id: None,
            details: None,
        }
    }

    pub fn entity(mut self, entity_type: &str, entity_id: i32) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Append `entry` on behalf of `staff`.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    staff: &user::Model,
    entry: ActivityEntry,
) -> Result<activity_log::Model> {
    debug!("Recording activity {:?} by {}", entry.action, staff.email);
    let logged = activity_log::ActiveModel {
        admin_id: Set(staff.id),
        admin_email: Set(staff.email.clone()),
        action: Set(entry.action),
        entity_type: Set(entry.entity_type),
        entity_id: Set(entry.entity_id),
        details: Set(entry.details),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(logged)
}

/// Newest entries first.
pub async fn recent<C: ConnectionTrait>(conn: &C, limit: u64) -> Result<Vec<activity_log::Model>> {
    Ok(activity_log::Entity::find()
        .order_by_desc(activity_log::Column::CreatedAt)
        .order_by_desc(activity_log::Column::Id)
        .limit(limit)
        .all(conn)
        .await?)
}
