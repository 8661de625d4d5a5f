//! Session middleware configuration.
//!
//! Sessions live in memory and hold only the signed-in user's id.

use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bookstore_session";

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(config.session_days)))
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Bind the session to `user_id`, issuing a fresh session id.
pub async fn log_in(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    debug!("Session bound to user {}", user_id);
    Ok(())
}

pub async fn log_out(session: &Session) -> Result<(), ApiError> {
    session.flush().await?;
    Ok(())
}
