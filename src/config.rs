use anyhow::{Context, Result};
use config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://bookstore.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Runtime settings.
///
/// Sources, later ones winning: built-in defaults, an optional
/// `bookstore.toml` in the working directory, then `BOOKSTORE_*`
/// environment variables (for example `BOOKSTORE_DATABASE_URL`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    pub secure_cookies: bool,
    /// Days of inactivity before a session expires.
    pub session_days: i64,
    /// Seconds a cached wilaya list stays valid.
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            secure_cookies: false,
            session_days: 7,
            cache_ttl_secs: 300,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, `bookstore.toml` and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("secure_cookies", defaults.secure_cookies)?
            .set_default("session_days", defaults.session_days)?
            .set_default("cache_ttl_secs", defaults.cache_ttl_secs)?
            .add_source(File::with_name("bookstore").required(false))
            .add_source(Environment::with_prefix("BOOKSTORE").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Apply command line overrides on top of the loaded values.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }
}

/// Connect to the database and build the shared application state.
pub async fn initialize_app_state(config: AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    let cache = Cache::builder()
        .max_capacity(100)
        .time_to_live(Duration::from_secs(config.cache_ttl_secs))
        .build();

    Ok(AppState {
        db,
        cache,
        shipping_version: Arc::default(),
        config: Arc::new(config),
    })
}
