use anyhow::{Result, bail};
use tracing::{info, trace, warn};

use super::initdb::connect;
use crate::auth::password::hash_password;
use crate::seed as seeding;

/// Seed wilayas and the demo catalogue.
pub async fn seed(database_url: &str) -> Result<()> {
    trace!("Entering seed function");
    let db = connect(database_url).await?;

    let zones = seeding::seed_wilayas(&db).await?;
    info!("Seeded {} wilayas", zones);

    if seeding::seed_demo_catalog(&db).await? {
        info!("Demo catalogue seeded");
    } else {
        warn!("Database already has a catalogue, demo data skipped");
    }
    Ok(())
}

/// Create an admin account, or promote and re-key an existing one.
pub async fn seed_admin(database_url: &str, email: &str, password: &str) -> Result<()> {
    trace!("Entering seed_admin function");
    if password.chars().count() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let db = connect(database_url).await?;
    let password_hash = hash_password(password)?;
    let admin = seeding::upsert_admin(&db, email, password_hash).await?;

    info!("Admin account ready: {} (id {})", admin.email, admin.id);
    Ok(())
}
