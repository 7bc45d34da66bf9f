pub mod storage;

pub use storage::AuthStorage;

use anyhow::{Context, Result, bail};

/// Save an API key for a service.
///
/// This is the shared logic behind the `surveyor login` subcommand.
/// The key is trimmed; an empty key is rejected rather than stored.
pub fn login(db_path: &str, service: &str, key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("no API key provided");
    }
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .set(service, key)
        .context("failed to save API key")?;
    Ok(())
}

/// Remove the stored API key for a service.
///
/// This is the shared logic behind the `surveyor logout` subcommand.
pub fn logout(db_path: &str, service: &str) -> Result<()> {
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .remove(service)
        .context("failed to remove API key")?;
    Ok(())
}
