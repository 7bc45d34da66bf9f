use std::sync::Mutex;

use anyhow::Result;
use rusqlite::Connection;

/// Manages API-key storage in SQLite.
///
/// Shares a database with the task ledger — pass the same path used for
/// `SqliteLedger`.
pub struct AuthStorage {
    conn: Mutex<Connection>,
}

impl AuthStorage {
    /// Open or create the credentials table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS credentials (
                service TEXT PRIMARY KEY,
                key     TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the stored API key for a service.
    pub fn get(&self, service: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key FROM credentials WHERE service = ?1")?;
        let mut rows = stmt.query([service])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Store an API key for a service (upsert).
    pub fn set(&self, service: &str, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO credentials (service, key) VALUES (?1, ?2)
             ON CONFLICT(service) DO UPDATE SET key = excluded.key",
            [service, key],
        )?;
        Ok(())
    }

    /// Remove the stored API key for a service.
    pub fn remove(&self, service: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM credentials WHERE service = ?1", [service])?;
        Ok(())
    }

    /// The effective API key for a service.
    /// Priority: stored key → environment variable.
    pub fn resolve(&self, service: &str, env_var: &str) -> Result<Option<String>> {
        if let Some(key) = self.get(service)? {
            return Ok(Some(key));
        }

        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Ok(Some(key));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_storage() -> AuthStorage {
        AuthStorage::open(":memory:").unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_service() {
        let storage = mem_storage();
        assert!(storage.get("exa").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let storage = mem_storage();
        storage.set("exa", "sk-test").unwrap();
        assert_eq!(storage.get("exa").unwrap().unwrap(), "sk-test");
    }

    #[test]
    fn set_overwrites_existing() {
        let storage = mem_storage();
        storage.set("exa", "old").unwrap();
        storage.set("exa", "new").unwrap();
        assert_eq!(storage.get("exa").unwrap().unwrap(), "new");
    }

    #[test]
    fn remove_deletes_key() {
        let storage = mem_storage();
        storage.set("exa", "sk-test").unwrap();
        storage.remove("exa").unwrap();
        assert!(storage.get("exa").unwrap().is_none());
    }

    #[test]
    fn remove_nonexistent_is_ok() {
        let storage = mem_storage();
        storage.remove("exa").unwrap();
    }

    #[test]
    fn resolve_prefers_stored_key() {
        let storage = mem_storage();
        storage.set("exa", "sk-stored").unwrap();

        let key = storage
            .resolve("exa", "SURVEYOR_TEST_VAR_THAT_IS_NOT_SET")
            .unwrap();
        assert_eq!(key.unwrap(), "sk-stored");
    }

    #[test]
    fn resolve_returns_none_when_nothing_is_configured() {
        let storage = mem_storage();
        let key = storage
            .resolve("exa", "SURVEYOR_TEST_VAR_THAT_IS_NOT_SET")
            .unwrap();
        assert!(key.is_none());
    }
}
