//! Project-wide constants.

use std::path::PathBuf;

/// Base URL of the hosted research service.
pub const API_BASE_URL: &str = "https://api.exa.ai";

/// Environment variable consulted when no API key is stored.
pub const ENV_API_KEY: &str = "EXA_API_KEY";

/// Service name used to key stored credentials.
pub const SERVICE: &str = "exa";

/// Default research model when none is specified.
pub const DEFAULT_MODEL: &str = "exa-research";

/// Maximum number of ledger entries shown by `history` when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default database path: `~/.surveyor/surveyor.db`.
/// Single DB for credentials and the local task ledger.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .expect("cannot determine home directory")
        .join(".surveyor")
        .join("surveyor.db")
}
