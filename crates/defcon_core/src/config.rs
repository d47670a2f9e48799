//! Storage configuration for a task list session.

use std::path::PathBuf;

use crate::store::list_store::DEFAULT_STORAGE_KEY;

/// Environment variable overriding the database file location.
pub const DB_PATH_ENV: &str = "DEFCON_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "defcon.sqlite3";

/// Where and under which key the task list is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Defaults, with `db_path` taken from `DEFCON_DB_PATH` when set and
    /// non-blank.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(DB_PATH_ENV).ok())
    }

    fn from_env_value(raw: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = raw {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.db_path = PathBuf::from(trimmed);
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use std::path::PathBuf;

    #[test]
    fn default_uses_todo_key_in_temp_dir() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "todo");
        assert!(config.db_path.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn env_value_overrides_path_unless_blank() {
        let custom = StoreConfig::from_env_value(Some(" /var/lib/defcon.db ".to_string()));
        assert_eq!(custom.db_path, PathBuf::from("/var/lib/defcon.db"));

        let blank = StoreConfig::from_env_value(Some("   ".to_string()));
        assert_eq!(blank, StoreConfig::default());
    }
}
