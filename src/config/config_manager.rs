// ==========================================
// Setup Sheet Analyzer - Config manager
// ==========================================
// Storage: config_kv table (key -> value)
// Rule: missing or malformed values fall back to defaults
// ==========================================

use crate::config::analyzer_config::AnalyzerConfig;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::{SortColumn, SortOrder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a database file and make sure the schema exists
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection; PRAGMAs are re-applied (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Raw value of `key`, None if unset
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite `key`
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Local::now().naive_local()],
        )?;
        Ok(())
    }

    /// Remove `key`; returns whether it existed
    pub fn remove_value(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM config_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// Every stored key/value pair
    pub fn snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// Typed view of every analyzer setting
    pub fn load_analyzer_config(&self) -> RepositoryResult<AnalyzerConfig> {
        let defaults = AnalyzerConfig::default();
        Ok(AnalyzerConfig {
            collapse_group_members: self.parsed_or(
                config_keys::COLLAPSE_GROUP_MEMBERS,
                defaults.collapse_group_members,
            )?,
            rollback_on_failure: self.parsed_or(
                config_keys::ROLLBACK_ON_FAILURE,
                defaults.rollback_on_failure,
            )?,
            default_sort_column: self.parsed_or::<SortColumn>(
                config_keys::DEFAULT_SORT_COLUMN,
                defaults.default_sort_column,
            )?,
            default_sort_order: self.parsed_or::<SortOrder>(
                config_keys::DEFAULT_SORT_ORDER,
                defaults.default_sort_order,
            )?,
            locale: self
                .get_value(config_keys::UI_LOCALE)?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.locale),
        })
    }

    fn parsed_or<T: FromStr>(&self, key: &str, default: T) -> RepositoryResult<T> {
        match self.get_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Ok(value),
                Err(_) => {
                    warn!(key, value = %raw, "malformed config value, using default");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // Ledger
    pub const COLLAPSE_GROUP_MEMBERS: &str = "ledger.collapse_group_members";
    pub const DEFAULT_SORT_COLUMN: &str = "ledger.default_sort_column";
    pub const DEFAULT_SORT_ORDER: &str = "ledger.default_sort_order";

    // Persistence
    pub const ROLLBACK_ON_FAILURE: &str = "persistence.rollback_on_failure";

    // UI
    pub const UI_LOCALE: &str = "ui.locale";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::types::OperationCategory;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = manager().load_analyzer_config().unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_set_get_remove() {
        let manager = manager();
        manager.set_value(config_keys::UI_LOCALE, "fa").unwrap();
        manager.set_value(config_keys::UI_LOCALE, "en").unwrap();
        assert_eq!(
            manager.get_value(config_keys::UI_LOCALE).unwrap().as_deref(),
            Some("en")
        );
        assert_eq!(manager.snapshot().unwrap().len(), 1);

        assert!(manager.remove_value(config_keys::UI_LOCALE).unwrap());
        assert!(!manager.remove_value(config_keys::UI_LOCALE).unwrap());
    }

    #[test]
    fn test_load_typed_values() {
        let manager = manager();
        manager.set_value(config_keys::COLLAPSE_GROUP_MEMBERS, "true").unwrap();
        manager.set_value(config_keys::ROLLBACK_ON_FAILURE, "true").unwrap();
        manager.set_value(config_keys::DEFAULT_SORT_COLUMN, "usage.rough").unwrap();
        manager.set_value(config_keys::DEFAULT_SORT_ORDER, "desc").unwrap();
        manager.set_value(config_keys::UI_LOCALE, "fa").unwrap();

        let config = manager.load_analyzer_config().unwrap();
        assert!(config.collapse_group_members);
        assert!(config.rollback_on_failure);
        assert_eq!(
            config.default_sort_column,
            SortColumn::Usage(OperationCategory::Rough)
        );
        assert_eq!(config.default_sort_order, SortOrder::Desc);
        assert_eq!(config.locale, "fa");
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let manager = manager();
        manager.set_value(config_keys::COLLAPSE_GROUP_MEMBERS, "maybe").unwrap();
        manager.set_value(config_keys::DEFAULT_SORT_COLUMN, "colour").unwrap();

        let config = manager.load_analyzer_config().unwrap();
        assert!(!config.collapse_group_members);
        assert_eq!(config.default_sort_column, SortColumn::None);
    }
}
