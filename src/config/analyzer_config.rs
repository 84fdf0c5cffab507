// ==========================================
// Setup Sheet Analyzer - Typed settings
// ==========================================

use crate::domain::types::{SortColumn, SortOptions, SortOrder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Env var overriding the database location
pub const DB_PATH_ENV: &str = "SETUP_SHEET_ANALYZER_DB_PATH";

const DATA_DIR_NAME: &str = "setup-sheet-analyzer";
const DB_FILE_NAME: &str = "setup_sheet_analyzer.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Hide single rows whose tool belongs to a group
    pub collapse_group_members: bool,
    /// Revert the in-memory change when persisting it fails
    pub rollback_on_failure: bool,
    pub default_sort_column: SortColumn,
    pub default_sort_order: SortOrder,
    pub locale: String,
}

impl AnalyzerConfig {
    pub fn default_sort(&self) -> SortOptions {
        SortOptions {
            column: self.default_sort_column,
            order: self.default_sort_order,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            collapse_group_members: false,
            rollback_on_failure: false,
            default_sort_column: SortColumn::None,
            default_sort_order: SortOrder::Asc,
            locale: "en".to_string(),
        }
    }
}

/// Default database path
///
/// # Returns
/// 1. `SETUP_SHEET_ANALYZER_DB_PATH` when set and non-blank
/// 2. `<data_dir>/setup-sheet-analyzer/setup_sheet_analyzer.db`
/// 3. `./setup_sheet_analyzer.db`
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join(DATA_DIR_NAME);
        // best effort; opening the database reports the real failure
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_file_name() {
        let path = default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_default_sort() {
        let config = AnalyzerConfig {
            default_sort_column: SortColumn::Cost,
            default_sort_order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(
            config.default_sort(),
            SortOptions {
                column: SortColumn::Cost,
                order: SortOrder::Desc
            }
        );
    }
}
