// ==========================================
// Setup Sheet Analyzer - Config layer
// ==========================================
// Storage: config_kv table
// ==========================================

pub mod analyzer_config;
pub mod config_manager;

// Re-export config types
pub use analyzer_config::{default_db_path, AnalyzerConfig, DB_PATH_ENV};
pub use config_manager::{config_keys, ConfigManager};
