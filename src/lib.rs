// ==========================================
// Setup Sheet Analyzer - Core library
// ==========================================
// Stack: Rust + SQLite
// Purpose: tool wear, need and cost estimation from CAM setup sheets
// ==========================================

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// Modules
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Import layer - HTML setup-sheet reports
pub mod importer;

// Engine layer - aggregation, grouping, sorting
pub mod engine;

// Repository layer - data access
pub mod repository;

// Config layer
pub mod config;

// SQLite infrastructure (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// Internationalization
pub mod i18n;

// Ledger export
pub mod export;

// API layer
pub mod api;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{OperationCategory, SortColumn, SortOptions, SortOrder, ToolDurability, ToolUsage};

// Domain entities
pub use domain::{SetupSheet, SheetKey, ToolEntry, ToolGroup, ToolMetrics, ToolRecord};

// Importer
pub use importer::{ImportError, OperationClassifier, SetupSheetParser};

// Engine
pub use engine::{AggregationEngine, EngineError, LedgerSorter, MergedLedger};

// API
pub use api::{ApiError, GroupCreation, LedgerSnapshot, ProjectApi, WorkspaceApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Setup Sheet Analyzer";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
