// ==========================================
// Setup Sheet Analyzer - Domain layer
// ==========================================
// Scope: entities, value maps and derived tool metrics
// Rule: no data access, no HTML scraping
// ==========================================

pub mod catalog;
pub mod setup_sheet;
pub mod tool;
pub mod types;

// Re-export core types
pub use catalog::{
    CatalogTool, GroupDefinition, NewGroup, NewSetupSheet, ProjectPatch, ProjectRecord,
    ProjectSummary, SetupSheetPatch, StoredSetupSheet, ToolRegistration,
};
pub use setup_sheet::{SetupSheet, MERGED_SHEET_NAME, NO_FILE_NAME};
pub use tool::{SheetKey, ToolEntry, ToolGroup, ToolMetrics, ToolRecord, METRIC_DECIMALS};
pub use types::{
    CategoryMap, OperationCategory, SortColumn, SortOptions, SortOrder, ToolDurability, ToolUsage,
};
