// ==========================================
// Setup Sheet Analyzer - Repository layer
// ==========================================
// Rule: repositories hold no business logic
// Constraint: all queries are parameterized
// ==========================================

pub mod error;
pub mod group_repo;
pub mod ledger_store;
pub mod ledger_store_impl;
pub mod project_repo;
pub mod setup_sheet_repo;
pub mod tool_repo;

// Re-export core repositories
pub use error::{RepositoryError, RepositoryResult};
pub use group_repo::ToolGroupRepository;
pub use ledger_store::LedgerStore;
pub use ledger_store_impl::SqliteLedgerStore;
pub use project_repo::ProjectRepository;
pub use setup_sheet_repo::SetupSheetRepository;
pub use tool_repo::ToolRepository;
