// ==========================================
// Setup Sheet Analyzer - API layer
// ==========================================
// Scope: entry points for UIs and the CLI
// Rule: the API orchestrates engine and store, it holds no rules of its own
// ==========================================

pub mod dto;
pub mod error;
pub mod project_api;
pub mod workspace_api;

// Re-export core API types
pub use dto::{GroupCreation, LedgerRow, LedgerSnapshot, SheetRow};
pub use error::{ApiError, ApiResult};
pub use project_api::ProjectApi;
pub use workspace_api::WorkspaceApi;
