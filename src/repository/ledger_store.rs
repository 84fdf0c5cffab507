// ==========================================
// Setup Sheet Analyzer - LedgerStore trait
// ==========================================
// Scope: persistence contract the project service depends on
// Implementor: SqliteLedgerStore (rusqlite)
// Rule: no business rules, data CRUD only
// ==========================================

use crate::domain::catalog::{
    CatalogTool, GroupDefinition, NewGroup, NewSetupSheet, ProjectPatch, ProjectRecord,
    ProjectSummary, SetupSheetPatch, StoredSetupSheet, ToolRegistration,
};
use crate::domain::types::ToolDurability;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ===== Projects =====

    /// Create a project
    ///
    /// # Returns
    /// - Ok(String): new project id
    async fn create_project(&self, name: &str) -> RepositoryResult<String>;

    async fn update_project(&self, id: &str, patch: ProjectPatch) -> RepositoryResult<()>;

    /// Delete a project with its sheets and groups
    async fn delete_project(&self, id: &str) -> RepositoryResult<()>;

    async fn find_project(&self, id: &str) -> RepositoryResult<Option<ProjectRecord>>;

    async fn list_projects(&self) -> RepositoryResult<Vec<ProjectSummary>>;

    // ===== Setup sheets =====

    /// Store a parsed report's raw HTML
    ///
    /// # Returns
    /// - Ok(String): new sheet id
    async fn create_setup_sheet(
        &self,
        project_id: &str,
        sheet: NewSetupSheet,
    ) -> RepositoryResult<String>;

    async fn update_setup_sheet(&self, id: &str, patch: SetupSheetPatch) -> RepositoryResult<()>;

    async fn delete_setup_sheet(&self, id: &str) -> RepositoryResult<()>;

    /// Sheets of a project, oldest first
    async fn list_setup_sheets(&self, project_id: &str) -> RepositoryResult<Vec<StoredSetupSheet>>;

    // ===== Tool catalog =====

    /// Create-or-update by name
    async fn upsert_tool(&self, tool: ToolRegistration) -> RepositoryResult<()>;

    async fn find_tool(&self, name: &str) -> RepositoryResult<Option<CatalogTool>>;

    async fn list_tools(&self) -> RepositoryResult<Vec<CatalogTool>>;

    // ===== Tool groups =====

    /// Create a group from the first listed tool's catalog attributes
    ///
    /// # Returns
    /// - Ok(String): new group id
    /// - Err(NotFound): first tool not registered
    async fn create_group(&self, group: NewGroup) -> RepositoryResult<String>;

    async fn update_group(
        &self,
        id: &str,
        price: f64,
        durability: ToolDurability,
    ) -> RepositoryResult<()>;

    async fn find_group(&self, id: &str) -> RepositoryResult<Option<GroupDefinition>>;

    async fn list_groups(&self, project_id: &str) -> RepositoryResult<Vec<GroupDefinition>>;

    async fn delete_group(&self, id: &str) -> RepositoryResult<()>;
}
