// ==========================================
// Setup Sheet Analyzer - SQLite LedgerStore
// ==========================================
// Scope: LedgerStore over the table repositories, one shared connection
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema};
use crate::domain::catalog::{
    CatalogTool, GroupDefinition, NewGroup, NewSetupSheet, ProjectPatch, ProjectRecord,
    ProjectSummary, SetupSheetPatch, StoredSetupSheet, ToolRegistration,
};
use crate::domain::types::ToolDurability;
use crate::repository::error::RepositoryResult;
use crate::repository::group_repo::ToolGroupRepository;
use crate::repository::ledger_store::LedgerStore;
use crate::repository::project_repo::ProjectRepository;
use crate::repository::setup_sheet_repo::SetupSheetRepository;
use crate::repository::tool_repo::ToolRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteLedgerStore
// ==========================================
pub struct SqliteLedgerStore {
    projects: ProjectRepository,
    sheets: SetupSheetRepository,
    tools: ToolRepository,
    groups: ToolGroupRepository,
}

impl SqliteLedgerStore {
    /// Open (or create) a database file
    ///
    /// # Parameters
    /// - db_path: SQLite file path
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = Connection::open(db_path)?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// In-memory database, schema included
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// Share an already configured connection (schema must exist)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            projects: ProjectRepository::from_connection(conn.clone()),
            sheets: SetupSheetRepository::from_connection(conn.clone()),
            tools: ToolRepository::from_connection(conn.clone()),
            groups: ToolGroupRepository::from_connection(conn),
        }
    }
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn create_project(&self, name: &str) -> RepositoryResult<String> {
        self.projects.create(name)
    }

    async fn update_project(&self, id: &str, patch: ProjectPatch) -> RepositoryResult<()> {
        self.projects.update(id, &patch)
    }

    async fn delete_project(&self, id: &str) -> RepositoryResult<()> {
        self.projects.delete(id)
    }

    async fn find_project(&self, id: &str) -> RepositoryResult<Option<ProjectRecord>> {
        self.projects.find_by_id(id)
    }

    async fn list_projects(&self) -> RepositoryResult<Vec<ProjectSummary>> {
        self.projects.list_with_counts()
    }

    async fn create_setup_sheet(
        &self,
        project_id: &str,
        sheet: NewSetupSheet,
    ) -> RepositoryResult<String> {
        self.sheets.create(project_id, &sheet)
    }

    async fn update_setup_sheet(&self, id: &str, patch: SetupSheetPatch) -> RepositoryResult<()> {
        self.sheets.update(id, patch)
    }

    async fn delete_setup_sheet(&self, id: &str) -> RepositoryResult<()> {
        self.sheets.delete(id)
    }

    async fn list_setup_sheets(&self, project_id: &str) -> RepositoryResult<Vec<StoredSetupSheet>> {
        self.sheets.list_by_project(project_id)
    }

    async fn upsert_tool(&self, tool: ToolRegistration) -> RepositoryResult<()> {
        self.tools.upsert(&tool)
    }

    async fn find_tool(&self, name: &str) -> RepositoryResult<Option<CatalogTool>> {
        self.tools.find_by_name(name)
    }

    async fn list_tools(&self) -> RepositoryResult<Vec<CatalogTool>> {
        self.tools.list()
    }

    async fn create_group(&self, group: NewGroup) -> RepositoryResult<String> {
        self.groups.create(&group)
    }

    async fn update_group(
        &self,
        id: &str,
        price: f64,
        durability: ToolDurability,
    ) -> RepositoryResult<()> {
        self.groups.update(id, price, &durability)
    }

    async fn find_group(&self, id: &str) -> RepositoryResult<Option<GroupDefinition>> {
        self.groups.find_by_id(id)
    }

    async fn list_groups(&self, project_id: &str) -> RepositoryResult<Vec<GroupDefinition>> {
        self.groups.list_by_project(project_id)
    }

    async fn delete_group(&self, id: &str) -> RepositoryResult<()> {
        self.groups.delete(id)
    }
}
