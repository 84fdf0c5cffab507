// ==========================================
// Setup Sheet Analyzer - Workspace API
// ==========================================
// Scope: project CRUD with input validation
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{ProjectPatch, ProjectRecord, ProjectSummary};
use crate::engine::validate_scale;
use crate::repository::LedgerStore;
use std::sync::Arc;
use tracing::info;

pub struct WorkspaceApi {
    store: Arc<dyn LedgerStore>,
}

impl WorkspaceApi {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Create a project
    ///
    /// # Returns
    /// - Ok(String): project id
    /// - Err(InvalidInput): blank name
    pub async fn create_project(&self, name: &str) -> ApiResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("project name must not be empty".to_string()));
        }
        let id = self.store.create_project(name).await?;
        info!(project_id = %id, name, "project created");
        Ok(id)
    }

    pub async fn list_projects(&self) -> ApiResult<Vec<ProjectSummary>> {
        Ok(self.store.list_projects().await?)
    }

    pub async fn get_project(&self, id: &str) -> ApiResult<ProjectRecord> {
        self.store
            .find_project(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("project (id={})", id)))
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> ApiResult<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ApiError::InvalidInput("project name must not be empty".to_string()));
            }
        }
        if let Some(scale) = patch.scale {
            validate_scale(scale)?;
        }
        let patch = ProjectPatch {
            name: patch.name.map(|n| n.trim().to_string()),
            ..patch
        };
        Ok(self.store.update_project(id, patch).await?)
    }

    /// Delete a project with all of its sheets and groups
    pub async fn delete_project(&self, id: &str) -> ApiResult<()> {
        self.store.delete_project(id).await?;
        info!(project_id = %id, "project deleted");
        Ok(())
    }
}
