// ==========================================
// Setup Sheet Analyzer - Project API
// ==========================================
// Scope: one open project; engine state + persistence
// Rules:
//   - sheet mutations apply in memory first, then persist
//   - a failed persist is logged and kept, unless
//     persistence.rollback_on_failure is set
//   - highlighting, sorting and selection are never persisted
// ==========================================

use crate::api::dto::{GroupCreation, LedgerSnapshot};
use crate::api::error::{ApiError, ApiResult};
use crate::config::AnalyzerConfig;
use crate::domain::catalog::{
    GroupDefinition, NewGroup, NewSetupSheet, ProjectPatch, SetupSheetPatch, ToolRegistration,
};
use crate::domain::setup_sheet::SetupSheet;
use crate::domain::tool::SheetKey;
use crate::domain::types::{SortColumn, SortOrder, ToolDurability};
use crate::engine::{AggregationEngine, LedgerEventPublisher};
use crate::export::write_ledger_csv;
use crate::repository::{LedgerStore, RepositoryError};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// ProjectApi
// ==========================================

/// Project API
///
/// Responsibilities:
/// 1. load a stored project into an AggregationEngine
/// 2. forward user actions to the engine
/// 3. persist sheet, scale, catalog and group changes
pub struct ProjectApi {
    project_id: String,
    store: Arc<dyn LedgerStore>,
    config: AnalyzerConfig,
    engine: AggregationEngine,
}

impl ProjectApi {
    /// Open a stored project
    ///
    /// # Parameters
    /// - store: persistence backend
    /// - project_id: project to load
    /// - config: analyzer settings
    ///
    /// # Returns
    /// - Err(NotFound): unknown project
    pub async fn open(
        store: Arc<dyn LedgerStore>,
        project_id: &str,
        config: AnalyzerConfig,
    ) -> ApiResult<Self> {
        Self::open_with_publisher(store, project_id, config, None).await
    }

    /// `open` with a ledger event subscriber attached before the first rebuild
    pub async fn open_with_publisher(
        store: Arc<dyn LedgerStore>,
        project_id: &str,
        config: AnalyzerConfig,
        publisher: Option<Arc<dyn LedgerEventPublisher>>,
    ) -> ApiResult<Self> {
        let project = store
            .find_project(project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("project (id={})", project_id)))?;

        crate::i18n::set_locale(&config.locale);

        let mut engine = AggregationEngine::new(Some(project.id.clone()))?
            .with_collapse_group_members(config.collapse_group_members)
            .with_sort_options(config.default_sort());
        if let Some(publisher) = publisher {
            engine = engine.with_event_publisher(publisher);
        }

        let mut sheets = Vec::new();
        for stored in store.list_setup_sheets(&project.id).await? {
            match engine.parse_setup_sheet(&stored.content, &stored.file_name) {
                Ok(mut sheet) => {
                    sheet.set_id(stored.id.clone());
                    sheet.scale = stored.scale;
                    sheet.ignored = stored.ignored;
                    sheets.push(sheet);
                }
                Err(e) => {
                    warn!(
                        sheet_id = %stored.id,
                        file_name = %stored.file_name,
                        error = %e,
                        "stored setup sheet no longer parses, skipped"
                    );
                }
            }
        }

        let groups = store.list_groups(&project.id).await?;
        let catalog = store.list_tools().await?;
        info!(
            project_id = %project.id,
            sheets = sheets.len(),
            groups = groups.len(),
            catalog = catalog.len(),
            "project opened"
        );
        engine.reload(project.scale, sheets, groups, catalog)?;

        Ok(Self {
            project_id: project.id,
            store,
            config,
            engine,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Read-only engine access
    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    /// Key of the loaded sheet with persisted id `id`
    pub fn sheet_key(&self, id: &str) -> Option<SheetKey> {
        self.engine.sheet_by_id(id).map(|s| s.key)
    }

    // ==========================================
    // Setup sheets
    // ==========================================

    /// Parse, add, then persist a report
    ///
    /// # Returns
    /// - Ok(SheetKey): the sheet is in the ledger
    /// - Err(Import): report rejected, nothing changed
    pub async fn add_setup_sheet(&mut self, content: &str, file_name: &str) -> ApiResult<SheetKey> {
        let sheet = self.engine.parse_setup_sheet(content, file_name)?;
        let name = sheet.name.clone();
        let key = self.engine.add_sheet(sheet);

        let new_sheet = NewSetupSheet {
            name,
            file_name: file_name.to_string(),
            content: content.to_string(),
        };
        match self.store.create_setup_sheet(&self.project_id, new_sheet).await {
            Ok(id) => {
                self.engine.attach_sheet_id(key, &id)?;
                Ok(key)
            }
            Err(e) => {
                if self.config.rollback_on_failure {
                    self.engine.remove_sheet(key)?;
                }
                self.persistence_failed("create_setup_sheet", e)?;
                Ok(key)
            }
        }
    }

    pub async fn delete_setup_sheet(&mut self, key: SheetKey) -> ApiResult<()> {
        let index = self
            .engine
            .sheet_index(key)
            .ok_or_else(|| ApiError::NotFound(format!("setup sheet {}", key)))?;
        let sheet = self.engine.remove_sheet(key)?;

        let Some(id) = sheet.id.clone() else {
            debug!(sheet = %sheet.name, "unsaved setup sheet removed");
            return Ok(());
        };
        if let Err(e) = self.store.delete_setup_sheet(&id).await {
            if self.config.rollback_on_failure {
                self.engine.restore_sheet(index, sheet);
            }
            return self.persistence_failed("delete_setup_sheet", e);
        }
        Ok(())
    }

    /// Remove every sheet of the project
    ///
    /// With rollback enabled, sheets whose deletion failed are put back.
    pub async fn delete_all_setup_sheets(&mut self) -> ApiResult<()> {
        let removed = self.engine.remove_all_sheets();

        let mut kept = Vec::new();
        let mut first_error = None;
        for sheet in removed {
            let Some(id) = sheet.id.clone() else {
                continue;
            };
            if let Err(e) = self.store.delete_setup_sheet(&id).await {
                warn!(sheet_id = %id, error = %e, "failed to delete setup sheet");
                kept.push(sheet);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => {
                if self.config.rollback_on_failure {
                    self.engine.restore_all_sheets(kept);
                }
                self.persistence_failed("delete_all_setup_sheets", e)
            }
            None => Ok(()),
        }
    }

    pub async fn ignore_setup_sheet(&mut self, key: SheetKey) -> ApiResult<()> {
        self.set_sheet_ignored(key, true).await
    }

    pub async fn unignore_setup_sheet(&mut self, key: SheetKey) -> ApiResult<()> {
        self.set_sheet_ignored(key, false).await
    }

    async fn set_sheet_ignored(&mut self, key: SheetKey, ignored: bool) -> ApiResult<()> {
        let previous = self.sheet_flag(key, |s| s.ignored)?;
        if ignored {
            self.engine.ignore_sheet(key)?;
        } else {
            self.engine.unignore_sheet(key)?;
        }

        let patch = SetupSheetPatch {
            ignored: Some(ignored),
            ..Default::default()
        };
        if let Err(e) = self.persist_sheet_patch(key, patch).await {
            if self.config.rollback_on_failure && previous != ignored {
                if previous {
                    self.engine.ignore_sheet(key)?;
                } else {
                    self.engine.unignore_sheet(key)?;
                }
            }
            return self.persistence_failed("update_setup_sheet", e);
        }
        Ok(())
    }

    /// Ignore every sheet but `key`, which becomes unignored
    pub async fn ignore_all_except(&mut self, key: SheetKey) -> ApiResult<()> {
        let previous = self.engine.ignore_all_except(key)?;

        let mut persisted: Vec<(SheetKey, bool)> = Vec::new();
        for (sheet_key, was_ignored) in &previous {
            let now_ignored = *sheet_key != key;
            if *was_ignored == now_ignored {
                continue;
            }
            let patch = SetupSheetPatch {
                ignored: Some(now_ignored),
                ..Default::default()
            };
            if let Err(e) = self.persist_sheet_patch(*sheet_key, patch).await {
                if self.config.rollback_on_failure {
                    self.engine.restore_ignored_flags(&previous);
                    for (done_key, done_previous) in &persisted {
                        let revert = SetupSheetPatch {
                            ignored: Some(*done_previous),
                            ..Default::default()
                        };
                        if let Err(revert_err) = self.persist_sheet_patch(*done_key, revert).await {
                            warn!(error = %revert_err, "failed to revert ignored flag");
                        }
                    }
                }
                return self.persistence_failed("ignore_all_except", e);
            }
            persisted.push((*sheet_key, *was_ignored));
        }
        Ok(())
    }

    pub async fn set_sheet_scale(&mut self, key: SheetKey, scale: f64) -> ApiResult<()> {
        let previous = self.sheet_flag(key, |s| s.scale)?;
        self.engine.set_sheet_scale(key, scale)?;

        let patch = SetupSheetPatch {
            scale: Some(scale),
            ..Default::default()
        };
        if let Err(e) = self.persist_sheet_patch(key, patch).await {
            if self.config.rollback_on_failure {
                self.engine.set_sheet_scale(key, previous)?;
            }
            return self.persistence_failed("update_setup_sheet", e);
        }
        Ok(())
    }

    // ==========================================
    // Project scale
    // ==========================================

    pub async fn set_scale(&mut self, scale: f64) -> ApiResult<()> {
        let previous = self.engine.scale();
        self.engine.set_scale(scale)?;

        let patch = ProjectPatch {
            scale: Some(scale),
            ..Default::default()
        };
        if let Err(e) = self.store.update_project(&self.project_id, patch).await {
            if self.config.rollback_on_failure {
                self.engine.set_scale(previous)?;
            }
            return self.persistence_failed("update_project", e);
        }
        Ok(())
    }

    // ==========================================
    // View state (never persisted)
    // ==========================================

    pub fn highlight_setup_sheet(&mut self, key: SheetKey) -> ApiResult<()> {
        Ok(self.engine.highlight(key)?)
    }

    pub fn unhighlight_setup_sheet(&mut self, key: SheetKey) -> ApiResult<()> {
        Ok(self.engine.unhighlight(key)?)
    }

    pub fn unhighlight_all_setup_sheets(&mut self) {
        self.engine.unhighlight_all();
    }

    pub fn sort_by(&mut self, column: SortColumn, order: SortOrder) {
        self.engine.sort_by(column, order);
    }

    /// # Returns
    /// false when no merged row has that name
    pub fn select_tool(&mut self, name: &str) -> bool {
        self.engine.select_tool(name)
    }

    pub fn deselect_tool(&mut self, name: &str) -> bool {
        self.engine.deselect_tool(name)
    }

    pub fn clear_selection(&mut self) {
        self.engine.clear_selection();
    }

    // ==========================================
    // Catalog and groups
    // ==========================================

    /// Register (or re-register) a tool in the catalog
    ///
    /// Every merged tool with that name picks up the price and durability.
    pub async fn register_tool(&mut self, registration: ToolRegistration) -> ApiResult<()> {
        if registration.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("tool name must not be empty".to_string()));
        }
        validate_amount("price", registration.price)?;
        validate_amount("diameter", registration.diameter)?;

        self.store.upsert_tool(registration.clone()).await?;
        info!(tool = %registration.name, price = registration.price, "tool registered");
        self.engine.register_catalog_tool(registration);
        Ok(())
    }

    pub async fn update_group(
        &mut self,
        group_id: &str,
        price: f64,
        durability: ToolDurability,
    ) -> ApiResult<()> {
        validate_amount("price", price)?;
        let mut group: GroupDefinition = self
            .engine
            .groups()
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("tool group (id={})", group_id)))?;

        self.store.update_group(group_id, price, durability).await?;
        group.price = price;
        group.durability = durability;
        self.engine.upsert_group(group);
        Ok(())
    }

    pub async fn delete_group(&mut self, group_id: &str) -> ApiResult<()> {
        if !self.engine.groups().iter().any(|g| g.id == group_id) {
            return Err(ApiError::NotFound(format!("tool group (id={})", group_id)));
        }
        self.store.delete_group(group_id).await?;
        self.engine.remove_group(group_id);
        Ok(())
    }

    /// Turn the current selection into a stored group
    ///
    /// # Returns
    /// - Ok(Rejected): selection invalid, nothing stored
    /// - Ok(Created): group stored, ledger rebuilt, selection cleared
    pub async fn group_selected_tools(&mut self, name: &str) -> ApiResult<GroupCreation> {
        let tool_names = match self.engine.validate_selection(name) {
            Ok(names) => names,
            Err(violation) => {
                debug!(?violation, "group creation rejected");
                return Ok(GroupCreation::Rejected {
                    message: violation.message(),
                });
            }
        };

        let group_id = self
            .store
            .create_group(NewGroup {
                project_id: self.project_id.clone(),
                name: name.trim().to_string(),
                tool_names,
            })
            .await?;

        let groups = self.store.list_groups(&self.project_id).await?;
        self.engine.set_groups(groups);
        self.engine.clear_selection();
        info!(group_id = %group_id, name = name.trim(), "tool group created");
        Ok(GroupCreation::Created { group_id })
    }

    // ==========================================
    // Read side
    // ==========================================

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::from_engine(&self.engine)
    }

    /// Merged ledger as CSV, in the current sort order
    pub fn export_csv<W: Write>(&self, writer: W) -> ApiResult<()> {
        let snapshot = self.ledger_snapshot();
        write_ledger_csv(&snapshot.rows, writer)?;
        Ok(())
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn sheet_flag<T>(&self, key: SheetKey, read: impl Fn(&SetupSheet) -> T) -> ApiResult<T> {
        self.engine
            .sheet(key)
            .map(read)
            .ok_or_else(|| ApiError::NotFound(format!("setup sheet {}", key)))
    }

    /// Persist a patch for a saved sheet; unsaved sheets are skipped.
    async fn persist_sheet_patch(
        &self,
        key: SheetKey,
        patch: SetupSheetPatch,
    ) -> Result<(), RepositoryError> {
        match self.engine.sheet(key).and_then(|s| s.id.clone()) {
            Some(id) => self.store.update_setup_sheet(&id, patch).await,
            None => {
                debug!(%key, "setup sheet not persisted yet, patch skipped");
                Ok(())
            }
        }
    }

    fn persistence_failed(&self, operation: &str, err: RepositoryError) -> ApiResult<()> {
        if self.config.rollback_on_failure {
            warn!(operation, error = %err, "persistence failed, change rolled back");
            Err(ApiError::PersistenceRolledBack(format!("{}: {}", operation, err)))
        } else {
            warn!(operation, error = %err, "persistence failed, keeping in-memory change");
            Ok(())
        }
    }
}

fn validate_amount(field: &str, value: f64) -> ApiResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "{} must be a finite, non-negative number (got {})",
            field, value
        )))
    }
}
