// ==========================================
// Setup Sheet Analyzer - Aggregation engine
// ==========================================
// Scope: owns the loaded setup sheets and rebuilds the merged ledger
// Rebuild flow:
//   1. merge unignored sheets (multiplier = sheet scale * project scale)
//   2. apply catalog price/durability
//   3. fold group definitions
//   4. re-apply the last sort
//   5. publish a LedgerEvent
// ==========================================

use crate::domain::catalog::{CatalogTool, GroupDefinition};
use crate::domain::setup_sheet::SetupSheet;
use crate::domain::tool::{SheetKey, ToolEntry, ToolMetrics};
use crate::domain::types::{SortColumn, SortOptions, SortOrder};
use crate::engine::error::{validate_scale, EngineError, EngineResult};
use crate::engine::events::{LedgerEvent, LedgerEventPublisher, OptionalEventPublisher, RebuildTrigger};
use crate::engine::grouping::{fold_groups, validate_group_selection, SelectionViolation};
use crate::engine::sorter::LedgerSorter;
use crate::importer::SetupSheetParser;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// MergedLedger - result of one rebuild
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MergedLedger {
    /// Key of the synthetic MERGED sheet
    pub key: SheetKey,
    /// Single tools followed by groups, in the current sort order
    pub entries: Vec<ToolEntry>,
}

impl MergedLedger {
    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn find_single(&self, name: &str) -> Option<&ToolEntry> {
        self.entries
            .iter()
            .find(|e| !e.is_group() && e.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_group()).count()
    }
}

// ==========================================
// AggregationEngine
// ==========================================
pub struct AggregationEngine {
    project_id: Option<String>,
    scale: f64,
    sheets: Vec<SetupSheet>,
    groups: Vec<GroupDefinition>,
    catalog: HashMap<String, CatalogTool>,
    sort_options: SortOptions,
    selected: Vec<String>,
    collapse_group_members: bool,
    parser: SetupSheetParser,
    sorter: LedgerSorter,
    events: OptionalEventPublisher,
    merged: Option<MergedLedger>,
}

impl AggregationEngine {
    /// Empty engine with scale 1 and no sort.
    pub fn new(project_id: Option<String>) -> EngineResult<Self> {
        Ok(Self {
            project_id,
            scale: 1.0,
            sheets: Vec::new(),
            groups: Vec::new(),
            catalog: HashMap::new(),
            sort_options: SortOptions::default(),
            selected: Vec::new(),
            collapse_group_members: false,
            parser: SetupSheetParser::new()?,
            sorter: LedgerSorter::new(),
            events: OptionalEventPublisher::none(),
            merged: None,
        })
    }

    pub fn with_event_publisher(mut self, publisher: Arc<dyn LedgerEventPublisher>) -> Self {
        self.events = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    /// Builder form of `set_collapse_group_members`; no rebuild.
    pub fn with_collapse_group_members(mut self, collapse: bool) -> Self {
        self.collapse_group_members = collapse;
        self
    }

    /// Initial sort applied by every rebuild; no rebuild.
    pub fn with_sort_options(mut self, options: SortOptions) -> Self {
        self.sort_options = options;
        self
    }

    /// Drop single rows whose tool was absorbed by a group.
    pub fn set_collapse_group_members(&mut self, collapse: bool) {
        if self.collapse_group_members != collapse {
            self.collapse_group_members = collapse;
            self.rebuild(RebuildTrigger::GroupsChanged);
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    // ==========================================
    // Bulk load
    // ==========================================

    /// Replace all state in one step and rebuild once.
    pub fn reload(
        &mut self,
        scale: f64,
        sheets: Vec<SetupSheet>,
        groups: Vec<GroupDefinition>,
        catalog: Vec<CatalogTool>,
    ) -> EngineResult<()> {
        self.scale = validate_scale(scale)?;
        self.sheets = sheets;
        self.groups = groups;
        self.catalog = catalog.into_iter().map(|t| (t.name.clone(), t)).collect();
        self.selected.clear();
        self.rebuild(RebuildTrigger::Reloaded);
        Ok(())
    }

    // ==========================================
    // Setup sheets
    // ==========================================

    pub fn sheets(&self) -> &[SetupSheet] {
        &self.sheets
    }

    pub fn sheet(&self, key: SheetKey) -> Option<&SetupSheet> {
        self.sheets.iter().find(|s| s.key == key)
    }

    pub fn sheet_by_id(&self, id: &str) -> Option<&SetupSheet> {
        self.sheets.iter().find(|s| s.id.as_deref() == Some(id))
    }

    /// Sheets that currently feed the merged ledger.
    pub fn unignored_sheets(&self) -> impl Iterator<Item = &SetupSheet> {
        self.sheets.iter().filter(|s| !s.ignored)
    }

    fn sheet_mut(&mut self, key: SheetKey) -> EngineResult<&mut SetupSheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.key == key)
            .ok_or_else(|| EngineError::SheetNotFound(key.to_string()))
    }

    /// Parse an HTML report and add it.
    ///
    /// Nothing changes when parsing fails.
    pub fn load_setup_sheet(&mut self, content: &str, file_name: &str) -> EngineResult<SheetKey> {
        let sheet = self.parser.parse_str(content, file_name)?;
        Ok(self.add_sheet(sheet))
    }

    /// Parse without adding; callers that persist first use this.
    pub fn parse_setup_sheet(&self, content: &str, file_name: &str) -> EngineResult<SetupSheet> {
        Ok(self.parser.parse_str(content, file_name)?)
    }

    pub fn add_sheet(&mut self, sheet: SetupSheet) -> SheetKey {
        let key = sheet.key;
        info!(sheet = %sheet.name, tools = sheet.tools.len(), "setup sheet added");
        self.sheets.push(sheet);
        self.rebuild(RebuildTrigger::SheetAdded);
        key
    }

    /// Record the persisted id of a sheet; no rebuild.
    pub fn attach_sheet_id(&mut self, key: SheetKey, id: &str) -> EngineResult<()> {
        self.sheet_mut(key)?.set_id(id);
        Ok(())
    }

    /// Remove a sheet and return it, so callers can restore it.
    pub fn remove_sheet(&mut self, key: SheetKey) -> EngineResult<SetupSheet> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.key == key)
            .ok_or_else(|| EngineError::SheetNotFound(key.to_string()))?;
        let sheet = self.sheets.remove(index);
        self.rebuild(RebuildTrigger::SheetRemoved);
        Ok(sheet)
    }

    /// Re-insert a previously removed sheet at `index` (clamped).
    pub fn restore_sheet(&mut self, index: usize, sheet: SetupSheet) {
        let index = index.min(self.sheets.len());
        self.sheets.insert(index, sheet);
        self.rebuild(RebuildTrigger::SheetAdded);
    }

    pub fn sheet_index(&self, key: SheetKey) -> Option<usize> {
        self.sheets.iter().position(|s| s.key == key)
    }

    /// Remove every sheet; returns them in their previous order.
    pub fn remove_all_sheets(&mut self) -> Vec<SetupSheet> {
        let removed = std::mem::take(&mut self.sheets);
        self.rebuild(RebuildTrigger::SheetRemoved);
        removed
    }

    /// Put back sheets returned by `remove_all_sheets`.
    pub fn restore_all_sheets(&mut self, sheets: Vec<SetupSheet>) {
        self.sheets = sheets;
        self.rebuild(RebuildTrigger::SheetAdded);
    }

    pub fn ignore_sheet(&mut self, key: SheetKey) -> EngineResult<()> {
        self.sheet_mut(key)?.ignore();
        self.rebuild(RebuildTrigger::SheetIgnored);
        Ok(())
    }

    pub fn unignore_sheet(&mut self, key: SheetKey) -> EngineResult<()> {
        self.sheet_mut(key)?.unignore();
        self.rebuild(RebuildTrigger::SheetUnignored);
        Ok(())
    }

    /// Ignore every sheet except `key`, which is unignored.
    ///
    /// # Returns
    /// Previous ignored flag of every sheet, by key
    pub fn ignore_all_except(&mut self, key: SheetKey) -> EngineResult<Vec<(SheetKey, bool)>> {
        if self.sheet(key).is_none() {
            return Err(EngineError::SheetNotFound(key.to_string()));
        }
        let previous: Vec<(SheetKey, bool)> =
            self.sheets.iter().map(|s| (s.key, s.ignored)).collect();
        for sheet in self.sheets.iter_mut() {
            if sheet.key == key {
                sheet.unignore();
            } else {
                sheet.ignore();
            }
        }
        self.rebuild(RebuildTrigger::SheetIgnored);
        Ok(previous)
    }

    /// Restore ignored flags captured by `ignore_all_except`.
    pub fn restore_ignored_flags(&mut self, flags: &[(SheetKey, bool)]) {
        for (key, ignored) in flags {
            if let Some(sheet) = self.sheets.iter_mut().find(|s| s.key == *key) {
                sheet.ignored = *ignored;
            }
        }
        self.rebuild(RebuildTrigger::SheetUnignored);
    }

    pub fn set_sheet_scale(&mut self, key: SheetKey, scale: f64) -> EngineResult<()> {
        let scale = validate_scale(scale)?;
        self.sheet_mut(key)?.set_scale(scale);
        self.rebuild(RebuildTrigger::SheetScaled);
        Ok(())
    }

    // ==========================================
    // Project scale
    // ==========================================

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) -> EngineResult<()> {
        self.scale = validate_scale(scale)?;
        self.rebuild(RebuildTrigger::ProjectScaled);
        Ok(())
    }

    // ==========================================
    // Highlighting (view state, no rebuild)
    // ==========================================

    pub fn highlight(&mut self, key: SheetKey) -> EngineResult<()> {
        self.sheet_mut(key)?.highlight();
        Ok(())
    }

    pub fn unhighlight(&mut self, key: SheetKey) -> EngineResult<()> {
        self.sheet_mut(key)?.unhighlight();
        Ok(())
    }

    pub fn unhighlight_all(&mut self) {
        for sheet in self.sheets.iter_mut() {
            sheet.unhighlight();
        }
    }

    // ==========================================
    // Groups and catalog
    // ==========================================

    pub fn groups(&self) -> &[GroupDefinition] {
        &self.groups
    }

    pub fn set_groups(&mut self, groups: Vec<GroupDefinition>) {
        self.groups = groups;
        self.rebuild(RebuildTrigger::GroupsChanged);
    }

    /// Insert or replace a group definition by id.
    pub fn upsert_group(&mut self, group: GroupDefinition) {
        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
        self.rebuild(RebuildTrigger::GroupsChanged);
    }

    pub fn remove_group(&mut self, group_id: &str) -> Option<GroupDefinition> {
        let index = self.groups.iter().position(|g| g.id == group_id)?;
        let removed = self.groups.remove(index);
        self.rebuild(RebuildTrigger::GroupsChanged);
        Some(removed)
    }

    pub fn catalog_tool(&self, name: &str) -> Option<&CatalogTool> {
        self.catalog.get(name)
    }

    pub fn set_catalog(&mut self, tools: Vec<CatalogTool>) {
        self.catalog = tools.into_iter().map(|t| (t.name.clone(), t)).collect();
        self.rebuild(RebuildTrigger::CatalogChanged);
    }

    /// Insert or replace one catalog entry.
    ///
    /// # Returns
    /// The entry it replaced
    pub fn register_catalog_tool(&mut self, tool: CatalogTool) -> Option<CatalogTool> {
        let previous = self.catalog.insert(tool.name.clone(), tool);
        self.rebuild(RebuildTrigger::CatalogChanged);
        previous
    }

    pub fn unregister_catalog_tool(&mut self, name: &str) -> Option<CatalogTool> {
        let removed = self.catalog.remove(name);
        if removed.is_some() {
            self.rebuild(RebuildTrigger::CatalogChanged);
        }
        removed
    }

    // ==========================================
    // Sorting
    // ==========================================

    pub fn sort_options(&self) -> SortOptions {
        self.sort_options
    }

    /// Sort the merged ledger and remember the choice for later rebuilds.
    pub fn sort_by(&mut self, column: SortColumn, order: SortOrder) {
        self.sort_options = SortOptions { column, order };
        if let Some(merged) = self.merged.as_mut() {
            self.sorter.sort(&mut merged.entries, self.sort_options);
        }
    }

    // ==========================================
    // Selection
    // ==========================================

    /// Select a single-tool row of the merged ledger by name.
    ///
    /// # Returns
    /// false when no single tool has that name (group rows are not selectable)
    pub fn select_tool(&mut self, name: &str) -> bool {
        let present = self.merged().and_then(|m| m.find_single(name)).is_some();
        if present && !self.selected.iter().any(|n| n == name) {
            self.selected.push(name.to_string());
        }
        present
    }

    pub fn deselect_tool(&mut self, name: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|n| n != name);
        before != self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_names(&self) -> &[String] {
        &self.selected
    }

    /// Selected single tools resolved against the current merged ledger.
    pub fn selected_tools(&self) -> Vec<&ToolEntry> {
        match self.merged() {
            Some(merged) => self
                .selected
                .iter()
                .filter_map(|name| merged.find_single(name))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Validate the current selection as a new group called `name`.
    pub fn validate_selection(&self, name: &str) -> Result<Vec<String>, SelectionViolation> {
        validate_group_selection(&self.selected_tools(), name)
    }

    // ==========================================
    // Merged view
    // ==========================================

    /// None while no sheet is unignored.
    pub fn merged(&self) -> Option<&MergedLedger> {
        self.merged.as_ref()
    }

    /// Sheets contributing to `entry`, resolved from its source keys.
    pub fn sources_of(&self, entry: &ToolEntry) -> Vec<&SetupSheet> {
        entry
            .record()
            .sources
            .iter()
            .filter_map(|key| self.sheet(*key))
            .collect()
    }

    fn rebuild(&mut self, trigger: RebuildTrigger) {
        let mut target = SetupSheet::merged();
        let mut merged_count = 0;
        for sheet in self.sheets.iter().filter(|s| !s.ignored) {
            target.merge(sheet, sheet.scale * self.scale);
            merged_count += 1;
        }

        if merged_count == 0 {
            self.merged = None;
            debug!(trigger = trigger.as_str(), "no unignored sheets; ledger cleared");
            self.publish(trigger, 0, 0);
            return;
        }

        for tool in target.tools.iter_mut() {
            if let Some(catalog) = self.catalog.get(&tool.name) {
                tool.apply_catalog(catalog);
            }
        }

        let groups = fold_groups(&target.tools, &self.groups);
        let absorbed: Vec<String> = if self.collapse_group_members {
            groups
                .iter()
                .flat_map(|g| g.tools.iter().map(|t| t.name.clone()))
                .collect()
        } else {
            Vec::new()
        };

        let mut entries: Vec<ToolEntry> = target
            .tools
            .into_iter()
            .filter(|t| !absorbed.contains(&t.name))
            .map(ToolEntry::Single)
            .collect();
        let group_count = groups.len();
        entries.extend(groups.into_iter().map(ToolEntry::Group));

        self.sorter.sort(&mut entries, self.sort_options);

        debug!(
            trigger = trigger.as_str(),
            sheets = merged_count,
            rows = entries.len(),
            groups = group_count,
            "merged ledger rebuilt"
        );

        let row_count = entries.len();
        self.merged = Some(MergedLedger {
            key: target.key,
            entries,
        });
        self.publish(trigger, row_count, group_count);
    }

    fn publish(&self, trigger: RebuildTrigger, tool_count: usize, group_count: usize) {
        self.events.publish(LedgerEvent {
            project_id: self.project_id.clone(),
            trigger,
            tool_count,
            group_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tool::ToolRecord;
    use crate::domain::types::{OperationCategory, ToolDurability};
    use std::error::Error;
    use std::sync::Mutex;

    fn sheet(name: &str, tools: &[(&str, f64, f64)]) -> SetupSheet {
        let mut sheet = SetupSheet::new(name, format!("{}.html", name));
        for (i, (tool_name, diameter, rough)) in tools.iter().enumerate() {
            let mut tool = ToolRecord::new((i + 1).to_string(), *tool_name, *diameter);
            tool.add_usage(OperationCategory::Rough, *rough);
            sheet.save_tool(tool);
        }
        sheet
    }

    fn engine() -> AggregationEngine {
        AggregationEngine::new(Some("P1".to_string())).unwrap()
    }

    fn rough_of(engine: &AggregationEngine, name: &str) -> f64 {
        engine.merged().unwrap().find(name).unwrap().usage().rough
    }

    fn catalog(name: &str, diameter: f64) -> CatalogTool {
        CatalogTool {
            name: name.to_string(),
            diameter,
            price: 100.0,
            durability: ToolDurability {
                rough: 60,
                ..Default::default()
            },
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<LedgerEvent>>);

    impl LedgerEventPublisher for Recorder {
        fn publish(&self, event: &LedgerEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[test]
    fn test_empty_engine_has_no_merged_ledger() {
        let engine = engine();
        assert!(engine.merged().is_none());
        assert_eq!(engine.scale(), 1.0);
    }

    #[test]
    fn test_sheet_scale_multiplies_contribution() {
        let mut engine = engine();
        engine.add_sheet(sheet("a", &[("T1", 10.0, 120.0)]));
        let b = engine.add_sheet(sheet("b", &[("T1", 10.0, 60.0)]));
        engine.set_sheet_scale(b, 2.0).unwrap();

        assert_eq!(rough_of(&engine, "T1"), 240.0);
    }

    #[test]
    fn test_project_scale_applies_on_top() {
        let mut engine = engine();
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0)]));
        engine.set_sheet_scale(a, 1.5).unwrap();
        engine.set_scale(2.0).unwrap();

        assert_eq!(rough_of(&engine, "T1"), 300.0);
    }

    #[test]
    fn test_invalid_scale_rejected_without_change() {
        let mut engine = engine();
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0)]));

        assert!(matches!(
            engine.set_scale(0.0),
            Err(EngineError::InvalidScale { .. })
        ));
        assert!(engine.set_sheet_scale(a, f64::NAN).is_err());
        assert_eq!(engine.scale(), 1.0);
        assert_eq!(engine.sheet(a).unwrap().scale, 1.0);
    }

    #[test]
    fn test_ignoring_every_sheet_clears_ledger() {
        let mut engine = engine();
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0)]));
        let b = engine.add_sheet(sheet("b", &[("T2", 10.0, 100.0)]));

        engine.ignore_sheet(a).unwrap();
        assert!(engine.merged().unwrap().find("T1").is_none());

        engine.ignore_sheet(b).unwrap();
        assert!(engine.merged().is_none());

        engine.unignore_sheet(a).unwrap();
        assert_eq!(rough_of(&engine, "T1"), 100.0);
    }

    #[test]
    fn test_ignore_all_except_and_restore() {
        let mut engine = engine();
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0)]));
        let b = engine.add_sheet(sheet("b", &[("T1", 10.0, 50.0)]));
        engine.ignore_sheet(b).unwrap();

        let previous = engine.ignore_all_except(b).unwrap();
        assert!(engine.sheet(a).unwrap().ignored);
        assert!(!engine.sheet(b).unwrap().ignored);
        assert_eq!(rough_of(&engine, "T1"), 50.0);

        engine.restore_ignored_flags(&previous);
        assert!(!engine.sheet(a).unwrap().ignored);
        assert!(engine.sheet(b).unwrap().ignored);
        assert_eq!(rough_of(&engine, "T1"), 100.0);
    }

    #[test]
    fn test_remove_and_restore_sheet() {
        let mut engine = engine();
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0)]));

        let index = engine.sheet_index(a).unwrap();
        let removed = engine.remove_sheet(a).unwrap();
        assert!(engine.merged().is_none());
        assert!(matches!(
            engine.remove_sheet(a),
            Err(EngineError::SheetNotFound(_))
        ));

        engine.restore_sheet(index, removed);
        assert_eq!(rough_of(&engine, "T1"), 100.0);
    }

    #[test]
    fn test_catalog_applied_on_rebuild() {
        let mut engine = engine();
        engine.add_sheet(sheet("a", &[("T1", 10.0, 1800.0)]));
        assert!(!engine.merged().unwrap().find("T1").unwrap().registered());

        engine.register_catalog_tool(catalog("T1", 10.0));
        let entry = engine.merged().unwrap().find("T1").unwrap();
        assert!(entry.registered());
        assert_eq!(entry.price(), Some(100.0));
        assert_eq!(entry.need(), Some(0.5));
        assert_eq!(entry.cost(), Some(50.0));
    }

    #[test]
    fn test_groups_appended_and_optionally_collapsed() {
        let mut engine = engine();
        engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0), ("T2", 10.0, 50.0), ("T3", 8.0, 1.0)]));
        engine.set_groups(vec![GroupDefinition {
            id: "g1".to_string(),
            project_id: "P1".to_string(),
            name: "family".to_string(),
            diameter: 10.0,
            price: 80.0,
            durability: ToolDurability::default(),
            tool_names: vec!["T1".to_string(), "T2".to_string()],
        }]);

        let merged = engine.merged().unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.group_count(), 1);
        assert_eq!(merged.find("family").unwrap().usage().rough, 150.0);

        engine.set_collapse_group_members(true);
        let merged = engine.merged().unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.find_single("T1").is_none());
        assert!(merged.find_single("T3").is_some());
    }

    #[test]
    fn test_sort_survives_rebuild() {
        let mut engine = engine();
        engine.add_sheet(sheet("a", &[("b", 10.0, 1.0), ("a", 10.0, 1.0)]));
        engine.sort_by(SortColumn::Name, SortOrder::Asc);
        engine.add_sheet(sheet("b", &[("c", 10.0, 1.0)]));
        engine.sort_by(SortColumn::Name, SortOrder::Desc);
        engine.set_scale(2.0).unwrap();

        let names: Vec<&str> = engine
            .merged()
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.name())
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_selection_resolves_against_merged() {
        let mut engine = engine();
        engine.add_sheet(sheet("a", &[("T1", 10.0, 1.0), ("T2", 12.0, 1.0)]));

        assert!(engine.select_tool("T1"));
        assert!(engine.select_tool("T2"));
        assert!(!engine.select_tool("missing"));
        assert_eq!(engine.selected_tools().len(), 2);
        assert!(matches!(
            engine.validate_selection("family"),
            Err(SelectionViolation::MixedDiameters { .. })
        ));

        assert!(engine.deselect_tool("T2"));
        engine.register_catalog_tool(catalog("T1", 10.0));
        assert_eq!(engine.validate_selection("family").unwrap(), vec!["T1".to_string()]);

        engine.clear_selection();
        assert_eq!(
            engine.validate_selection("family"),
            Err(SelectionViolation::EmptySelection)
        );
    }

    #[test]
    fn test_selection_ignores_group_sharing_a_tool_name() {
        let mut engine = engine();
        engine.add_sheet(sheet("a", &[("T1", 10.0, 100.0), ("T2", 12.0, 50.0)]));
        engine.register_catalog_tool(catalog("T1", 10.0));
        engine.set_groups(vec![GroupDefinition {
            id: "g1".to_string(),
            project_id: "P1".to_string(),
            name: "T1".to_string(),
            diameter: 12.0,
            price: 10.0,
            durability: ToolDurability::default(),
            tool_names: vec!["T1".to_string(), "T2".to_string()],
        }]);
        engine.sort_by(SortColumn::Price, SortOrder::Asc);

        // the cheaper group row sorts ahead of the single tool with the same name
        assert!(engine.merged().unwrap().find("T1").unwrap().is_group());

        assert!(engine.select_tool("T1"));
        let selected = engine.selected_tools();
        assert_eq!(selected.len(), 1);
        assert!(!selected[0].is_group());
        assert_eq!(selected[0].diameter(), 10.0);
        assert_eq!(engine.validate_selection("pair").unwrap(), vec!["T1".to_string()]);

        engine.clear_selection();
        engine.set_groups(vec![GroupDefinition {
            id: "g2".to_string(),
            project_id: "P1".to_string(),
            name: "family".to_string(),
            diameter: 10.0,
            price: 10.0,
            durability: ToolDurability::default(),
            tool_names: vec!["T1".to_string()],
        }]);
        assert!(!engine.select_tool("family"));
    }

    #[test]
    fn test_highlight_does_not_publish() {
        let recorder = Arc::new(Recorder::default());
        let mut engine = engine().with_event_publisher(recorder.clone());
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 1.0)]));
        engine.highlight(a).unwrap();
        assert!(engine.sheet(a).unwrap().highlighted);
        engine.unhighlight_all();
        assert!(!engine.sheet(a).unwrap().highlighted);

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].trigger, RebuildTrigger::SheetAdded);
        assert_eq!(events[0].tool_count, 1);
        assert_eq!(events[0].project_id.as_deref(), Some("P1"));
    }

    #[test]
    fn test_sources_resolve_to_contributing_sheets() {
        let mut engine = engine();
        let a = engine.add_sheet(sheet("a", &[("T1", 10.0, 1.0)]));
        let b = engine.add_sheet(sheet("b", &[("T1", 10.0, 1.0)]));

        let entry = engine.merged().unwrap().find("T1").unwrap().clone();
        let keys: Vec<SheetKey> = engine.sources_of(&entry).iter().map(|s| s.key).collect();
        assert_eq!(keys, vec![a, b]);
    }

    #[test]
    fn test_load_setup_sheet_rejects_garbage() {
        let mut engine = engine();
        let err = engine.load_setup_sheet("<html></html>", "empty.html").unwrap_err();
        assert!(matches!(err, EngineError::Import(_)));
        assert!(engine.sheets().is_empty());
    }
}
