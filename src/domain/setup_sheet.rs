// ==========================================
// Setup Sheet Analyzer - Setup sheet model
// ==========================================
// Scope: tool usage of one report plus its mutable metadata
// Rule: tools are unique by name within a sheet
// ==========================================

use crate::domain::tool::{SheetKey, ToolRecord};
use serde::{Deserialize, Serialize};

/// Name given to the aggregate sheet built by the engine.
pub const MERGED_SHEET_NAME: &str = "MERGED";

/// File name of sheets that were not read from a file.
pub const NO_FILE_NAME: &str = "NONE";

// ==========================================
// SetupSheet
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSheet {
    pub key: SheetKey,
    pub id: Option<String>, // attached after a successful persistence round trip
    pub name: String,
    pub file_name: String,
    pub tools: Vec<ToolRecord>,
    pub scale: f64,
    pub ignored: bool,
    pub highlighted: bool, // transient, never persisted
}

impl SetupSheet {
    pub fn new(name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            key: SheetKey::new(),
            id: None,
            name: name.into(),
            file_name: file_name.into(),
            tools: Vec::new(),
            scale: 1.0,
            ignored: false,
            highlighted: false,
        }
    }

    /// Empty aggregate target.
    pub fn merged() -> Self {
        Self::new(MERGED_SHEET_NAME, NO_FILE_NAME)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Register a tool declared by this sheet.
    ///
    /// # Returns
    /// Index of the tool in `tools`; a tool whose name is already present
    /// resolves to the existing entry.
    pub fn save_tool(&mut self, mut tool: ToolRecord) -> usize {
        if let Some(index) = self.tools.iter().position(|t| t.name == tool.name) {
            return index;
        }
        if !tool.sources.contains(&self.key) {
            tool.sources.push(self.key);
        }
        self.tools.push(tool);
        self.tools.len() - 1
    }

    pub fn tool_by_id(&self, id: &str) -> Option<&ToolRecord> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn tool_by_name(&self, name: &str) -> Option<&ToolRecord> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn tool_by_name_mut(&mut self, name: &str) -> Option<&mut ToolRecord> {
        self.tools.iter_mut().find(|t| t.name == name)
    }

    /// Fold `other`'s usage into this sheet, by tool name.
    ///
    /// Existing tools accumulate `usage * usage_multiplier` and gain `other`
    /// as a source; unknown tools are cloned in with scaled usage.
    ///
    /// Not idempotent: merging the same sheet twice counts it twice.
    pub fn merge(&mut self, other: &SetupSheet, usage_multiplier: f64) {
        for other_tool in &other.tools {
            match self.tool_by_name_mut(&other_tool.name) {
                Some(existing) => {
                    existing.usage.add_scaled(&other_tool.usage, usage_multiplier);
                    existing.sources.push(other.key);
                }
                None => {
                    let cloned = other_tool.clone_scaled(usage_multiplier);
                    self.tools.push(cloned);
                }
            }
        }
    }

    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn unignore(&mut self) {
        self.ignored = false;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn highlight(&mut self) {
        self.highlighted = true;
    }

    pub fn unhighlight(&mut self) {
        self.highlighted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OperationCategory;

    fn sheet_with(name: &str, tools: &[(&str, f64)]) -> SetupSheet {
        let mut sheet = SetupSheet::new(name, format!("{}.html", name));
        for (i, (tool_name, rough)) in tools.iter().enumerate() {
            let mut tool = ToolRecord::new((i + 1).to_string(), *tool_name, 10.0);
            tool.add_usage(OperationCategory::Rough, *rough);
            sheet.save_tool(tool);
        }
        sheet
    }

    #[test]
    fn test_save_tool_records_source_and_dedups_by_name() {
        let mut sheet = SetupSheet::new("job", "job.html");
        let first = sheet.save_tool(ToolRecord::new("1", "EM10", 10.0));
        let again = sheet.save_tool(ToolRecord::new("7", "EM10", 10.0));

        assert_eq!(first, again);
        assert_eq!(sheet.tools.len(), 1);
        assert_eq!(sheet.tools[0].sources, vec![sheet.key]);
    }

    #[test]
    fn test_merge_scales_contributed_usage() {
        let mut target = sheet_with("a", &[("T1", 100.0)]);
        let other = sheet_with("b", &[("T1", 50.0), ("T2", 10.0)]);

        target.merge(&other, 2.0);

        assert_eq!(target.tool_by_name("T1").unwrap().usage.rough, 200.0);
        assert_eq!(target.tool_by_name("T2").unwrap().usage.rough, 20.0);
        assert_eq!(
            target.tool_by_name("T1").unwrap().sources,
            vec![target.key, other.key]
        );
        assert_eq!(target.tool_by_name("T2").unwrap().sources, vec![other.key]);
    }

    #[test]
    fn test_merge_twice_double_counts() {
        let mut target = SetupSheet::merged();
        let other = sheet_with("b", &[("T1", 60.0)]);

        target.merge(&other, 1.0);
        target.merge(&other, 1.0);

        assert_eq!(target.tool_by_name("T1").unwrap().usage.rough, 120.0);
    }

    #[test]
    fn test_merged_clone_does_not_share_usage() {
        let mut target = SetupSheet::merged();
        let other = sheet_with("b", &[("T1", 60.0)]);

        target.merge(&other, 1.0);
        target
            .tool_by_name_mut("T1")
            .unwrap()
            .add_usage(OperationCategory::Rough, 1.0);

        assert_eq!(other.tool_by_name("T1").unwrap().usage.rough, 60.0);
    }

    #[test]
    fn test_flags() {
        let mut sheet = SetupSheet::new("job", "job.html");
        sheet.ignore();
        sheet.highlight();
        sheet.set_scale(3.0);
        assert!(sheet.ignored && sheet.highlighted);
        assert_eq!(sheet.scale, 3.0);

        sheet.unignore();
        sheet.unhighlight();
        assert!(!sheet.ignored && !sheet.highlighted);
    }
}
