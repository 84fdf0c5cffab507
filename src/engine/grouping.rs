// ==========================================
// Setup Sheet Analyzer - Tool grouping
// ==========================================
// Scope: fold merged tools into catalog groups; validate ad-hoc
//        group creation from the current selection
// ==========================================

use crate::domain::catalog::GroupDefinition;
use crate::domain::tool::{ToolEntry, ToolGroup, ToolMetrics, ToolRecord};
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build one group per definition from the merged tools.
///
/// A tool joins every group listing its name. Groups that matched no
/// merged tool are dropped.
pub fn fold_groups(tools: &[ToolRecord], definitions: &[GroupDefinition]) -> Vec<ToolGroup> {
    let mut groups = Vec::new();
    for definition in definitions {
        let mut group = ToolGroup::from_definition(definition);
        for tool in tools.iter().filter(|t| definition.contains(&t.name)) {
            group.add_tool(tool.clone());
        }
        if !group.tools.is_empty() {
            groups.push(group);
        }
    }
    groups
}

// ==========================================
// Group creation validation
// ==========================================

/// Reason a selection cannot become a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionViolation {
    EmptySelection,
    EmptyName,
    MixedDiameters { diameters: Vec<f64> },
    UnregisteredTools { names: Vec<String> },
}

impl SelectionViolation {
    /// Localized, user-facing message.
    pub fn message(&self) -> String {
        match self {
            SelectionViolation::EmptySelection => t("group.empty_selection"),
            SelectionViolation::EmptyName => t("group.empty_name"),
            SelectionViolation::MixedDiameters { .. } => t("group.mixed_diameter"),
            SelectionViolation::UnregisteredTools { names } => {
                t_with_args("group.unregistered_tools", &[("names", &names.join(", "))])
            }
        }
    }
}

impl fmt::Display for SelectionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Check that `selected` may be grouped under `name`.
///
/// Checks run in order: non-empty selection, non-empty name, one shared
/// diameter, every tool registered.
///
/// # Returns
/// Member tool names in selection order
pub fn validate_group_selection(
    selected: &[&ToolEntry],
    name: &str,
) -> Result<Vec<String>, SelectionViolation> {
    let first = selected.first().ok_or(SelectionViolation::EmptySelection)?;
    if name.trim().is_empty() {
        return Err(SelectionViolation::EmptyName);
    }

    let reference = first.diameter();
    if selected.iter().any(|e| e.diameter() != reference) {
        let mut diameters: Vec<f64> = Vec::new();
        for entry in selected {
            if !diameters.contains(&entry.diameter()) {
                diameters.push(entry.diameter());
            }
        }
        return Err(SelectionViolation::MixedDiameters { diameters });
    }

    let unregistered: Vec<String> = selected
        .iter()
        .filter(|e| !e.registered())
        .map(|e| e.name().to_string())
        .collect();
    if !unregistered.is_empty() {
        return Err(SelectionViolation::UnregisteredTools {
            names: unregistered,
        });
    }

    Ok(selected.iter().map(|e| e.name().to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{OperationCategory, ToolDurability};

    fn tool(name: &str, diameter: f64, rough: f64) -> ToolRecord {
        let mut tool = ToolRecord::new("1", name, diameter);
        tool.add_usage(OperationCategory::Rough, rough);
        tool
    }

    fn definition(id: &str, members: &[&str]) -> GroupDefinition {
        GroupDefinition {
            id: id.to_string(),
            project_id: "P1".to_string(),
            name: format!("group-{}", id),
            diameter: 10.0,
            price: 90.0,
            durability: ToolDurability {
                rough: 30,
                ..Default::default()
            },
            tool_names: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn registered(name: &str, diameter: f64) -> ToolEntry {
        let mut t = tool(name, diameter, 0.0);
        t.registered = true;
        ToolEntry::Single(t)
    }

    #[test]
    fn test_fold_groups_accumulates_members() {
        let tools = vec![tool("A", 10.0, 100.0), tool("B", 10.0, 50.0), tool("C", 8.0, 7.0)];
        let groups = fold_groups(&tools, &[definition("g1", &["A", "B", "missing"])]);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.name(), "group-g1");
        assert_eq!(group.price(), Some(90.0));
        assert_eq!(group.durability().rough, 30);
        assert_eq!(group.usage().rough, 150.0);
        assert_eq!(group.member_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_fold_groups_drops_unmatched_definitions() {
        let tools = vec![tool("A", 10.0, 100.0)];
        let groups = fold_groups(&tools, &[definition("g1", &["Z"])]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_validate_accepts_registered_same_diameter() {
        let a = registered("A", 10.0);
        let b = registered("B", 10.0);
        let names = validate_group_selection(&[&a, &b], "family").unwrap();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_validate_rejects_mixed_diameters_before_registration() {
        let a = registered("A", 10.0);
        let b = ToolEntry::Single(tool("B", 12.0, 0.0));
        let err = validate_group_selection(&[&a, &b], "family").unwrap_err();
        assert_eq!(
            err,
            SelectionViolation::MixedDiameters {
                diameters: vec![10.0, 12.0]
            }
        );
    }

    #[test]
    fn test_validate_rejects_unregistered() {
        let a = registered("A", 10.0);
        let b = ToolEntry::Single(tool("B", 10.0, 0.0));
        let err = validate_group_selection(&[&a, &b], "family").unwrap_err();
        assert_eq!(
            err,
            SelectionViolation::UnregisteredTools {
                names: vec!["B".to_string()]
            }
        );
    }

    #[test]
    fn test_validate_rejects_empty_selection_and_name() {
        assert_eq!(
            validate_group_selection(&[], "family").unwrap_err(),
            SelectionViolation::EmptySelection
        );
        let a = registered("A", 10.0);
        assert_eq!(
            validate_group_selection(&[&a], "  ").unwrap_err(),
            SelectionViolation::EmptyName
        );
    }
}
