// ==========================================
// Setup Sheet Analyzer - API DTOs
// ==========================================
// Scope: serializable views of the engine state for UIs and the CLI
// ==========================================

use crate::domain::setup_sheet::SetupSheet;
use crate::domain::tool::{ToolEntry, ToolMetrics};
use crate::domain::types::{SortOptions, ToolDurability, ToolUsage};
use crate::engine::AggregationEngine;
use serde::{Deserialize, Serialize};

/// One merged ledger row with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub name: String,
    pub diameter: f64,
    pub price: Option<f64>,
    pub durability: ToolDurability,
    pub need: Option<f64>,
    pub relational_durability: Option<f64>,
    pub cost: Option<f64>,
    pub usage: ToolUsage, // seconds per category
    pub total_usage: f64,
    pub registered: bool,
    pub is_group: bool,
    pub members: Vec<String>,
    pub sources: Vec<String>, // contributing sheet names
    pub selected: bool,
}

/// One loaded setup sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub key: String,
    pub id: Option<String>,
    pub name: String,
    pub file_name: String,
    pub scale: f64,
    pub ignored: bool,
    pub highlighted: bool,
    pub tool_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub project_id: Option<String>,
    pub scale: f64,
    pub sort: SortOptions,
    pub sheets: Vec<SheetRow>,
    /// Empty while no sheet is unignored
    pub rows: Vec<LedgerRow>,
}

impl LedgerSnapshot {
    pub fn from_engine(engine: &AggregationEngine) -> Self {
        let selected = engine.selected_names();
        let rows = match engine.merged() {
            Some(merged) => merged
                .entries()
                .iter()
                .map(|entry| {
                    let sources = engine
                        .sources_of(entry)
                        .iter()
                        .map(|s| s.name.clone())
                        .collect();
                    let mut row = LedgerRow::from_entry(entry, sources);
                    row.selected =
                        !entry.is_group() && selected.iter().any(|n| n == entry.name());
                    row
                })
                .collect(),
            None => Vec::new(),
        };

        Self {
            project_id: engine.project_id().map(str::to_string),
            scale: engine.scale(),
            sort: engine.sort_options(),
            sheets: engine.sheets().iter().map(SheetRow::from_sheet).collect(),
            rows,
        }
    }
}

impl LedgerRow {
    pub fn from_entry(entry: &ToolEntry, sources: Vec<String>) -> Self {
        let members = match entry.as_group() {
            Some(group) => group.member_names().into_iter().map(str::to_string).collect(),
            None => Vec::new(),
        };
        Self {
            name: entry.name().to_string(),
            diameter: entry.diameter(),
            price: entry.price(),
            durability: *entry.durability(),
            need: entry.need(),
            relational_durability: entry.relational_durability(),
            cost: entry.cost(),
            usage: *entry.usage(),
            total_usage: entry.total_usage(),
            registered: entry.registered(),
            is_group: entry.is_group(),
            members,
            sources,
            selected: false,
        }
    }
}

impl SheetRow {
    pub fn from_sheet(sheet: &SetupSheet) -> Self {
        Self {
            key: sheet.key.to_string(),
            id: sheet.id.clone(),
            name: sheet.name.clone(),
            file_name: sheet.file_name.clone(),
            scale: sheet.scale,
            ignored: sheet.ignored,
            highlighted: sheet.highlighted,
            tool_count: sheet.tools.len(),
        }
    }
}

/// Outcome of grouping the selected tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupCreation {
    /// Validation failed; nothing was stored
    Rejected { message: String },
    Created { group_id: String },
}
