// ==========================================
// Setup Sheet Analyzer - Persisted catalog records
// ==========================================
// Scope: projects, stored setup sheets, registered tools, tool groups
// Rule: plain data carriers, no behaviour beyond defaults
// ==========================================

use crate::domain::types::ToolDurability;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Project
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub scale: f64, // global usage multiplier
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Project row for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project: ProjectRecord,
    pub setup_sheet_count: usize,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scale: Option<f64>,
}

// ==========================================
// Stored setup sheet
// ==========================================
// The raw report is kept verbatim so the sheet can be re-parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSetupSheet {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub file_name: String,
    pub content: String,
    pub scale: f64,
    pub ignored: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSetupSheet {
    pub name: String,
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupSheetPatch {
    pub ignored: Option<bool>,
    pub scale: Option<f64>,
}

// ==========================================
// Registered tool
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTool {
    pub name: String,
    pub diameter: f64,
    pub price: f64,
    pub durability: ToolDurability,
}

/// Create-or-update payload for the tool catalog.
pub type ToolRegistration = CatalogTool;

// ==========================================
// Tool group definition
// ==========================================
// Membership is by tool name; attributes are explicit, not derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub diameter: f64,
    pub price: f64,
    pub durability: ToolDurability,
    pub tool_names: Vec<String>,
}

impl GroupDefinition {
    pub fn contains(&self, tool_name: &str) -> bool {
        self.tool_names.iter().any(|n| n == tool_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
    pub project_id: String,
    pub name: String,
    pub tool_names: Vec<String>,
}
