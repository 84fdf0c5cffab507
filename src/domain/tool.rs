// ==========================================
// Setup Sheet Analyzer - Tool ledger model
// ==========================================
// Scope: single tools, interchangeable tool groups, derived wear metrics
// Rule: derived metrics are computed on read, never stored
// ==========================================

use crate::domain::catalog::{CatalogTool, GroupDefinition};
use crate::domain::types::{OperationCategory, ToolDurability, ToolUsage};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Decimal places kept for `need` and relational durability.
pub const METRIC_DECIMALS: i32 = 4;

pub(crate) fn round_metric(value: f64) -> f64 {
    let factor = 10f64.powi(METRIC_DECIMALS);
    (value * factor).round() / factor
}

// ==========================================
// SheetKey - non-owning sheet back-reference
// ==========================================
// Local identity of a setup sheet, assigned at parse time.
// The persisted id arrives later (or never, for unsaved sheets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetKey(Uuid);

impl SheetKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SheetKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// ToolRecord - one physical tool type
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub id: String,       // source-local tool id (unique within one report only)
    pub name: String,     // merge key
    pub diameter: f64,    // mm
    pub price: Option<f64>,
    pub durability: ToolDurability,
    pub usage: ToolUsage,
    pub sources: Vec<SheetKey>,
    pub registered: bool, // price/durability confirmed against the catalog
}

impl ToolRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, diameter: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            diameter,
            price: None,
            durability: ToolDurability::default(),
            usage: ToolUsage::default(),
            sources: Vec::new(),
            registered: false,
        }
    }

    pub fn add_usage(&mut self, category: OperationCategory, seconds: f64) {
        self.usage[category] += seconds;
    }

    /// Independent copy with usage multiplied by `usage_multiplier`.
    ///
    /// Identity and sources are copied; catalog data (price, durability,
    /// registration) is not, it is re-applied by the aggregation engine.
    pub fn clone_scaled(&self, usage_multiplier: f64) -> ToolRecord {
        let mut cloned = ToolRecord::new(self.id.clone(), self.name.clone(), self.diameter);
        cloned.usage = self.usage.scaled(usage_multiplier);
        cloned.sources = self.sources.clone();
        cloned
    }

    /// Copy price/durability from the persisted catalog and mark registered.
    pub fn apply_catalog(&mut self, catalog: &CatalogTool) {
        self.price = Some(catalog.price);
        self.durability = catalog.durability;
        self.registered = true;
    }
}

// ==========================================
// ToolGroup - interchangeable tool names
// ==========================================
// Shares one price/durability profile; usage is a snapshot fold of
// the members at the time they were added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolGroup {
    pub record: ToolRecord,
    pub tools: Vec<ToolRecord>,
}

impl ToolGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, diameter: f64) -> Self {
        Self {
            record: ToolRecord::new(id, name, diameter),
            tools: Vec::new(),
        }
    }

    /// Empty group carrying the definition's explicit attributes.
    pub fn from_definition(definition: &GroupDefinition) -> Self {
        let mut group = ToolGroup::new(
            definition.id.clone(),
            definition.name.clone(),
            definition.diameter,
        );
        group.record.price = Some(definition.price);
        group.record.durability = definition.durability;
        group
    }

    /// Fold `tool`'s current usage into the group and keep it as a member.
    pub fn add_tool(&mut self, tool: ToolRecord) {
        self.record.usage.add_scaled(&tool.usage, 1.0);
        for source in &tool.sources {
            if !self.record.sources.contains(source) {
                self.record.sources.push(*source);
            }
        }
        self.tools.push(tool);
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

// ==========================================
// ToolMetrics - shared read-only capability
// ==========================================
pub trait ToolMetrics {
    fn record(&self) -> &ToolRecord;

    /// Estimated fraction of tool life consumed, rounded to 4 decimals.
    ///
    /// # Returns
    /// - `None`: some category has usage but no durability data
    fn need(&self) -> Option<f64>;

    fn name(&self) -> &str {
        &self.record().name
    }

    fn diameter(&self) -> f64 {
        self.record().diameter
    }

    fn price(&self) -> Option<f64> {
        self.record().price
    }

    fn durability(&self) -> &ToolDurability {
        &self.record().durability
    }

    fn usage(&self) -> &ToolUsage {
        &self.record().usage
    }

    fn total_usage(&self) -> f64 {
        self.usage().total()
    }

    /// `1 / need`, undefined when need is undefined or zero.
    fn relational_durability(&self) -> Option<f64> {
        match self.need() {
            Some(need) if need != 0.0 => Some(round_metric(1.0 / need)),
            _ => None,
        }
    }

    /// `need * price`; an unset price counts as zero.
    fn cost(&self) -> Option<f64> {
        self.need().map(|need| need * self.price().unwrap_or(0.0))
    }
}

impl ToolMetrics for ToolRecord {
    fn record(&self) -> &ToolRecord {
        self
    }

    fn need(&self) -> Option<f64> {
        let mut need = 0.0;
        for (category, seconds) in self.usage.iter() {
            if *seconds == 0.0 {
                continue;
            }
            let minutes = self.durability[category];
            if minutes == 0 {
                return None;
            }
            need += seconds / (f64::from(minutes) * 60.0);
        }
        Some(round_metric(need))
    }
}

impl ToolMetrics for ToolGroup {
    fn record(&self) -> &ToolRecord {
        &self.record
    }

    /// Sum of member needs; undefined if any member's need is undefined.
    fn need(&self) -> Option<f64> {
        let mut need = 0.0;
        for tool in &self.tools {
            need += tool.need()?;
        }
        Some(round_metric(need))
    }
}

// ==========================================
// ToolEntry - one row of the merged ledger
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolEntry {
    Single(ToolRecord),
    Group(ToolGroup),
}

impl ToolEntry {
    pub fn is_group(&self) -> bool {
        matches!(self, ToolEntry::Group(_))
    }

    pub fn as_group(&self) -> Option<&ToolGroup> {
        match self {
            ToolEntry::Group(group) => Some(group),
            ToolEntry::Single(_) => None,
        }
    }

    pub fn registered(&self) -> bool {
        self.record().registered
    }
}

impl ToolMetrics for ToolEntry {
    fn record(&self) -> &ToolRecord {
        match self {
            ToolEntry::Single(tool) => tool,
            ToolEntry::Group(group) => &group.record,
        }
    }

    fn need(&self) -> Option<f64> {
        match self {
            ToolEntry::Single(tool) => tool.need(),
            ToolEntry::Group(group) => group.need(),
        }
    }
}
