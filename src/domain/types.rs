// ==========================================
// Setup Sheet Analyzer - Domain types
// ==========================================
// Scope: operation taxonomy and per-category value maps
// Rule: the category set is closed, never extended at runtime
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

// ==========================================
// Operation category
// ==========================================
// Serialized as SCREAMING_SNAKE_CASE (matches the stored catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationCategory {
    Rough,
    Drilling,
    FaceMilling,
    SemiFinish,
    Finish,
}

impl OperationCategory {
    /// Declaration order of the enumeration.
    pub const ALL: [OperationCategory; 5] = [
        OperationCategory::Rough,
        OperationCategory::Drilling,
        OperationCategory::FaceMilling,
        OperationCategory::SemiFinish,
        OperationCategory::Finish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationCategory::Rough => "ROUGH",
            OperationCategory::Drilling => "DRILLING",
            OperationCategory::FaceMilling => "FACE_MILLING",
            OperationCategory::SemiFinish => "SEMI_FINISH",
            OperationCategory::Finish => "FINISH",
        }
    }
}

impl fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "ROUGH" => Ok(OperationCategory::Rough),
            "DRILLING" => Ok(OperationCategory::Drilling),
            "FACE_MILLING" => Ok(OperationCategory::FaceMilling),
            "SEMI_FINISH" => Ok(OperationCategory::SemiFinish),
            "FINISH" => Ok(OperationCategory::Finish),
            other => Err(format!("unknown operation category: {}", other)),
        }
    }
}

// ==========================================
// CategoryMap - one value per category
// ==========================================
// Always fully populated: a struct, not a map, so a partial
// usage/durability record cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMap<T> {
    pub rough: T,
    pub drilling: T,
    pub face_milling: T,
    pub semi_finish: T,
    pub finish: T,
}

impl<T> CategoryMap<T> {
    /// Iterate `(category, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (OperationCategory, &T)> {
        OperationCategory::ALL.into_iter().map(move |c| (c, &self[c]))
    }
}

impl<T> Index<OperationCategory> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: OperationCategory) -> &T {
        match category {
            OperationCategory::Rough => &self.rough,
            OperationCategory::Drilling => &self.drilling,
            OperationCategory::FaceMilling => &self.face_milling,
            OperationCategory::SemiFinish => &self.semi_finish,
            OperationCategory::Finish => &self.finish,
        }
    }
}

impl<T> IndexMut<OperationCategory> for CategoryMap<T> {
    fn index_mut(&mut self, category: OperationCategory) -> &mut T {
        match category {
            OperationCategory::Rough => &mut self.rough,
            OperationCategory::Drilling => &mut self.drilling,
            OperationCategory::FaceMilling => &mut self.face_milling,
            OperationCategory::SemiFinish => &mut self.semi_finish,
            OperationCategory::Finish => &mut self.finish,
        }
    }
}

/// Accumulated usage, seconds per category.
///
/// Parsed durations are whole seconds; scaled merges may produce fractions.
pub type ToolUsage = CategoryMap<f64>;

/// Tool-life limit, minutes per category. `0` means "no data".
pub type ToolDurability = CategoryMap<u32>;

impl CategoryMap<f64> {
    /// Sum over all categories.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }

    /// Add `other * multiplier` into every category.
    pub fn add_scaled(&mut self, other: &ToolUsage, multiplier: f64) {
        for category in OperationCategory::ALL {
            self[category] += other[category] * multiplier;
        }
    }

    pub fn scaled(&self, multiplier: f64) -> ToolUsage {
        let mut out = ToolUsage::default();
        out.add_scaled(self, multiplier);
        out
    }
}

// ==========================================
// Ledger sort options
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    None,
    Name,
    Diameter,
    Price,
    Need,
    RelationalDurability,
    Cost,
    Usage(OperationCategory),
    UsageTotal,
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortColumn::None => write!(f, "none"),
            SortColumn::Name => write!(f, "name"),
            SortColumn::Diameter => write!(f, "diameter"),
            SortColumn::Price => write!(f, "price"),
            SortColumn::Need => write!(f, "need"),
            SortColumn::RelationalDurability => write!(f, "relational_durability"),
            SortColumn::Cost => write!(f, "cost"),
            SortColumn::Usage(category) => {
                write!(f, "usage.{}", category.as_str().to_lowercase())
            }
            SortColumn::UsageTotal => write!(f, "usage.total"),
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "none" | "" => Ok(SortColumn::None),
            "name" => Ok(SortColumn::Name),
            "diameter" => Ok(SortColumn::Diameter),
            "price" => Ok(SortColumn::Price),
            "need" => Ok(SortColumn::Need),
            "relational_durability" | "relationaldurability" => {
                Ok(SortColumn::RelationalDurability)
            }
            "cost" => Ok(SortColumn::Cost),
            "usage.total" => Ok(SortColumn::UsageTotal),
            _ => match key.strip_prefix("usage.") {
                Some(category) => category.parse().map(SortColumn::Usage),
                None => Err(format!("unknown sort column: {}", s)),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            column: SortColumn::None,
            order: SortOrder::Asc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_map_index_round_trip() {
        let mut usage = ToolUsage::default();
        usage[OperationCategory::SemiFinish] += 30.0;
        usage[OperationCategory::SemiFinish] += 12.0;

        assert_eq!(usage.semi_finish, 42.0);
        assert_eq!(usage.total(), 42.0);
        assert_eq!(usage.iter().count(), 5);
    }

    #[test]
    fn test_add_scaled() {
        let mut target = ToolUsage {
            rough: 120.0,
            ..Default::default()
        };
        let other = ToolUsage {
            rough: 60.0,
            finish: 10.0,
            ..Default::default()
        };
        target.add_scaled(&other, 2.0);

        assert_eq!(target.rough, 240.0);
        assert_eq!(target.finish, 20.0);
    }

    #[test]
    fn test_sort_column_parse() {
        assert_eq!("name".parse::<SortColumn>().unwrap(), SortColumn::Name);
        assert_eq!(
            "usage.face_milling".parse::<SortColumn>().unwrap(),
            SortColumn::Usage(OperationCategory::FaceMilling)
        );
        assert_eq!(
            "usage.semi-finish".parse::<SortColumn>().unwrap(),
            SortColumn::Usage(OperationCategory::SemiFinish)
        );
        assert_eq!("usage.total".parse::<SortColumn>().unwrap(), SortColumn::UsageTotal);
        assert!("weight".parse::<SortColumn>().is_err());
    }

    #[test]
    fn test_sort_column_display_parses_back() {
        let column = SortColumn::Usage(OperationCategory::Drilling);
        assert_eq!(column.to_string(), "usage.drilling");
        assert_eq!(column.to_string().parse::<SortColumn>().unwrap(), column);
    }
}
