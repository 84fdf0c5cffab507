// ==========================================
// Setup Sheet Analyzer - Ledger sorter
// ==========================================
// Scope: order merged ledger rows by one column
// Rules:
//   - stable: ties keep their pre-sort order
//   - missing numeric values compare as -1
//   - desc is the negated asc comparison
// ==========================================

use crate::domain::tool::{ToolEntry, ToolMetrics};
use crate::domain::types::{SortColumn, SortOptions, SortOrder};
use std::cmp::Ordering;

const MISSING: f64 = -1.0;

// ==========================================
// LedgerSorter
// ==========================================
pub struct LedgerSorter {
    // stateless
}

impl LedgerSorter {
    pub fn new() -> Self {
        Self {}
    }

    /// Sort `entries` in place. `SortColumn::None` leaves them untouched.
    pub fn sort(&self, entries: &mut [ToolEntry], options: SortOptions) {
        if options.column == SortColumn::None {
            return;
        }
        entries.sort_by(|a, b| self.compare(a, b, options));
    }

    /// Compare two rows under `options`.
    pub fn compare(&self, a: &ToolEntry, b: &ToolEntry, options: SortOptions) -> Ordering {
        let ordering = self.compare_column(a, b, options.column);
        match options.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    fn compare_column(&self, a: &ToolEntry, b: &ToolEntry, column: SortColumn) -> Ordering {
        match column {
            SortColumn::None => Ordering::Equal,
            SortColumn::Name => compare_names(a.name(), b.name()),
            SortColumn::Diameter => compare_numbers(a.diameter(), b.diameter()),
            SortColumn::Price => compare_optional(a.price(), b.price()),
            SortColumn::Need => compare_optional(a.need(), b.need()),
            SortColumn::RelationalDurability => {
                compare_optional(a.relational_durability(), b.relational_durability())
            }
            SortColumn::Cost => compare_optional(a.cost(), b.cost()),
            SortColumn::Usage(category) => {
                compare_numbers(a.usage()[category], b.usage()[category])
            }
            SortColumn::UsageTotal => compare_numbers(a.total_usage(), b.total_usage()),
        }
    }
}

impl Default for LedgerSorter {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

fn compare_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    compare_numbers(a.unwrap_or(MISSING), b.unwrap_or(MISSING))
}

/// Case-insensitive first, then exact, so "a" < "B" < "b".
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
