// ==========================================
// Setup Sheet Analyzer - Engine layer
// ==========================================
// Scope: merge setup sheets into one tool ledger, group, sort
// Rule: the engine never touches storage
// ==========================================

pub mod aggregation;
pub mod error;
pub mod events;
pub mod grouping;
pub mod sorter;

// Re-export core engine types
pub use aggregation::{AggregationEngine, MergedLedger};
pub use error::{validate_scale, EngineError, EngineResult};
pub use events::{
    LedgerEvent, LedgerEventPublisher, NoOpEventPublisher, OptionalEventPublisher, RebuildTrigger,
};
pub use grouping::{fold_groups, validate_group_selection, SelectionViolation};
pub use sorter::LedgerSorter;
