// ==========================================
// Setup Sheet Analyzer - Import layer
// ==========================================
// Scope: CAM setup-sheet reports -> SetupSheet
// Supported: one fixed HTML report layout
// ==========================================

pub mod classifier;
pub mod duration;
pub mod error;
pub mod selectors;
pub mod setup_sheet_parser;

// Re-export core types
pub use classifier::{OperationClassifier, CLASSIFICATION_ORDER};
pub use duration::{format_hhmmss, parse_hhmmss};
pub use error::{ImportError, ImportResult};
pub use selectors::ReportSelectors;
pub use setup_sheet_parser::SetupSheetParser;
