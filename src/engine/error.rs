// ==========================================
// Setup Sheet Analyzer - Engine error types
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// Aggregation engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid scale: {value} (must be a finite number greater than 0)")]
    InvalidScale { value: f64 },

    #[error("Setup sheet not found: {0}")]
    SheetNotFound(String),

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Result alias
pub type EngineResult<T> = Result<T, EngineError>;

/// Scales multiply usage; zero, negative and non-finite values are rejected.
pub fn validate_scale(value: f64) -> EngineResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidScale { value })
    }
}
