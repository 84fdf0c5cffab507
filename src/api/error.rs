// ==========================================
// Setup Sheet Analyzer - API error types
// ==========================================
// Scope: map layer errors to caller-facing errors
// ==========================================

use crate::engine::error::EngineError;
use crate::export::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Input errors
    // ==========================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ==========================================
    // Parse and engine errors
    // ==========================================
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Engine error: {0}")]
    Engine(String),

    // ==========================================
    // Data access errors
    // ==========================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Persisting an optimistic change failed and the change was reverted
    #[error("Persistence failed, change rolled back: {0}")]
    PersistenceRolledBack(String),

    // ==========================================
    // Generic
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Import(e) => ApiError::Import(e),
            EngineError::SheetNotFound(key) => ApiError::NotFound(format!("setup sheet {}", key)),
            EngineError::InvalidScale { .. } => ApiError::Engine(err.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("foreign key constraint violated: {}", msg))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("unique constraint violated: {}", msg))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("failed to acquire database lock: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Other(anyhow::Error::new(err))
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;
