// ==========================================
// Setup Sheet Analyzer - Importer error types
// ==========================================
// Tooling: thiserror derive
// Rule: every variant is fatal to the whole report
// ==========================================

use thiserror::Error;

/// Setup-sheet import errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    // ===== Report structure =====
    #[error("File is corrupted ({file_name}): {description}")]
    CorruptedFile {
        description: String,
        file_name: String,
    },

    // ===== Classification =====
    #[error("Unknown operation ({file_name}): {raw_code}")]
    UnknownOperation { raw_code: String, file_name: String },

    // ===== Configuration =====
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

impl ImportError {
    pub fn corrupted(description: impl Into<String>, file_name: impl Into<String>) -> Self {
        ImportError::CorruptedFile {
            description: description.into(),
            file_name: file_name.into(),
        }
    }

    /// File the error was raised for, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ImportError::CorruptedFile { file_name, .. } => Some(file_name),
            ImportError::UnknownOperation { file_name, .. } => Some(file_name),
            ImportError::InvalidSelector(_) => None,
        }
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
