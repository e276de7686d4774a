//! Error types for designer operations.

use thiserror::Error;

/// Result type for designer operations.
pub type DesignResult<T> = Result<T, DesignError>;

/// Errors that can occur in designer operations.
#[derive(Debug, Error)]
pub enum DesignError {
    /// Element not found on the current page.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Page index out of range.
    #[error("Page not found: index {0}")]
    PageNotFound(usize),

    /// Guide not found in the session.
    #[error("Guide not found: {0}")]
    GuideNotFound(String),

    /// Operation not valid for the element or session state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Element is locked by template edit mode.
    #[error("Element is locked in template edit mode: {0}")]
    ElementLocked(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
