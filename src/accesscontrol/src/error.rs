//! Error types for the access control engine

use thiserror::Error;

use crate::scope::{ScopeError, TemplateError};

/// Access control engine errors
///
/// A negative authorization is never an error: `evaluate` reports it as
/// `Ok(false)`. Every variant here is an internal failure and callers must
/// answer with an internal-error response without echoing the message.
#[derive(Debug, Error)]
pub enum AccessControlError {
    /// Scope template failed to parse or render
    #[error("Scope template error: {0}")]
    Template(#[from] TemplateError),

    /// Role or grant data could not be reached
    #[error("Registry lookup failed: {0}")]
    RegistryLookup(String),

    /// Role catalog rejected at load time
    #[error("Invalid role catalog: {0}")]
    InvalidCatalog(String),

    /// Granted scope pattern is malformed
    #[error("Invalid scope: {0}")]
    Scope(#[from] ScopeError),

    /// Catalog (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AccessControlError {
    /// Whether the failure came from scope template handling
    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template(_))
    }
}

/// Result type for access control operations
pub type Result<T> = std::result::Result<T, AccessControlError>;
