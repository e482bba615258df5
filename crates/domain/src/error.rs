//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The pool has no slots at the requested level
    #[error("No level {level} slot in the {pool} pool")]
    SlotUnavailable { pool: String, level: u8 },

    /// Every slot at the requested level has been expended
    #[error("Level {level} slots exhausted: {used}/{max} used")]
    SlotsExhausted { level: u8, used: u8, max: u8 },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when domain invariants or constraints are violated:
    /// - Required fields are empty or missing
    /// - Values are outside allowed ranges
    ///
    /// # Example
    /// ```ignore
    /// if class.is_empty() {
    ///     return Err(DomainError::validation("Class name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a slot unavailable error
    pub fn slot_unavailable(pool: impl Into<String>, level: u8) -> Self {
        Self::SlotUnavailable {
            pool: pool.into(),
            level,
        }
    }

    /// Create a slots exhausted error
    pub fn slots_exhausted(level: u8, used: u8, max: u8) -> Self {
        Self::SlotsExhausted { level, used, max }
    }

    /// Whether this error rejects user input (as opposed to a broken invariant).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Parse(_) | Self::InvalidId(_)
        )
    }
}
