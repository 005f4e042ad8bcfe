/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export MemoryError from memory module
pub use crate::memory::MemoryError;

/// Result type for typed memory operations
pub type RefResult<T> = Result<T, RefError>;

/// Typed memory errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum RefError {
    #[error("could not determine a proper \"type\" from: {0}")]
    #[diagnostic(
        code(memref::invalid_type),
        help("Use a registered type name, optionally followed by '*', or a descriptor with size and indirection.")
    )]
    InvalidType(String),

    #[error("Invalid operation: {0}")]
    #[diagnostic(code(memref::invalid_operation))]
    InvalidOperation(String),

    #[error("Invalid state: {0}")]
    #[diagnostic(
        code(memref::invalid_state),
        help("Give the view a type before reading or writing through it.")
    )]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(memref::invalid_input))]
    InvalidInput(String),

    #[error("Range error: {0}")]
    #[diagnostic(code(memref::range))]
    RangeError(String),

    #[error("Null dereference: {0}")]
    #[diagnostic(
        code(memref::null_dereference),
        help("The view points at address 0; check is_null() first.")
    )]
    NullDereference(String),

    #[error("Memory provider error: {0}")]
    #[diagnostic(code(memref::memory))]
    Memory(#[from] MemoryError),
}

impl RefError {
    pub fn invalid_type(spec: impl Into<String>) -> Self {
        RefError::InvalidType(spec.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        RefError::InvalidOperation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        RefError::InvalidState(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        RefError::InvalidInput(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        RefError::RangeError(msg.into())
    }

    pub fn null_dereference(msg: impl Into<String>) -> Self {
        RefError::NullDereference(msg.into())
    }

    /// Whether this error came from the memory provider rather than the typed layer
    pub fn is_memory(&self) -> bool {
        matches!(self, RefError::Memory(_))
    }
}
