//! Error types for the state container.

use thiserror::Error;

/// Main error type for container operations.
///
/// Rejections are never surfaced as `Err` from [`request`]; they are routed
/// to the diagnostic channel instead. The variants exist so the default
/// update logic and the diagnostics layer agree on the three distinguishable
/// failure cases.
///
/// [`request`]: crate::StateContainer::request
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Unrecognized property name: '{0}'. State was not modified.")]
    UnrecognizedKey(String),

    #[error("Missing value for '{0}'. Provide the value or use a custom resolver.")]
    MissingValue(String),

    #[error("Initial state should be a non-array object.")]
    InvalidInitialState,
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, StateError>;
