//! Core types for the state container.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Version of a container's state (number of accepted updates).
///
/// The initial state is version 0; every accepted request advances it by one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Version(pub u64);

impl Version {
    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ver({})", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single update submitted to a container.
///
/// `value` distinguishes "no value given" (`None`) from an explicit value.
/// `Some(Value::Null)`, `Some(false)` and `Some(0)` are all legal explicit
/// values; only `None` means "unset". Requests are transient per call and are
/// never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateRequest {
    /// State field name or custom action name.
    pub key: String,

    /// Explicit value, or `None` when the caller provided no value.
    pub value: Option<Value>,
}

impl UpdateRequest {
    /// Request that `key` be set to `value`.
    pub fn set(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Request carrying no value (an action name for a custom resolver).
    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Whether an explicit value was provided.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Counters describing a container's update history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// Updates that produced a new state version.
    pub accepted: u64,

    /// Updates withheld by validation (diagnostic emitted, state unchanged).
    pub rejected: u64,

    /// Current state version.
    pub version: Version,
}
