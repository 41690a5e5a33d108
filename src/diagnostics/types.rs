//! Diagnostic event and subscription types.

use crate::error::StateError;
use crate::types::Version;
use serde::{Deserialize, Serialize};

/// Configuration for a diagnostic subscription.
#[derive(Clone, Debug)]
pub struct DiagnosticConfig {
    /// Max buffered events before the subscriber is dropped.
    /// Default: 256
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: DiagnosticFilter,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            filter: DiagnosticFilter::default(),
        }
    }
}

/// Filter criteria for diagnostic subscriptions.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticFilter {
    /// Only receive rejections for these keys (None = all keys).
    /// Key-less events (inert container) always match.
    pub keys: Option<Vec<String>>,
}

impl DiagnosticFilter {
    /// Receive every diagnostic.
    pub fn all() -> Self {
        Self::default()
    }

    /// Receive rejections for specific keys only.
    pub fn keys(keys: Vec<String>) -> Self {
        Self { keys: Some(keys) }
    }
}

/// Events emitted when the container rejects an update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The key is not a field of the construction-time state shape.
    UnrecognizedKey { key: String, version: Version },

    /// No value was provided and no custom resolver could handle the request.
    MissingValue { key: String, version: Version },

    /// The container was constructed with an invalid initial state and
    /// ignores every request.
    InertContainer { key: String },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

impl Diagnostic {
    /// Build the event for a rejection at the given state version.
    pub(crate) fn from_error(error: &StateError, key: &str, version: Version) -> Self {
        match error {
            StateError::UnrecognizedKey(key) => Diagnostic::UnrecognizedKey {
                key: key.clone(),
                version,
            },
            StateError::MissingValue(key) => Diagnostic::MissingValue {
                key: key.clone(),
                version,
            },
            StateError::InvalidInitialState => Diagnostic::InertContainer {
                key: key.to_string(),
            },
        }
    }

    /// The request key this event concerns, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Diagnostic::UnrecognizedKey { key, .. }
            | Diagnostic::MissingValue { key, .. }
            | Diagnostic::InertContainer { key } => Some(key),
            Diagnostic::Dropped { .. } => None,
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer). The notice itself competes
    /// with the full buffer and is usually not deliverable; the reliable
    /// signal is the channel disconnecting once the subscriber drains what
    /// was buffered.
    BufferOverflow,
    /// Receiver was disconnected.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a diagnostic subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Handle to receive diagnostics.
pub struct DiagnosticHandle {
    pub id: SubscriberId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<Diagnostic>,
}

impl DiagnosticHandle {
    /// Receive the next diagnostic (blocking).
    pub fn recv(&self) -> Result<Diagnostic, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a diagnostic (non-blocking).
    pub fn try_recv(&self) -> Result<Diagnostic, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Diagnostic, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.receiver.try_iter().collect()
    }
}

impl std::fmt::Debug for DiagnosticHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticHandle")
            .field("id", &self.id)
            .finish()
    }
}
