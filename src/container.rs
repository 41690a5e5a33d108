//! Main state container tying resolution and diagnostics together.

use crate::diagnostics::{Diagnostic, DiagnosticConfig, DiagnosticHandle, DiagnosticHub, SubscriberId};
use crate::error::StateError;
use crate::resolver::{apply_keyed_update, recognized_keys, Resolution, Resolver};
use crate::types::{ContainerStats, UpdateRequest, Version};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Container configuration.
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    /// Default buffer size for diagnostic subscriptions created through
    /// [`StateContainer::subscribe_diagnostics`].
    pub diagnostic_buffer_size: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            diagnostic_buffer_size: 256,
        }
    }
}

/// A fail-soft, key-addressed state container.
///
/// Holds a JSON object state and applies one-field updates addressed by key.
/// The recognized key set is captured from the initial state at construction
/// and never changes. Invalid updates are withheld and reported through the
/// diagnostic channel; [`request`] never returns an error, since it is meant
/// to be called from event handlers where a propagated error would be
/// disruptive.
///
/// Each accepted update produces a new immutable state version behind an
/// `Arc`; snapshots obtained from [`read`] are never mutated afterwards.
///
/// ```
/// use keystate::StateContainer;
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"name": "Banana", "cost": 2.5}));
/// container.set("name", "Orange");
/// assert_eq!(*container.read(), json!({"name": "Orange", "cost": 2.5}));
/// ```
///
/// [`read`]: StateContainer::read
/// [`request`]: StateContainer::request
pub struct StateContainer {
    /// Current state version (immutable snapshot).
    state: RwLock<Arc<Value>>,

    /// Field names captured from the initial state. Empty for inert
    /// containers.
    keys: Vec<String>,

    /// Custom resolver, consulted before the default keyed update.
    resolver: Option<Box<dyn Resolver>>,

    /// Rejection event broadcast.
    diagnostics: DiagnosticHub,

    /// Set when construction received a non-object initial state.
    inert: bool,

    config: ContainerConfig,

    /// Lock serializing the snapshot-resolve-commit sequence so concurrent
    /// requests cannot base their next state on the same snapshot.
    update_lock: Mutex<()>,

    /// Accepted/rejected counters and version, updated together.
    stats: Mutex<ContainerStats>,
}

impl StateContainer {
    /// Create a container with the default keyed-update behavior only.
    pub fn new(initial: Value) -> Self {
        Self::with_config(initial, None, ContainerConfig::default())
    }

    /// Create a container with a custom resolver.
    ///
    /// The resolver is consulted first for every request; it may produce the
    /// next state directly or defer to the default keyed update.
    pub fn with_resolver(initial: Value, resolver: impl Resolver + 'static) -> Self {
        Self::with_config(initial, Some(Box::new(resolver)), ContainerConfig::default())
    }

    /// Create a container with explicit configuration.
    ///
    /// Construction is fail-soft: a non-object initial state (array, null,
    /// scalar) yields a permanently inert container rather than an error.
    /// The inert container keeps returning the original value from
    /// [`read`](Self::read) and emits a diagnostic on every request.
    pub fn with_config(
        initial: Value,
        resolver: Option<Box<dyn Resolver>>,
        config: ContainerConfig,
    ) -> Self {
        let keys = recognized_keys(&initial);
        let inert = keys.is_none();
        if inert {
            warn!(error = %StateError::InvalidInitialState, "container is inert");
        }

        Self {
            state: RwLock::new(Arc::new(initial)),
            keys: keys.unwrap_or_default(),
            resolver,
            diagnostics: DiagnosticHub::new(),
            inert,
            config,
            update_lock: Mutex::new(()),
            stats: Mutex::new(ContainerStats::default()),
        }
    }

    // --- Reads ---

    /// Snapshot of the current state version.
    pub fn read(&self) -> Arc<Value> {
        Arc::clone(&self.state.read())
    }

    /// Field names recognized by the default keyed update.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Current state version (number of accepted updates).
    pub fn version(&self) -> Version {
        self.stats.lock().version
    }

    /// Accepted/rejected counters.
    pub fn stats(&self) -> ContainerStats {
        *self.stats.lock()
    }

    /// Whether construction received an invalid initial state.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    // --- Updates ---

    /// Submit an update request.
    ///
    /// The sole mutation entry point. On acceptance the container advances
    /// to a new state version; on rejection state is left unchanged and a
    /// diagnostic is emitted. Never returns or raises an error from its own
    /// logic; a panic inside a custom resolver propagates unmodified.
    ///
    /// Concurrent requests are serialized: each one resolves against the
    /// state committed by the previous request, never a stale snapshot.
    pub fn request(&self, request: UpdateRequest) {
        if self.inert {
            self.reject(&StateError::InvalidInitialState, &request.key);
            return;
        }

        // Updates apply in request order: concurrent callers queue here, and
        // each resolves against the snapshot left by the previous commit.
        // Resolvers only see `&Value`, so no reentrancy through this lock.
        let _update_guard = self.update_lock.lock();

        let current = self.read();

        let outcome = match &self.resolver {
            None => apply_keyed_update(&current, &self.keys, &request),
            Some(resolver) => match resolver.resolve(&current, &request) {
                // Final even when identical to the current state.
                Resolution::Resolved(next) => Ok(next),
                Resolution::Deferred => apply_keyed_update(&current, &self.keys, &request),
            },
        };

        match outcome {
            Ok(next) => self.commit(next, &request.key),
            Err(error) => self.reject(&error, &request.key),
        }
    }

    /// Request that `key` be set to `value`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.request(UpdateRequest::set(key, value));
    }

    /// Submit a value-less request (an action name for a custom resolver).
    pub fn signal(&self, key: impl Into<String>) {
        self.request(UpdateRequest::bare(key));
    }

    // --- Diagnostics ---

    /// Subscribe to rejection diagnostics with the container's default
    /// buffer size.
    pub fn subscribe_diagnostics(&self) -> DiagnosticHandle {
        self.diagnostics.subscribe(DiagnosticConfig {
            buffer_size: self.config.diagnostic_buffer_size,
            ..Default::default()
        })
    }

    /// Subscribe with explicit configuration (buffer size, key filter).
    pub fn subscribe_diagnostics_with(&self, config: DiagnosticConfig) -> DiagnosticHandle {
        self.diagnostics.subscribe(config)
    }

    /// Remove a diagnostic subscription.
    pub fn unsubscribe_diagnostics(&self, id: SubscriberId) {
        self.diagnostics.unsubscribe(id);
    }

    // --- Internals ---

    fn commit(&self, next: Value, key: &str) {
        let mut stats = self.stats.lock();
        *self.state.write() = Arc::new(next);
        stats.accepted += 1;
        stats.version = stats.version.next();
        debug!(key, version = %stats.version, "state updated");
    }

    fn reject(&self, error: &StateError, key: &str) {
        let version = {
            let mut stats = self.stats.lock();
            stats.rejected += 1;
            stats.version
        };
        warn!(key, %error, "update rejected");
        self.diagnostics
            .broadcast(Diagnostic::from_error(error, key, version));
    }
}

impl std::fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("keys", &self.keys)
            .field("inert", &self.inert)
            .field("stats", &self.stats.lock())
            .finish()
    }
}
