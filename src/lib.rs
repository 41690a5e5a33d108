//! # keystate
//!
//! A fail-soft, key-addressed state container with pluggable resolvers.
//!
//! ## Core Concepts
//!
//! - **Keyed updates**: state transitions that replace exactly one named
//!   field of a JSON object state
//! - **Resolvers**: optional custom update logic that can defer back to the
//!   default keyed update
//! - **Diagnostics**: rejected updates are reported over a subscription
//!   channel instead of raising errors
//! - **Versions**: every accepted update produces a new immutable snapshot
//!
//! ## Example
//!
//! ```
//! use keystate::{Resolution, StateContainer, UpdateRequest};
//! use serde_json::{json, Value};
//!
//! let container = StateContainer::with_resolver(
//!     json!({"name": "Banana", "cost": 2.5}),
//!     |state: &Value, request: &UpdateRequest| match request.key.as_str() {
//!         "reset" => {
//!             let mut next = state.clone();
//!             next["cost"] = json!(0.0);
//!             Resolution::Resolved(next)
//!         }
//!         _ => Resolution::Deferred,
//!     },
//! );
//!
//! // Handled by the resolver.
//! container.signal("reset");
//! // Deferred to the default keyed update.
//! container.set("name", "Orange");
//!
//! assert_eq!(*container.read(), json!({"name": "Orange", "cost": 0.0}));
//! ```

pub mod container;
pub mod diagnostics;
pub mod error;
pub mod resolver;
pub mod types;

// Re-exports
pub use container::{ContainerConfig, StateContainer};
pub use diagnostics::{
    Diagnostic, DiagnosticConfig, DiagnosticFilter, DiagnosticHandle, DiagnosticHub, DropReason,
    SubscriberId,
};
pub use error::{Result, StateError};
pub use resolver::{apply_keyed_update, recognized_keys, Resolution, Resolver};
pub use types::{ContainerStats, UpdateRequest, Version};
