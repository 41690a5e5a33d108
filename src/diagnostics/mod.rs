//! Diagnostic channel for rejected updates.
//!
//! Rejections never raise errors to the caller of `request`; they surface
//! here instead. Subscribers receive [`Diagnostic`] events over bounded
//! channels, optionally filtered by key. The hub is an injected collaborator
//! of the container, so tests can observe rejections without intercepting
//! global logging.

mod hub;
mod types;

pub use hub::DiagnosticHub;
pub use types::{
    Diagnostic, DiagnosticConfig, DiagnosticFilter, DiagnosticHandle, DropReason, SubscriberId,
};
