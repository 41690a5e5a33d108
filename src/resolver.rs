//! Update resolution: the default keyed-update logic and the custom
//! resolver seam.

use crate::error::{Result, StateError};
use crate::types::UpdateRequest;
use serde_json::Value;

/// Outcome of a custom resolver.
///
/// `Deferred` is a control signal, not a state value: it hands the request
/// to the default keyed-update logic. `Resolved` is final even when the
/// returned value equals the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The resolver produced the next state verbatim.
    Resolved(Value),

    /// Fall through to the default keyed update for this request.
    Deferred,
}

/// Custom update logic supplied at container construction.
///
/// A resolver sees every request before the default logic does. Returning
/// [`Resolution::Deferred`] re-enters the default keyed update, which runs
/// its full validation (recognized key, value provided). Panics inside a
/// resolver are not caught by the container.
///
/// Any `Fn(&Value, &UpdateRequest) -> Resolution` closure is a resolver:
///
/// ```
/// use keystate::{Resolution, UpdateRequest};
/// use serde_json::{json, Value};
///
/// let reset = |_state: &Value, request: &UpdateRequest| match request.key.as_str() {
///     "reset" => Resolution::Resolved(json!({ "count": 0 })),
///     _ => Resolution::Deferred,
/// };
/// # let _ = reset;
/// ```
pub trait Resolver: Send + Sync {
    fn resolve(&self, state: &Value, request: &UpdateRequest) -> Resolution;
}

impl<F> Resolver for F
where
    F: Fn(&Value, &UpdateRequest) -> Resolution + Send + Sync,
{
    fn resolve(&self, state: &Value, request: &UpdateRequest) -> Resolution {
        self(state, request)
    }
}

/// Extract the recognized key set from an initial state.
///
/// Returns `None` unless the value is a JSON object; arrays and scalars are
/// invalid top-level state. The key set is captured once, at construction,
/// and never re-derived from later state versions.
pub fn recognized_keys(initial: &Value) -> Option<Vec<String>> {
    match initial {
        Value::Object(map) => Some(map.keys().cloned().collect()),
        _ => None,
    }
}

/// Default keyed update: replace exactly one recognized field.
///
/// Validation order matches the fail-soft contract: a request with no value
/// is rejected before the key is checked, so `request("name")` on a
/// recognized key still reports a missing value. The produced state is a
/// copy of the current object with the one field replaced.
pub fn apply_keyed_update(
    state: &Value,
    keys: &[String],
    request: &UpdateRequest,
) -> Result<Value> {
    let value = request
        .value
        .as_ref()
        .ok_or_else(|| StateError::MissingValue(request.key.clone()))?;

    if !keys.iter().any(|k| k == &request.key) {
        return Err(StateError::UnrecognizedKey(request.key.clone()));
    }

    let mut next = match state {
        Value::Object(map) => map.clone(),
        // Key recognition is based on the construction-time shape. If a
        // custom resolver replaced the state with a non-object, the deferred
        // path rebuilds an object holding just the addressed field.
        _ => serde_json::Map::new(),
    };
    next.insert(request.key.clone(), value.clone());
    Ok(Value::Object(next))
}
