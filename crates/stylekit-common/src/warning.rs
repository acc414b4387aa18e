//! Export warnings routed through the [`log`] facade.
//!
//! Provides deduplication so that a stylesheet with thousands of cells does
//! not repeat the same complaint for every box. Used by the key registry and
//! the value parser to report unsupported input.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about unsupported input (emits once per unique message).
///
/// The `component` becomes the log target, so `RUST_LOG=CSS=warn` style
/// filters work as expected.
///
/// # Example
/// ```
/// use stylekit_common::warning::warn_once;
///
/// warn_once("CSS", "unsupported unit 'ex' in letter-spacing: 2ex");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        log::warn!(target: component, "{message}");
    }
}

/// Returns true if `message` was already reported for `component`.
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when starting a new export job)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
