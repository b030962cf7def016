//! Layer-merging helpers shared by the resolver stages.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A configuration value that may be unset.
pub trait Layer {
    fn is_unset(&self) -> bool;
}

impl Layer for str {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Layer for BTreeMap<K, V> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Layer for Map<String, Value> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// Whole-value override: `per_call` when it is set, `default` otherwise.
pub fn pick<'a, T: Layer + ?Sized>(per_call: &'a T, default: &'a T) -> &'a T {
    if per_call.is_unset() {
        default
    } else {
        per_call
    }
}

/// Optional-string variant of [`pick`]. Empty strings count as unset and are
/// never returned.
pub fn pick_str<'a>(per_call: Option<&'a str>, default: Option<&'a str>) -> Option<&'a str> {
    let per_call = per_call.filter(|value| !value.is_unset());
    let default = default.filter(|value| !value.is_unset());
    per_call.or(default)
}

/// Key-level merge: every key of `defaults`, then every key of `overrides`
/// on top. On collision the override wins. Neither input is modified.
pub fn merge_maps<V: Clone>(
    defaults: &BTreeMap<String, V>,
    overrides: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let mut merged = defaults.clone();
    merged.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}
