//! Shallow merge for aggregate configuration trees.
//!
//! Implements top-level key merging where later values override earlier
//! values. Nested objects are replaced entirely, not merged field-by-field:
//! the aggregate is a flat namespace of configuration units and a re-pushed
//! unit replaces its own top-level keys wholesale.

use serde_json::{Map, Value};

/// Merge `overlay`'s top-level keys into `target`, overwriting existing keys.
///
/// Only object overlays contribute keys; any other value has no top-level
/// mapping to merge and leaves `target` untouched. Returns `true` when the
/// target was modified.
pub fn shallow_merge(target: &mut Map<String, Value>, overlay: Value) -> bool {
    match overlay {
        Value::Object(map) => {
            let changed = !map.is_empty();
            for (key, value) in map {
                target.insert(key, value);
            }
            changed
        }
        _ => false,
    }
}

/// Merge multiple values in order into a fresh map, later values winning.
pub fn shallow_merge_all(values: impl IntoIterator<Item = Value>) -> Map<String, Value> {
    let mut target = Map::new();
    for value in values {
        shallow_merge(&mut target, value);
    }
    target
}
