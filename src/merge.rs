//! # Merge Utility
//!
//! Deep merge of ordered output mappings. Used where one logical setting is
//! scattered across multiple sibling source elements, each contributing a
//! partial record (the coverage-threshold case: one field per metric per
//! threshold-kind element).
//!
//! The merge is copy-on-write: neither input is mutated, so callers can
//! reuse the same base across several overlay merges in a loop. Key order
//! in the result follows the base, with overlay-only keys appended in
//! overlay order.

use crate::value::{Map, Value};

/// Recursively merge `overlay` into `base`, returning a new mapping.
///
/// If both sides hold a nested mapping at a key, the two are merged
/// recursively; otherwise the overlay's value replaces the base's.
pub fn deep_merge(base: &Map, overlay: &Map) -> Map {
    let mut result = base.clone();
    for (key, overlay_value) in overlay {
        match (result.get(key), overlay_value) {
            (Some(Value::Map(base_inner)), Value::Map(overlay_inner)) => {
                let merged = deep_merge(base_inner, overlay_inner);
                result.insert(key.clone(), Value::Map(merged));
            }
            _ => {
                result.insert(key.clone(), overlay_value.clone());
            }
        }
    }
    result
}
