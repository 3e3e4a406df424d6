//! Identity merge for module lists.
//!
//! Entries are matched by their `module` id. Output order is every base id
//! in its original position, followed by overlay-only ids in the order the
//! overlay listed them. Matching entries are deep-merged with the overlay
//! winning on conflicting keys.
//!
//! Entries without a string `module` id cannot be matched. They are passed
//! through in place and never act as merge targets.

use indexmap::IndexMap;
use serde_json::Value;

use super::deep_merge;
use crate::models::ModuleConfig;

/// Merge two module lists by `module` identity.
pub fn merge_module_lists(base: &[Value], overlay: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(base.len() + overlay.len());
    // module id -> position in `merged`, in first-seen order
    let mut index: IndexMap<String, usize> = IndexMap::new();

    for entry in base.iter().chain(overlay) {
        let Some(id) = ModuleConfig::id_of(entry) else {
            tracing::debug!(entry = %entry, "module list entry has no `module` id; passing through");
            merged.push(entry.clone());
            continue;
        };

        match index.get(id) {
            Some(&pos) => {
                let updated = merge_module_entry(&merged[pos], entry);
                merged[pos] = updated;
            }
            None => {
                index.insert(id.to_string(), merged.len());
                merged.push(entry.clone());
            }
        }
    }

    merged
}

/// Merge two entries that share a `module` id.
///
/// `config` merges key-by-key (recursively) and `source` is replaced only
/// if the overlay carries a non-null one. A null `config` in the overlay
/// leaves the base's untouched. The id itself never changes.
fn merge_module_entry(base: &Value, overlay: &Value) -> Value {
    let (Some(base_map), Some(overlay_map)) = (base.as_object(), overlay.as_object()) else {
        return overlay.clone();
    };

    let mut overlay_map = overlay_map.clone();
    for key in ["source", "config"] {
        if overlay_map.get(key).is_some_and(Value::is_null) {
            overlay_map.remove(key);
        }
    }
    Value::Object(deep_merge(base_map, &overlay_map))
}
