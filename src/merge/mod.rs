//! Recursive document merging.
//!
//! `deep_merge` layers an overlay document on top of a base:
//!
//! - module-list keys (`providers`, `tools`, `hooks`, `agents`) holding
//!   lists on both sides are merged by `module` identity
//!   (see [`modules::merge_module_lists`]);
//! - mappings on both sides are merged recursively;
//! - anything else in the overlay replaces the base value wholesale,
//!   including plain lists and type mismatches.
//!
//! Both inputs are left untouched; a new document is returned. No shape
//! validation happens here.

pub mod modules;

use serde_json::Value;

use crate::models::{Document, is_module_list_key};

pub use modules::merge_module_lists;

/// Merge `overlay` over `base`, returning a new document.
pub fn deep_merge(base: &Document, overlay: &Document) -> Document {
    let mut result = base.clone();
    merge_into(&mut result, overlay);
    result
}

/// Merge `overlay` into `target` in place.
///
/// `target` is always an owned copy, so only the branches the overlay
/// touches are rebuilt.
fn merge_into(target: &mut Document, overlay: &Document) {
    for (key, overlay_val) in overlay {
        let merged = match (target.get(key), overlay_val) {
            (Some(Value::Array(base_list)), Value::Array(overlay_list))
                if is_module_list_key(key) =>
            {
                Value::Array(merge_module_lists(base_list, overlay_list))
            }
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                Value::Object(deep_merge(base_map, overlay_map))
            }
            _ => overlay_val.clone(),
        };
        target.insert(key.clone(), merged);
    }
}

/// Merge a sequence of layers, lowest precedence first.
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Document>) -> Document {
    layers
        .into_iter()
        .fold(Document::new(), |acc, layer| deep_merge(&acc, layer))
}
