//! Shared types used across all modules.
//!
//! Configuration documents are handled as ordered JSON maps so that merge
//! and expansion stay shape-agnostic. The typed views in this module
//! ([`ModuleConfig`], [`MountPlan`], [`Profile`], [`AgentDefinition`]) are
//! parsed from those documents at the edges.

pub mod agent;
pub mod module;
pub mod mount_plan;
pub mod profile;

use serde_json::{Map, Value};

pub use agent::{AgentDefinition, AgentMeta};
pub use module::{ModuleConfig, SessionModule};
pub use mount_plan::{MountPlan, SessionConfig};
pub use profile::{Profile, ProfileMeta, ProfileSession};

/// A configuration document: an insertion-ordered string-keyed mapping.
pub type Document = Map<String, Value>;

/// Returns `true` if `key` names one of the identity-merged module lists.
pub fn is_module_list_key(key: &str) -> bool {
    crate::constants::MODULE_LIST_KEYS.contains(&key)
}
