//! Agent definition types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Document, ModuleConfig};

/// A parsed agent from markdown+YAML frontmatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Metadata from the YAML frontmatter.
    pub meta: AgentMeta,
    /// The agent's instructions (markdown body after frontmatter).
    pub instructions: String,
}

/// Metadata from the YAML frontmatter of an agent definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMeta {
    /// Unique name of the agent; becomes the module id in the mount plan.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Optional module source for runtimes that fetch agents remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Extra settings copied into the agent's module config.
    #[serde(default)]
    pub config: Document,
}

impl AgentDefinition {
    /// Express this agent as an `agents` list entry.
    ///
    /// Frontmatter `config` keys come first; `description` and
    /// `instructions` are only filled in when the frontmatter did not set them.
    pub fn to_module_config(&self) -> ModuleConfig {
        let mut config = self.meta.config.clone();
        if !self.meta.description.is_empty() {
            config
                .entry("description")
                .or_insert_with(|| Value::String(self.meta.description.clone()));
        }
        if !self.instructions.is_empty() {
            config
                .entry("instructions")
                .or_insert_with(|| Value::String(self.instructions.clone()));
        }

        let mut module = ModuleConfig::new(self.meta.name.clone());
        module.source = self.meta.source.clone();
        if !config.is_empty() {
            module.config = Some(config);
        }
        module
    }
}
