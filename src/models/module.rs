//! Module references: the unit every module list is made of.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;

/// One pluggable component reference (provider, tool, hook, agent, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleConfig {
    /// Identifier, unique within its list.
    pub module: String,
    /// Where to fetch the module from. Absent means "resolve by id elsewhere".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Module-specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Document>,
    /// Any other entry keys (`enabled`, ...), carried through untouched.
    #[serde(flatten)]
    pub extra: Document,
}

impl ModuleConfig {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            source: None,
            config: None,
            extra: Document::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_config(mut self, config: Document) -> Self {
        self.config = Some(config);
        self
    }

    /// Render as a document value, omitting absent fields.
    pub fn to_value(&self) -> Value {
        let mut map = Document::new();
        map.insert("module".to_string(), Value::String(self.module.clone()));
        if let Some(ref source) = self.source {
            map.insert("source".to_string(), Value::String(source.clone()));
        }
        if let Some(ref config) = self.config {
            map.insert("config".to_string(), Value::Object(config.clone()));
        }
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }

    /// Parse a module entry from a document value.
    ///
    /// Returns `None` when the value is not a mapping with a string `module`
    /// or when `source`/`config` have the wrong shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Extract the `module` identifier of a raw list entry, if it has one.
    pub fn id_of(value: &Value) -> Option<&str> {
        value.get("module").and_then(Value::as_str)
    }
}

/// Session slot (orchestrator or context): a bare module id or a full entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SessionModule {
    Id(String),
    Module(ModuleConfig),
}

impl SessionModule {
    /// The module identifier regardless of representation.
    pub fn module_id(&self) -> &str {
        match self {
            SessionModule::Id(id) => id,
            SessionModule::Module(m) => &m.module,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SessionModule::Id(id) => Value::String(id.clone()),
            SessionModule::Module(m) => m.to_value(),
        }
    }
}
