//! The resolved configuration handed to the agent runtime.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Document, ModuleConfig, SessionModule};
use crate::constants::{DEFAULT_CONTEXT, DEFAULT_ORCHESTRATOR};

/// Typed view of a resolved mount plan.
///
/// The resolver works on raw documents; this view is parsed from the
/// result for consumers that want typed access. Keys the runtime does not
/// know about are kept in `extra` rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MountPlan {
    pub session: SessionConfig,
    #[serde(default)]
    pub providers: Vec<ModuleConfig>,
    #[serde(default)]
    pub tools: Vec<ModuleConfig>,
    #[serde(default)]
    pub hooks: Vec<ModuleConfig>,
    #[serde(default)]
    pub agents: Vec<ModuleConfig>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Orchestrator and context selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionConfig {
    pub orchestrator: SessionModule,
    pub context: SessionModule,
    #[serde(flatten)]
    pub extra: Document,
}

impl Default for MountPlan {
    fn default() -> Self {
        Self {
            session: SessionConfig {
                orchestrator: SessionModule::Id(DEFAULT_ORCHESTRATOR.to_string()),
                context: SessionModule::Id(DEFAULT_CONTEXT.to_string()),
                extra: Document::new(),
            },
            providers: Vec::new(),
            tools: Vec::new(),
            hooks: Vec::new(),
            agents: Vec::new(),
            extra: Document::new(),
        }
    }
}

impl MountPlan {
    /// Parse a resolved document into the typed view.
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc.clone()))
    }

    /// Render back into a document.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        let mut session = Document::new();
        session.insert("orchestrator".into(), self.session.orchestrator.to_value());
        session.insert("context".into(), self.session.context.to_value());
        for (k, v) in &self.session.extra {
            session.insert(k.clone(), v.clone());
        }
        doc.insert("session".into(), Value::Object(session));

        let lists = [
            ("providers", &self.providers),
            ("tools", &self.tools),
            ("hooks", &self.hooks),
            ("agents", &self.agents),
        ];
        for (key, list) in lists {
            doc.insert(
                key.into(),
                Value::Array(list.iter().map(ModuleConfig::to_value).collect()),
            );
        }
        for (k, v) in &self.extra {
            doc.insert(k.clone(), v.clone());
        }
        doc
    }

    /// Module ids of every entry in the named list, in order.
    pub fn module_ids(&self, list: &str) -> Vec<&str> {
        let entries = match list {
            "providers" => &self.providers,
            "tools" => &self.tools,
            "hooks" => &self.hooks,
            "agents" => &self.agents,
            _ => return Vec::new(),
        };
        entries.iter().map(|m| m.module.as_str()).collect()
    }
}

/// JSON schema for the mount plan, pretty-printed.
pub fn mount_plan_schema() -> String {
    let schema = schemars::schema_for!(MountPlan);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn default_plan_uses_base_modules() {
        let plan = MountPlan::default();
        assert_eq!(plan.session.orchestrator.module_id(), "loop-basic");
        assert_eq!(plan.session.context.module_id(), "context-simple");
        assert!(plan.providers.is_empty());
    }

    #[test]
    fn from_document_keeps_unknown_keys() {
        let doc = json!({
            "session": {"orchestrator": "loop-basic", "context": {"module": "context-persistent"}},
            "providers": [{"module": "provider-anthropic"}],
            "ui": {"theme": "dark"}
        });
        let plan = MountPlan::from_document(doc.as_object().unwrap()).unwrap();
        assert_eq!(plan.module_ids("providers"), vec!["provider-anthropic"]);
        assert_eq!(plan.session.context.module_id(), "context-persistent");
        assert_eq!(plan.extra.get("ui"), Some(&json!({"theme": "dark"})));
    }

    #[test]
    fn to_document_round_trips_through_from_document() {
        let doc = json!({
            "session": {"orchestrator": "loop-streaming", "context": "context-simple"},
            "providers": [{"module": "p", "config": {"model": "m"}}],
            "tools": [],
            "hooks": [],
            "agents": [{"module": "explorer", "source": "builtin"}]
        });
        let plan = MountPlan::from_document(doc.as_object().unwrap()).unwrap();
        assert_eq!(Value::Object(plan.to_document()), doc);
    }

    #[test]
    fn from_document_requires_session() {
        let doc = json!({"providers": []});
        assert!(MountPlan::from_document(doc.as_object().unwrap()).is_err());
    }

    #[test]
    fn schema_mentions_session_and_providers() {
        let schema = mount_plan_schema();
        assert!(schema.contains("session"));
        assert!(schema.contains("providers"));
    }
}
