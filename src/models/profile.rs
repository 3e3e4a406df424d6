//! Profile types: named bundles of defaults selectable by the user.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Document, ModuleConfig, SessionModule};

/// A loaded profile (frontmatter plus instruction body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity and inheritance metadata.
    pub profile: ProfileMeta,
    /// Orchestrator/context selection; absent keeps whatever is below.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<ProfileSession>,
    #[serde(default)]
    pub providers: Vec<ModuleConfig>,
    #[serde(default)]
    pub tools: Vec<ModuleConfig>,
    #[serde(default)]
    pub hooks: Vec<ModuleConfig>,
    /// Agent names, resolved through an agent loader at compile time.
    #[serde(default)]
    pub agents: Vec<String>,
    /// System instructions (markdown body after the frontmatter).
    #[serde(skip)]
    pub instructions: String,
    /// Other frontmatter sections (`spawn`, `ui`, ...), passed through to
    /// the mount plan unchanged.
    #[serde(flatten)]
    pub extra: Document,
}

/// The `profile:` block of a profile's frontmatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parent profile this one is layered on top of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

/// The `session:` block of a profile's frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator: Option<SessionModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<SessionModule>,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Provider list as raw document values, for identity merging.
    pub fn provider_values(&self) -> Vec<Value> {
        self.providers.iter().map(ModuleConfig::to_value).collect()
    }

    /// Build a profile from its merged frontmatter document.
    pub fn from_document(doc: &Document, instructions: String) -> Result<Self, serde_json::Error> {
        let mut profile: Profile = serde_json::from_value(Value::Object(doc.clone()))?;
        profile.instructions = instructions;
        profile.agents = dedup_preserving_order(profile.agents);
        Ok(profile)
    }
}

/// Drop repeated names, keeping the first occurrence.
fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names.into_iter().filter(|n| seen.insert(n.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_document_minimal() {
        let doc = json!({"profile": {"name": "base"}});
        let profile = Profile::from_document(doc.as_object().unwrap(), String::new()).unwrap();
        assert_eq!(profile.name(), "base");
        assert!(profile.session.is_none());
        assert!(profile.providers.is_empty());
        assert!(profile.profile.extends.is_none());
    }

    #[test]
    fn from_document_dedups_agents() {
        let doc = json!({
            "profile": {"name": "dev"},
            "agents": ["explorer", "reviewer", "explorer"]
        });
        let profile = Profile::from_document(doc.as_object().unwrap(), "Be brief.".into()).unwrap();
        assert_eq!(profile.agents, vec!["explorer", "reviewer"]);
        assert_eq!(profile.instructions, "Be brief.");
    }

    #[test]
    fn from_document_keeps_unknown_sections() {
        let doc = json!({
            "profile": {"name": "p"},
            "spawn": {"exclude_tools": ["tool-task"]},
            "ui": {"theme": "dark"}
        });
        let profile = Profile::from_document(doc.as_object().unwrap(), String::new()).unwrap();
        assert_eq!(profile.extra.get("spawn"), Some(&json!({"exclude_tools": ["tool-task"]})));
        assert_eq!(profile.extra.get("ui"), Some(&json!({"theme": "dark"})));
        assert!(!profile.extra.contains_key("profile"));
    }

    #[test]
    fn from_document_requires_name() {
        let doc = json!({"profile": {"description": "nameless"}});
        assert!(Profile::from_document(doc.as_object().unwrap(), String::new()).is_err());
    }

    #[test]
    fn provider_values_render_entries() {
        let doc = json!({
            "profile": {"name": "p"},
            "providers": [{"module": "provider-openai", "config": {"model": "gpt-4o"}}]
        });
        let profile = Profile::from_document(doc.as_object().unwrap(), String::new()).unwrap();
        assert_eq!(
            profile.provider_values(),
            vec![json!({"module": "provider-openai", "config": {"model": "gpt-4o"}})]
        );
    }
}
