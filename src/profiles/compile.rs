//! Compiling a profile into a partial mount plan.

use serde_json::Value;

use super::ProfileError;
use crate::agents::AgentLoader;
use crate::models::{Document, ModuleConfig, Profile};

/// Compile `profile` into a partial mount plan document.
///
/// The result carries `session` only when the profile selects an
/// orchestrator or context, always carries the four module lists, and
/// carries `instructions` when the profile has a body. Any other
/// frontmatter sections are copied over as they are. Each agent name is
/// resolved through `agents` into an `agents` list entry; an agent that
/// cannot be loaded fails the whole compilation.
pub fn compile_profile_to_mount_plan(
    profile: &Profile,
    agents: &dyn AgentLoader,
) -> Result<Document, ProfileError> {
    let mut plan = Document::new();

    if let Some(session) = &profile.session {
        let mut slots = Document::new();
        if let Some(orchestrator) = &session.orchestrator {
            slots.insert("orchestrator".to_string(), orchestrator.to_value());
        }
        if let Some(context) = &session.context {
            slots.insert("context".to_string(), context.to_value());
        }
        if !slots.is_empty() {
            plan.insert("session".to_string(), Value::Object(slots));
        }
    }

    plan.insert("providers".to_string(), module_list(&profile.providers));
    plan.insert("tools".to_string(), module_list(&profile.tools));
    plan.insert("hooks".to_string(), module_list(&profile.hooks));

    let mut agent_entries = Vec::with_capacity(profile.agents.len());
    for name in &profile.agents {
        let agent = agents.load_agent(name)?;
        agent_entries.push(agent.to_module_config().to_value());
    }
    plan.insert("agents".to_string(), Value::Array(agent_entries));

    for (key, value) in &profile.extra {
        plan.entry(key.clone()).or_insert_with(|| value.clone());
    }
    if !profile.instructions.is_empty() {
        plan.insert(
            "instructions".to_string(),
            Value::String(profile.instructions.clone()),
        );
    }

    tracing::debug!(
        profile = profile.name(),
        providers = profile.providers.len(),
        tools = profile.tools.len(),
        hooks = profile.hooks.len(),
        agents = profile.agents.len(),
        "compiled profile"
    );
    Ok(plan)
}

fn module_list(modules: &[ModuleConfig]) -> Value {
    Value::Array(modules.iter().map(ModuleConfig::to_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentError, FileAgentLoader};
    use crate::models::AgentDefinition;
    use crate::profiles::{FileProfileLoader, ProfileLoader};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct NoAgents;

    impl AgentLoader for NoAgents {
        fn load_agent(&self, name: &str) -> Result<AgentDefinition, AgentError> {
            Err(AgentError::NotFound(name.to_string()))
        }
    }

    fn profile(doc: Value, body: &str) -> Profile {
        Profile::from_document(doc.as_object().unwrap(), body.to_string()).unwrap()
    }

    #[test]
    fn minimal_profile_compiles_to_empty_lists() {
        let plan = compile_profile_to_mount_plan(&profile(json!({"profile": {"name": "p"}}), ""), &NoAgents)
            .unwrap();
        assert_eq!(
            Value::Object(plan),
            json!({"providers": [], "tools": [], "hooks": [], "agents": []})
        );
    }

    #[test]
    fn session_only_includes_selected_slots() {
        let p = profile(
            json!({"profile": {"name": "p"}, "session": {"orchestrator": "loop-streaming"}}),
            "",
        );
        let plan = compile_profile_to_mount_plan(&p, &NoAgents).unwrap();
        assert_eq!(plan["session"], json!({"orchestrator": "loop-streaming"}));
    }

    #[test]
    fn empty_session_block_is_omitted() {
        let p = profile(json!({"profile": {"name": "p"}, "session": {}}), "");
        let plan = compile_profile_to_mount_plan(&p, &NoAgents).unwrap();
        assert!(!plan.contains_key("session"));
    }

    #[test]
    fn module_lists_and_instructions_carried() {
        let p = profile(
            json!({
                "profile": {"name": "p"},
                "providers": [{"module": "provider-openai", "config": {"default_model": "gpt-4o"}}],
                "tools": [{"module": "tool-bash", "source": "git+https://example.com/tool-bash"}]
            }),
            "Be brief.",
        );
        let plan = compile_profile_to_mount_plan(&p, &NoAgents).unwrap();
        assert_eq!(
            plan["providers"],
            json!([{"module": "provider-openai", "config": {"default_model": "gpt-4o"}}])
        );
        assert_eq!(
            plan["tools"],
            json!([{"module": "tool-bash", "source": "git+https://example.com/tool-bash"}])
        );
        assert_eq!(plan["instructions"], json!("Be brief."));
    }

    #[test]
    fn unknown_sections_and_entry_keys_pass_through() {
        let p = profile(
            json!({
                "profile": {"name": "p"},
                "spawn": {"exclude_tools": ["tool-task"]},
                "tools": [{"module": "tool-bash", "enabled": false}]
            }),
            "",
        );
        let plan = compile_profile_to_mount_plan(&p, &NoAgents).unwrap();
        assert_eq!(
            Value::Object(plan),
            json!({
                "providers": [],
                "tools": [{"module": "tool-bash", "enabled": false}],
                "hooks": [],
                "agents": [],
                "spawn": {"exclude_tools": ["tool-task"]}
            })
        );
    }

    #[test]
    fn agents_resolved_through_loader() {
        let p = profile(json!({"profile": {"name": "p"}, "agents": ["explorer"]}), "");
        let plan = compile_profile_to_mount_plan(&p, &FileAgentLoader::default()).unwrap();

        let agents = plan["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0]["module"], json!("explorer"));
        let config = &agents[0]["config"];
        assert!(config["description"].as_str().unwrap().contains("codebase"));
        assert!(config["instructions"].as_str().unwrap().contains("explorer"));
        assert_eq!(config["max_turns"], json!(12));
    }

    #[test]
    fn unknown_agent_fails_compilation() {
        let p = profile(json!({"profile": {"name": "p"}, "agents": ["ghost"]}), "");
        let err = compile_profile_to_mount_plan(&p, &NoAgents).unwrap_err();
        assert!(matches!(err, ProfileError::Agent(AgentError::NotFound(_))));
    }

    #[test]
    fn builtin_dev_compiles() {
        let dev = FileProfileLoader::default().load_profile("dev").unwrap();
        let plan = compile_profile_to_mount_plan(&dev, &FileAgentLoader::default()).unwrap();
        assert_eq!(plan["session"]["orchestrator"], json!("loop-streaming"));
        assert_eq!(plan["session"]["context"]["module"], json!("context-persistent"));
        let agent_ids: Vec<_> = plan["agents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["module"].as_str().unwrap())
            .collect();
        assert_eq!(agent_ids, vec!["explorer", "reviewer"]);
    }
}
