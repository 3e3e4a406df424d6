//! Built-in agent registry.
//!
//! Agents are embedded via `include_str!` so they ship with the binary.

use crate::agents::parser;
use crate::models::AgentDefinition;

const EXPLORER_MD: &str = include_str!("explorer.md");
const REVIEWER_MD: &str = include_str!("reviewer.md");

/// List of all built-in agent names.
const BUILTIN_NAMES: &[&str] = &["explorer", "reviewer"];

/// Get a built-in agent definition by name.
pub fn get_builtin(name: &str) -> Option<AgentDefinition> {
    let md = match name {
        "explorer" => EXPLORER_MD,
        "reviewer" => REVIEWER_MD,
        _ => return None,
    };

    parser::parse_agent_definition(md).ok()
}

/// List all available built-in agent names.
pub fn list_builtin_names() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtins_parse() {
        for name in BUILTIN_NAMES {
            let agent = get_builtin(name)
                .unwrap_or_else(|| panic!("built-in agent '{name}' failed to parse"));
            assert_eq!(agent.meta.name, *name);
            assert!(!agent.instructions.is_empty());
            assert!(!agent.meta.description.is_empty());
        }
    }

    #[test]
    fn unknown_builtin_returns_none() {
        assert!(get_builtin("nonexistent").is_none());
    }

    #[test]
    fn list_names() {
        let names = list_builtin_names();
        assert!(names.contains(&"explorer"));
        assert!(names.contains(&"reviewer"));
    }
}
