//! Markdown + YAML frontmatter parser for agent definitions.

use crate::document::split_frontmatter;
use crate::models::agent::{AgentDefinition, AgentMeta};

/// Parse a markdown file with YAML frontmatter into an [`AgentDefinition`].
///
/// Expected format:
/// ```markdown
/// ---
/// name: explorer
/// description: Reads the codebase and reports back
/// source: git+https://example.com/agents/explorer
/// config:
///   max_turns: 8
/// ---
///
/// Instructions here...
/// ```
pub fn parse_agent_definition(content: &str) -> Result<AgentDefinition, String> {
    let (frontmatter, body) = split_frontmatter(content)?;
    let meta: AgentMeta =
        serde_yaml_ng::from_str(&frontmatter).map_err(|e| format!("invalid frontmatter: {e}"))?;

    if meta.name.trim().is_empty() {
        return Err("agent name must not be empty".to_string());
    }

    Ok(AgentDefinition {
        meta,
        instructions: body.trim().to_string(),
    })
}
