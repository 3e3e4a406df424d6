//! Agent loading and markdown+YAML parsing.

pub mod builtin;
pub mod parser;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::AgentDefinition;

/// Errors from agent loading.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("agent not found: {0}")]
    NotFound(String),

    #[error("failed to read agent file {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse agent definition {path}: {message}")]
    ParseError { path: String, message: String },
}

/// Resolves agent names into definitions.
pub trait AgentLoader {
    fn load_agent(&self, name: &str) -> Result<AgentDefinition, AgentError>;
}

/// Loads agents from the built-in registry and an optional directory.
///
/// Resolution order for each name:
/// 1. If it matches a built-in name → use the embedded agent
/// 2. If `agent_dir` is set and `{agent_dir}/{name}.md` exists → load it
/// 3. If it's a file path (contains `/` or ends in `.md`) → load it directly
/// 4. Otherwise → error listing the built-ins
#[derive(Debug, Clone, Default)]
pub struct FileAgentLoader {
    agent_dir: Option<PathBuf>,
}

impl FileAgentLoader {
    pub fn new(agent_dir: Option<PathBuf>) -> Self {
        Self { agent_dir }
    }
}

impl AgentLoader for FileAgentLoader {
    fn load_agent(&self, name: &str) -> Result<AgentDefinition, AgentError> {
        if let Some(agent) = builtin::get_builtin(name) {
            return Ok(agent);
        }

        if let Some(dir) = &self.agent_dir {
            let path = dir.join(format!("{name}.md"));
            if path.exists() {
                return load_agent_file(&path);
            }
        }

        if name.contains('/') || name.ends_with(".md") {
            let path = Path::new(name);
            if path.exists() {
                return load_agent_file(path);
            }
            return Err(AgentError::NotFound(format!("file not found: {name}")));
        }

        Err(AgentError::NotFound(format!(
            "unknown agent '{name}'. Available built-in agents: {}",
            builtin::list_builtin_names().join(", ")
        )))
    }
}

/// Read and parse a single agent file.
pub fn load_agent_file(path: &Path) -> Result<AgentDefinition, AgentError> {
    let content = std::fs::read_to_string(path).map_err(|e| AgentError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parser::parse_agent_definition(&content).map_err(|message| AgentError::ParseError {
        path: path.display().to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_agent(dir: &Path, file: &str, name: &str) {
        std::fs::write(
            dir.join(file),
            format!("---\nname: {name}\ndescription: A custom agent\n---\nYou are {name}."),
        )
        .unwrap();
    }

    #[test]
    fn load_builtin_agent() {
        let agent = FileAgentLoader::default().load_agent("explorer").unwrap();
        assert_eq!(agent.meta.name, "explorer");
    }

    #[test]
    fn load_unknown_agent_errors() {
        let err = FileAgentLoader::default()
            .load_agent("nonexistent")
            .unwrap_err()
            .to_string();
        assert!(err.contains("unknown agent"), "got: {err}");
        assert!(err.contains("explorer"), "should suggest built-ins, got: {err}");
    }

    #[test]
    fn load_from_agent_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(dir.path(), "custom.md", "custom");

        let loader = FileAgentLoader::new(Some(dir.path().to_path_buf()));
        let agent = loader.load_agent("custom").unwrap();
        assert_eq!(agent.meta.name, "custom");
        assert_eq!(agent.instructions, "You are custom.");
    }

    #[test]
    fn builtin_wins_over_agent_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(dir.path(), "explorer.md", "shadow");

        let loader = FileAgentLoader::new(Some(dir.path().to_path_buf()));
        assert_eq!(loader.load_agent("explorer").unwrap().meta.name, "explorer");
    }

    #[test]
    fn load_direct_file_path() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(dir.path(), "my_agent.md", "my_agent");

        let path = dir.path().join("my_agent.md").display().to_string();
        let agent = FileAgentLoader::default().load_agent(&path).unwrap();
        assert_eq!(agent.meta.name, "my_agent");
    }

    #[test]
    fn load_file_not_found() {
        let err = FileAgentLoader::default()
            .load_agent("/tmp/mountplan_no_such_agent.md")
            .unwrap_err()
            .to_string();
        assert!(err.contains("not found"), "got: {err}");
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.md"), "no frontmatter").unwrap();

        let loader = FileAgentLoader::new(Some(dir.path().to_path_buf()));
        let err = loader.load_agent("broken").unwrap_err();
        assert!(matches!(err, AgentError::ParseError { .. }));
        assert!(err.to_string().contains("broken.md"));
    }
}
