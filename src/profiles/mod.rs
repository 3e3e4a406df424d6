//! Profile loading, inheritance and provider overrides.
//!
//! A profile is a markdown file whose YAML frontmatter carries the
//! profile's defaults and whose body is its system instructions:
//!
//! ```markdown
//! ---
//! profile:
//!   name: dev
//!   description: Day-to-day development
//!   extends: base
//! session:
//!   orchestrator: loop-streaming
//! tools:
//!   - module: tool-search
//! agents: [explorer]
//! ---
//!
//! You are a development assistant.
//! ```
//!
//! With `extends`, the parent is loaded first and the child's frontmatter
//! is deep-merged over it, so module lists merge by id.

pub mod builtin;
pub mod compile;

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::agents::AgentError;
use crate::document::{self, DocumentFormat};
use crate::merge::{deep_merge, merge_module_lists};
use crate::models::{Document, ModuleConfig, Profile};

pub use compile::compile_profile_to_mount_plan;

/// Errors from profile loading and compilation.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("failed to read profile file {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse profile {name}: {message}")]
    ParseError { name: String, message: String },

    #[error("profile inheritance cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("profile agent could not be loaded: {0}")]
    Agent(#[from] AgentError),
}

/// Resolves profile names into fully inherited profiles.
pub trait ProfileLoader {
    fn load_profile(&self, name: &str) -> Result<Profile, ProfileError>;
}

/// Loads profiles from the built-in registry and an optional directory.
///
/// Resolution order for each name:
/// 1. built-in profile of that name
/// 2. `{profile_dir}/{name}.md`
/// 3. a direct file path (contains `/` or ends in `.md`)
#[derive(Debug, Clone, Default)]
pub struct FileProfileLoader {
    profile_dir: Option<PathBuf>,
}

/// Frontmatter and body of one profile file, before inheritance.
struct RawProfile {
    frontmatter: Document,
    body: String,
}

impl RawProfile {
    fn extends(&self) -> Option<&str> {
        self.frontmatter
            .get("profile")
            .and_then(|p| p.get("extends"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl FileProfileLoader {
    pub fn new(profile_dir: Option<PathBuf>) -> Self {
        Self { profile_dir }
    }

    fn load_raw(&self, name: &str) -> Result<RawProfile, ProfileError> {
        if let Some(content) = builtin::get_builtin_source(name) {
            return parse_raw(name, content);
        }

        if let Some(dir) = &self.profile_dir {
            let path = dir.join(format!("{name}.md"));
            if path.exists() {
                return read_raw(name, &path);
            }
        }

        if name.contains('/') || name.ends_with(".md") {
            let path = Path::new(name);
            if path.exists() {
                return read_raw(name, path);
            }
            return Err(ProfileError::NotFound(format!("file not found: {name}")));
        }

        Err(ProfileError::NotFound(format!(
            "unknown profile '{name}'. Available built-in profiles: {}",
            builtin::list_builtin_names().join(", ")
        )))
    }

    /// Load `name` with its ancestors merged in. `chain` holds the names
    /// currently being resolved, outermost first.
    fn load_inherited(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<RawProfile, ProfileError> {
        if chain.iter().any(|n| n == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(ProfileError::Cycle(cycle));
        }
        chain.push(name.to_string());

        let raw = self.load_raw(name)?;
        let resolved = match raw.extends().map(str::to_string) {
            None => raw,
            Some(parent_name) => {
                tracing::debug!(profile = name, parent = %parent_name, "resolving profile parent");
                let parent = self.load_inherited(&parent_name, chain)?;
                RawProfile {
                    frontmatter: deep_merge(&parent.frontmatter, &raw.frontmatter),
                    body: if raw.body.is_empty() {
                        parent.body
                    } else {
                        raw.body
                    },
                }
            }
        };

        chain.pop();
        Ok(resolved)
    }
}

impl ProfileLoader for FileProfileLoader {
    fn load_profile(&self, name: &str) -> Result<Profile, ProfileError> {
        let raw = self.load_inherited(name, &mut Vec::new())?;
        Profile::from_document(&raw.frontmatter, raw.body).map_err(|e| ProfileError::ParseError {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

fn read_raw(name: &str, path: &Path) -> Result<RawProfile, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProfileError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_raw(name, &content)
}

fn parse_raw(name: &str, content: &str) -> Result<RawProfile, ProfileError> {
    let loaded = document::parse_document(content, DocumentFormat::Markdown).map_err(|e| {
        ProfileError::ParseError {
            name: name.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(RawProfile {
        frontmatter: loaded.document,
        body: loaded.body,
    })
}

/// List all available profiles: built-ins plus any custom ones from `profile_dir`.
///
/// Custom files that fail to load (bad frontmatter, unknown parent,
/// inheritance cycle) are skipped with a warning.
pub fn list_profiles(profile_dir: Option<&Path>) -> Result<Vec<Profile>, ProfileError> {
    let loader = FileProfileLoader::new(profile_dir.map(Path::to_path_buf));
    let mut profiles = Vec::new();

    for name in builtin::list_builtin_names() {
        profiles.push(loader.load_profile(name)?);
    }

    let Some(dir) = profile_dir.filter(|d| d.is_dir()) else {
        return Ok(profiles);
    };

    let read_err = |e| ProfileError::ReadError {
        path: dir.display().to_string(),
        source: e,
    };
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(read_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "md"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if builtin::get_builtin_source(stem).is_some() {
            tracing::warn!(path = %path.display(), "custom profile shadowed by built-in of the same name");
            continue;
        }
        match loader.load_profile(stem) {
            Ok(profile) => profiles.push(profile),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping profile file"),
        }
    }

    Ok(profiles)
}

/// Return a copy of `profile` whose providers are merged by module id with
/// `overrides`. The input profile is left unchanged.
pub fn apply_provider_overrides(profile: &Profile, overrides: &[ModuleConfig]) -> Profile {
    let overlay: Vec<Value> = overrides.iter().map(ModuleConfig::to_value).collect();
    let merged = merge_module_lists(&profile.provider_values(), &overlay);

    let mut result = profile.clone();
    result.providers = merged.iter().filter_map(ModuleConfig::from_value).collect();
    result
}
