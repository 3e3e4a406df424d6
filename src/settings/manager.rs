//! File-backed settings manager.
//!
//! Missing files are empty layers. Unreadable or unparsable files are
//! errors naming the file. Writes only ever touch the file of the scope
//! being written.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{Scope, SettingsError, SettingsSource};
use crate::constants::{
    CONFIG_DIR, ENV_PROFILE, GLOBAL_SETTINGS_FILENAME, LOCAL_SETTINGS_FILENAME, PROJECT_DIR,
    PROJECT_SETTINGS_FILENAME,
};
use crate::document::{self, DocumentFormat};
use crate::env::Env;
use crate::merge::{deep_merge, merge_layers};
use crate::models::{Document, ModuleConfig};

/// Reads and writes the three settings scopes.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    project_root: Option<PathBuf>,
    global_path: Option<PathBuf>,
    env: Env,
}

impl SettingsManager {
    /// Settings for `project_root` (if any) plus the user's global file.
    pub fn new(project_root: Option<&Path>, env: Env) -> Self {
        Self {
            project_root: project_root.map(Path::to_path_buf),
            global_path: Self::default_global_path(),
            env,
        }
    }

    /// Settings with an explicit global file location (useful for testing).
    pub fn with_paths(project_root: Option<PathBuf>, global_path: Option<PathBuf>, env: Env) -> Self {
        Self {
            project_root,
            global_path,
            env,
        }
    }

    fn default_global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(GLOBAL_SETTINGS_FILENAME))
    }

    /// File backing the given scope, if it has a location.
    pub fn path_for(&self, scope: Scope) -> Option<PathBuf> {
        match scope {
            Scope::Global => self.global_path.clone(),
            Scope::Project => self
                .project_root
                .as_ref()
                .map(|r| r.join(PROJECT_DIR).join(PROJECT_SETTINGS_FILENAME)),
            Scope::Local => self
                .project_root
                .as_ref()
                .map(|r| r.join(PROJECT_DIR).join(LOCAL_SETTINGS_FILENAME)),
        }
    }

    /// Load one scope's document; a missing file is an empty document.
    pub fn load_scope(&self, scope: Scope) -> Result<Document, SettingsError> {
        let Some(path) = self.path_for(scope) else {
            return Ok(Document::new());
        };
        if !path.exists() {
            return Ok(Document::new());
        }
        let loaded = document::load_document(&path)?;
        tracing::debug!(%scope, path = %path.display(), "loaded settings scope");
        Ok(loaded.document)
    }

    /// Provider overrides (`config.providers`) from the merged settings.
    ///
    /// Entries that are not valid module entries are skipped with a warning.
    pub fn provider_overrides(&self) -> Result<Vec<ModuleConfig>, SettingsError> {
        let merged = self.merged_settings()?;
        Ok(provider_overrides_from(&merged))
    }

    /// Select the active profile in `scope`.
    pub fn set_active_profile(&self, scope: Scope, name: &str) -> Result<(), SettingsError> {
        let doc = self.load_scope(scope)?;
        let overlay = nested(&["profile", "active"], Value::String(name.to_string()));
        let updated = deep_merge(&doc, &overlay);
        self.write_scope(scope, &updated)
    }

    /// Add or update a provider override in `scope`, merging by module id.
    pub fn set_provider_override(&self, scope: Scope, provider: &ModuleConfig) -> Result<(), SettingsError> {
        let doc = self.load_scope(scope)?;
        let overlay = nested(
            &["config", "providers"],
            Value::Array(vec![provider.to_value()]),
        );
        let updated = deep_merge(&doc, &overlay);
        self.write_scope(scope, &updated)
    }

    /// Remove a provider override from `scope`. Returns `true` if one was removed.
    pub fn remove_provider_override(&self, scope: Scope, module: &str) -> Result<bool, SettingsError> {
        let mut doc = self.load_scope(scope)?;
        let Some(providers) = doc
            .get_mut("config")
            .and_then(|c| c.get_mut("providers"))
            .and_then(Value::as_array_mut)
        else {
            return Ok(false);
        };

        let before = providers.len();
        providers.retain(|p| ModuleConfig::id_of(p) != Some(module));
        if providers.len() == before {
            return Ok(false);
        }
        self.write_scope(scope, &doc)?;
        Ok(true)
    }

    fn write_scope(&self, scope: Scope, doc: &Document) -> Result<(), SettingsError> {
        let path = self.path_for(scope).ok_or(SettingsError::NoPath(scope))?;
        let content = document::render_document(doc, DocumentFormat::Toml).map_err(|e| {
            SettingsError::Render {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::WriteFile {
                path: path.clone(),
                source: e,
            })?;
        }
        std::fs::write(&path, content).map_err(|e| SettingsError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(%scope, path = %path.display(), "wrote settings scope");
        Ok(())
    }
}

impl SettingsSource for SettingsManager {
    /// `MOUNTPLAN_PROFILE` wins over `profile.active` from any scope.
    fn active_profile(&self) -> Result<Option<String>, SettingsError> {
        if let Some(name) = self.env.non_empty(ENV_PROFILE) {
            return Ok(Some(name));
        }
        let merged = self.merged_settings()?;
        Ok(merged
            .get("profile")
            .and_then(|p| p.get("active"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }

    fn merged_settings(&self) -> Result<Document, SettingsError> {
        let mut layers = Vec::with_capacity(3);
        for scope in Scope::ascending() {
            layers.push(self.load_scope(scope)?);
        }
        Ok(merge_layers(&layers))
    }
}

/// Extract `config.providers` from a merged settings document.
pub fn provider_overrides_from(settings: &Document) -> Vec<ModuleConfig> {
    let Some(entries) = settings
        .get("config")
        .and_then(|c| c.get("providers"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let parsed = ModuleConfig::from_value(entry);
            if parsed.is_none() {
                tracing::warn!(%entry, "ignoring malformed provider override in settings");
            }
            parsed
        })
        .collect()
}

/// Wrap `leaf` in one mapping per key, outermost first.
fn nested(path: &[&str], leaf: Value) -> Document {
    let mut doc = Document::new();
    let Some((last, parents)) = path.split_last() else {
        return doc;
    };
    doc.insert(last.to_string(), leaf);
    for key in parents.iter().rev() {
        let mut outer = Document::new();
        outer.insert(key.to_string(), Value::Object(doc));
        doc = outer;
    }
    doc
}
