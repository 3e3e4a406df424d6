//! Scoped settings: the "config manager" collaborator of the resolver.
//!
//! Three independent layers, highest precedence first:
//!
//! 1. `local`: `<root>/.mountplan/settings.local.toml`
//! 2. `project`: `<root>/.mountplan/settings.toml`
//! 3. `global`: `~/.config/mountplan/settings.toml`
//!
//! Each layer may carry `profile.active`, provider overrides under
//! `config.providers`, and `modules.{tools,hooks,agents}` lists.

pub mod manager;

use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::document::DocumentError;
use crate::models::Document;

pub use manager::SettingsManager;

/// Errors from reading or writing settings files.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("failed to write settings file {path}: {source}")]
    WriteFile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render settings for {path}: {message}")]
    Render {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("no settings file location for the {0} scope")]
    NoPath(Scope),
}

/// A precedence tier for settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    Local,
    Project,
    #[strum(serialize = "global", serialize = "user")]
    Global,
}

impl Scope {
    /// Scopes ordered lowest precedence first, the order layers are merged in.
    pub fn ascending() -> [Scope; 3] {
        [Scope::Global, Scope::Project, Scope::Local]
    }
}

/// Read access to settings, as the resolver needs it.
pub trait SettingsSource {
    /// Name of the profile the user selected, if any.
    fn active_profile(&self) -> Result<Option<String>, SettingsError>;

    /// All scopes merged, local > project > global.
    fn merged_settings(&self) -> Result<Document, SettingsError>;
}

/// In-memory settings, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    pub active_profile: Option<String>,
    pub settings: Document,
}

impl SettingsSource for StaticSettings {
    fn active_profile(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.active_profile.clone())
    }

    fn merged_settings(&self) -> Result<Document, SettingsError> {
        Ok(self.settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn scope_parse_and_display() {
        assert_eq!("local".parse::<Scope>().unwrap(), Scope::Local);
        assert_eq!("project".parse::<Scope>().unwrap(), Scope::Project);
        assert_eq!("global".parse::<Scope>().unwrap(), Scope::Global);
        assert_eq!("user".parse::<Scope>().unwrap(), Scope::Global);
        assert!("team".parse::<Scope>().is_err());
        assert_eq!(Scope::Local.to_string(), "local");
    }

    #[test]
    fn ascending_covers_every_scope() {
        let ascending = Scope::ascending();
        for scope in Scope::iter() {
            assert!(ascending.contains(&scope));
        }
        assert_eq!(ascending[0], Scope::Global);
        assert_eq!(ascending[2], Scope::Local);
    }
}
