//! Mount plan resolution.
//!
//! Precedence, lowest first:
//!
//! 1. built-in base defaults
//! 2. active profile (with provider overrides merged into it)
//! 3. provider overrides on their own, when no profile consumed them
//! 4. `modules.{tools,hooks,agents}` from the merged settings
//! 5. CLI configuration
//! 6. `${VAR}` expansion over the whole result
//!
//! Every step except the profile step either succeeds or fails the whole
//! resolution. A profile that cannot be loaded or compiled is reported as
//! a warning and resolution continues without it.

use serde_json::Value;
use strum::{Display, EnumIter};
use thiserror::Error;

use crate::agents::AgentLoader;
use crate::constants::{DEFAULT_CONTEXT, DEFAULT_ORCHESTRATOR, MODULE_LIST_KEYS};
use crate::env::Env;
use crate::expand::expand_document;
use crate::merge::deep_merge;
use crate::models::{Document, ModuleConfig, MountPlan};
use crate::profiles::{
    ProfileError, ProfileLoader, apply_provider_overrides, compile_profile_to_mount_plan,
};
use crate::settings::{SettingsError, SettingsSource};

/// Module lists the settings layer may contribute. Providers come only
/// from profiles and explicit overrides.
const SETTINGS_MODULE_KEYS: &[&str] = &["tools", "hooks", "agents"];

/// Errors that abort resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to read settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("malformed settings: '{path}' must be {expected}")]
    MalformedSettings { path: String, expected: &'static str },
}

/// One step of the resolution pipeline, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ResolveStep {
    Base,
    Profile,
    ProviderOverrides,
    Settings,
    Cli,
    EnvExpansion,
}

impl ResolveStep {
    /// Whether a failure in this step degrades to a warning.
    pub fn is_recoverable(self) -> bool {
        matches!(self, ResolveStep::Profile)
    }
}

/// A non-fatal problem encountered while resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveWarning {
    pub step: ResolveStep,
    pub message: String,
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.step, self.message)
    }
}

/// The outcome of a resolution: the mount plan plus any warnings.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub mount_plan: Document,
    pub warnings: Vec<ResolveWarning>,
}

impl ResolvedConfig {
    /// Parse the mount plan into its typed view.
    pub fn typed(&self) -> Result<MountPlan, serde_json::Error> {
        MountPlan::from_document(&self.mount_plan)
    }
}

/// Optional inputs to a resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Provider entries merged into the profile's providers, or used as
    /// the provider list outright when no profile applies. An empty slice
    /// counts as not supplied.
    pub provider_overrides: Option<&'a [ModuleConfig]>,
    /// Highest-precedence overlay, applied after settings.
    pub cli_config: Option<&'a Document>,
    /// Profile to use instead of the settings' active profile.
    pub profile_override: Option<&'a str>,
}

/// Resolves mount plans from settings, profiles and overrides.
///
/// Holds only borrowed collaborators and an [`Env`]; every call to
/// [`resolve`](Self::resolve) builds a fresh plan.
pub struct ConfigResolver<'a> {
    settings: &'a dyn SettingsSource,
    profiles: &'a dyn ProfileLoader,
    agents: &'a dyn AgentLoader,
    env: Env,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(
        settings: &'a dyn SettingsSource,
        profiles: &'a dyn ProfileLoader,
        agents: &'a dyn AgentLoader,
    ) -> Self {
        Self {
            settings,
            profiles,
            agents,
            env: Env::real(),
        }
    }

    /// Use `env` for `${VAR}` expansion instead of the process environment.
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn resolve(&self, options: &ResolveOptions<'_>) -> Result<ResolvedConfig, ResolveError> {
        let mut warnings = Vec::new();
        let overrides = options.provider_overrides.filter(|o| !o.is_empty());

        let mut config = base_config();
        tracing::debug!(step = %ResolveStep::Base, "seeded base defaults");

        let profile_name = match options.profile_override {
            Some(name) => Some(name.to_string()),
            None => self.settings.active_profile()?,
        };
        let mut overrides_consumed = false;
        if let Some(name) = profile_name.as_deref() {
            match self.profile_plan(name, overrides) {
                Ok(plan) => {
                    config = deep_merge(&config, &plan);
                    overrides_consumed = overrides.is_some();
                    tracing::debug!(step = %ResolveStep::Profile, profile = name, "applied profile");
                }
                Err(e) => {
                    let warning = ResolveWarning {
                        step: ResolveStep::Profile,
                        message: format!("failed to load profile '{name}': {e}"),
                    };
                    tracing::warn!(step = %warning.step, profile = name, error = %e, "continuing without profile");
                    warnings.push(warning);
                }
            }
        }

        if let Some(overrides) = overrides.filter(|_| !overrides_consumed) {
            let providers = overrides.iter().map(ModuleConfig::to_value).collect();
            config.insert("providers".to_string(), Value::Array(providers));
            tracing::debug!(
                step = %ResolveStep::ProviderOverrides,
                count = overrides.len(),
                "set providers from overrides"
            );
        }

        let settings = self.settings.merged_settings()?;
        let overlay = settings_overlay(&settings)?;
        if !overlay.is_empty() {
            config = deep_merge(&config, &overlay);
            tracing::debug!(step = %ResolveStep::Settings, "applied settings modules");
        }

        if let Some(cli) = options.cli_config {
            config = deep_merge(&config, cli);
            tracing::debug!(step = %ResolveStep::Cli, "applied CLI configuration");
        }

        let mount_plan = expand_document(&config, &self.env);
        tracing::debug!(step = %ResolveStep::EnvExpansion, "expanded environment references");

        Ok(ResolvedConfig {
            mount_plan,
            warnings,
        })
    }

    /// Load, override and compile one profile.
    fn profile_plan(
        &self,
        name: &str,
        overrides: Option<&[ModuleConfig]>,
    ) -> Result<Document, ProfileError> {
        let profile = self.profiles.load_profile(name)?;
        let profile = match overrides {
            Some(overrides) => apply_provider_overrides(&profile, overrides),
            None => profile,
        };
        compile_profile_to_mount_plan(&profile, self.agents)
    }
}

/// Resolve a mount plan, logging any warnings instead of returning them.
pub fn resolve_app_config(
    settings: &dyn SettingsSource,
    profiles: &dyn ProfileLoader,
    agents: &dyn AgentLoader,
    options: &ResolveOptions<'_>,
) -> Result<Document, ResolveError> {
    let resolved = ConfigResolver::new(settings, profiles, agents).resolve(options)?;
    Ok(resolved.mount_plan)
}

/// The fixed starting point of every resolution.
pub fn base_config() -> Document {
    let mut session = Document::new();
    session.insert(
        "orchestrator".to_string(),
        Value::String(DEFAULT_ORCHESTRATOR.to_string()),
    );
    session.insert(
        "context".to_string(),
        Value::String(DEFAULT_CONTEXT.to_string()),
    );

    let mut config = Document::new();
    config.insert("session".to_string(), Value::Object(session));
    for key in MODULE_LIST_KEYS {
        config.insert(key.to_string(), Value::Array(Vec::new()));
    }
    config
}

/// Extract `modules.{tools,hooks,agents}` from merged settings as a
/// top-level overlay.
fn settings_overlay(settings: &Document) -> Result<Document, ResolveError> {
    let mut overlay = Document::new();
    let modules = match settings.get("modules") {
        None | Some(Value::Null) => return Ok(overlay),
        Some(Value::Object(modules)) => modules,
        Some(_) => {
            return Err(ResolveError::MalformedSettings {
                path: "modules".to_string(),
                expected: "a mapping",
            });
        }
    };

    for key in SETTINGS_MODULE_KEYS {
        match modules.get(*key) {
            None | Some(Value::Null) => {}
            Some(list @ Value::Array(_)) => {
                overlay.insert(key.to_string(), list.clone());
            }
            Some(_) => {
                return Err(ResolveError::MalformedSettings {
                    path: format!("modules.{key}"),
                    expected: "a list",
                });
            }
        }
    }
    Ok(overlay)
}
