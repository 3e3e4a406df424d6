//! App-wide constants.
//!
//! Centralises the tool name, settings paths, environment variable names,
//! and resolution defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "mountplan";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Directory holding project/local settings, relative to the project root.
pub const PROJECT_DIR: &str = ".mountplan";

/// Project settings filename (shared, usually committed).
pub const PROJECT_SETTINGS_FILENAME: &str = "settings.toml";

/// Local settings filename (per-checkout, usually git-ignored).
pub const LOCAL_SETTINGS_FILENAME: &str = "settings.local.toml";

/// Directory name under `~/.config/` for global settings.
pub const CONFIG_DIR: &str = "mountplan";

/// Global settings filename inside [`CONFIG_DIR`].
pub const GLOBAL_SETTINGS_FILENAME: &str = "settings.toml";

// ── Resolution defaults ─────────────────────────────────────────────

/// Orchestrator module used when nothing else selects one.
pub const DEFAULT_ORCHESTRATOR: &str = "loop-basic";

/// Context module used when nothing else selects one.
pub const DEFAULT_CONTEXT: &str = "context-simple";

/// Keys whose values are module lists merged by `module` identity.
pub const MODULE_LIST_KEYS: &[&str] = &["providers", "tools", "hooks", "agents"];

/// Marker prefix for encrypted configuration values.
pub const ENCRYPTED_PREFIX: &str = "enc:";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_SECRET_KEY: &str = "MOUNTPLAN_SECRET_KEY";
pub const ENV_SECRET_SALT: &str = "MOUNTPLAN_SECRET_SALT";
pub const ENV_PROFILE: &str = "MOUNTPLAN_PROFILE";
pub const ENV_LOG: &str = "MOUNTPLAN_LOG";
