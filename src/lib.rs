//! mountplan: configuration resolution for agent runtimes (library crate).
//!
//! Assembles a mount plan (session, providers, tools, hooks, agents) from
//! built-in defaults, a named profile, scoped settings files and CLI
//! overrides, then expands `${VAR}` references. Also provides bundle
//! validation and encryption at rest for sensitive configuration fields.

pub mod agents;
pub mod constants;
pub mod document;
pub mod env;
pub mod expand;
pub mod merge;
pub mod models;
pub mod profiles;
pub mod resolver;
pub mod secrets;
pub mod settings;
pub mod validate;

pub use expand::expand_env_vars;
pub use merge::deep_merge;
pub use resolver::{ConfigResolver, ResolveOptions, ResolvedConfig, resolve_app_config};
pub use secrets::SecretsCodec;
pub use validate::ConfigValidator;
