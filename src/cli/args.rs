//! Clap argument types.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use mountplan::document::DocumentFormat;
use mountplan::settings::Scope;

/// Resolve agent-runtime mount plans from profiles, settings and overrides.
#[derive(Parser, Debug)]
#[command(name = "mountplan", version = mountplan::constants::VERSION)]
pub struct Cli {
    /// Log resolution steps to stderr (overridden by MOUNTPLAN_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Resolve and print the mount plan.
    Resolve(Box<ResolveArgs>),

    /// Validate a bundle configuration document.
    Validate(ValidateArgs),

    /// List available profiles.
    Profiles(ProfilesArgs),

    /// Manage the active profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Encrypt or decrypt sensitive fields in a configuration file.
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },

    /// Print the JSON schema of the mount plan.
    Schema,

    /// Print version and build information.
    Version,
}

/// Arguments for the `resolve` subcommand.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Project root holding `.mountplan/` settings (default: current directory).
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Profile to use instead of the active one from settings.
    #[arg(long)]
    pub profile: Option<String>,

    /// Directory to resolve custom profile names from.
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Directory to resolve custom agent names from.
    #[arg(long)]
    pub agent_dir: Option<PathBuf>,

    /// Override a value in the mount plan, e.g. `session.orchestrator=loop-events`.
    /// Values are parsed as JSON when possible and taken as strings otherwise.
    #[arg(long = "set", value_name = "KEY.PATH=VALUE")]
    pub set: Vec<String>,

    /// Configuration file (TOML, YAML, JSON or markdown) merged at CLI precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Arguments for the `validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the bundle document to validate.
    pub file: PathBuf,
}

/// Arguments for the `profiles` subcommand.
#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    /// Directory to scan for additional custom profiles.
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,
}

/// Profile management subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum ProfileAction {
    /// Make NAME the active profile in a settings scope.
    Use {
        /// Profile name.
        name: String,

        /// Settings scope to write (local, project, global).
        #[arg(long, default_value = "project")]
        scope: Scope,

        /// Project root holding `.mountplan/` settings.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Directory to resolve custom profile names from.
        #[arg(long)]
        profile_dir: Option<PathBuf>,
    },

    /// Print the active profile.
    Current {
        /// Project root holding `.mountplan/` settings.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Secrets subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum SecretsAction {
    /// Encrypt sensitive fields and print the result.
    Encrypt(SecretsFileArgs),
    /// Decrypt `enc:` values and print the result.
    Decrypt(SecretsFileArgs),
    /// Generate a fresh key-derivation salt.
    Salt,
}

/// Arguments shared by `secrets encrypt` and `secrets decrypt`.
#[derive(Parser, Debug)]
pub struct SecretsFileArgs {
    /// TOML, YAML or JSON file to transform.
    pub file: PathBuf,

    /// Secret key (default: MOUNTPLAN_SECRET_KEY).
    #[arg(long)]
    pub key: Option<String>,

    /// Hex-encoded salt (default: MOUNTPLAN_SECRET_SALT).
    #[arg(long)]
    pub salt: Option<String>,
}

/// Mount plan output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl From<OutputFormat> for DocumentFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => DocumentFormat::Json,
            OutputFormat::Yaml => DocumentFormat::Yaml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults() {
        let cli = Cli::try_parse_from(["mountplan", "resolve"]).unwrap();
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.root, PathBuf::from("."));
                assert!(args.profile.is_none());
                assert!(args.set.is_empty());
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected Resolve command"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn resolve_repeated_set_flags() {
        let cli = Cli::try_parse_from([
            "mountplan",
            "resolve",
            "--profile",
            "dev",
            "--set",
            "session.orchestrator=loop-events",
            "--set",
            "session.context=context-simple",
            "--format",
            "yaml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.profile.as_deref(), Some("dev"));
                assert_eq!(args.set.len(), 2);
                assert_eq!(args.format, OutputFormat::Yaml);
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn profile_use_scope_parsing() {
        let cli = Cli::try_parse_from(["mountplan", "profile", "use", "dev", "--scope", "user"]).unwrap();
        match cli.command {
            Command::Profile {
                action: ProfileAction::Use { name, scope, .. },
            } => {
                assert_eq!(name, "dev");
                assert_eq!(scope, Scope::Global);
            }
            _ => panic!("expected profile use"),
        }
    }

    #[test]
    fn profile_use_rejects_unknown_scope() {
        let result = Cli::try_parse_from(["mountplan", "profile", "use", "dev", "--scope", "team"]);
        assert!(result.is_err());
    }

    #[test]
    fn secrets_subcommands() {
        let cli = Cli::try_parse_from(["mountplan", "secrets", "encrypt", "settings.toml", "--key", "k"]).unwrap();
        match cli.command {
            Command::Secrets {
                action: SecretsAction::Encrypt(args),
            } => {
                assert_eq!(args.file, PathBuf::from("settings.toml"));
                assert_eq!(args.key.as_deref(), Some("k"));
                assert!(args.salt.is_none());
            }
            _ => panic!("expected secrets encrypt"),
        }

        let cli = Cli::try_parse_from(["mountplan", "secrets", "salt"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Secrets {
                action: SecretsAction::Salt
            }
        ));
    }

    #[test]
    fn output_format_maps_to_document_format() {
        assert_eq!(DocumentFormat::from(OutputFormat::Json), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from(OutputFormat::Yaml), DocumentFormat::Yaml);
    }
}
