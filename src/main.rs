//! mountplan: mount plan resolution CLI.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;

use cli::args::{
    Cli, Command, ProfileAction, ProfilesArgs, ResolveArgs, SecretsAction, SecretsFileArgs,
    ValidateArgs,
};
use mountplan::agents::FileAgentLoader;
use mountplan::constants;
use mountplan::document::{self, DocumentFormat};
use mountplan::env::Env;
use mountplan::merge::deep_merge;
use mountplan::models::{Document, mount_plan::mount_plan_schema};
use mountplan::profiles::{self, FileProfileLoader, ProfileLoader};
use mountplan::resolver::{ConfigResolver, ResolveOptions};
use mountplan::secrets::{KeySalt, SecretsCodec};
use mountplan::settings::{SettingsManager, SettingsSource};
use mountplan::validate::ConfigValidator;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);

    match cli.command {
        Command::Resolve(args) => run_resolve(*args).await,
        Command::Validate(args) => run_validate(args),
        Command::Profiles(args) => run_profiles(args),
        Command::Profile { action } => run_profile(action),
        Command::Secrets { action } => run_secrets(action).await,
        Command::Schema => {
            println!("{}", mount_plan_schema());
            Ok(())
        }
        Command::Version => run_version(),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Resolve the mount plan for a project and print it.
async fn run_resolve(args: ResolveArgs) -> Result<()> {
    let settings = SettingsManager::new(Some(args.root.as_path()), Env::real());
    let profiles = FileProfileLoader::new(args.profile_dir.clone());
    let agents = FileAgentLoader::new(args.agent_dir.clone());

    let provider_overrides = settings
        .provider_overrides()
        .context("failed to read provider overrides from settings")?;
    let cli_config = build_cli_config(&args).await?;

    let options = ResolveOptions {
        provider_overrides: Some(&provider_overrides),
        cli_config: cli_config.as_ref(),
        profile_override: args.profile.as_deref(),
    };
    let resolved = ConfigResolver::new(&settings, &profiles, &agents)
        .resolve(&options)
        .context("failed to resolve mount plan")?;

    for warning in &resolved.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    let rendered = document::render_document(&resolved.mount_plan, args.format.into())
        .context("failed to render mount plan")?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// `--config FILE` with `--set` assignments layered on top.
async fn build_cli_config(args: &ResolveArgs) -> Result<Option<Document>> {
    let mut config = match &args.config {
        Some(path) => Some(read_document(path).await?.0),
        None => None,
    };

    if !args.set.is_empty() {
        let sets = cli::parse_set_overrides(&args.set).map_err(anyhow::Error::msg)?;
        config = Some(match config {
            Some(base) => deep_merge(&base, &sets),
            None => sets,
        });
    }
    Ok(config)
}

/// Read a document and report the format it was parsed as.
async fn read_document(path: &Path) -> Result<(Document, DocumentFormat)> {
    let Some(format) = DocumentFormat::from_path(path) else {
        bail!(
            "unsupported file type for {} (expected .toml, .yaml, .yml, .json or .md)",
            path.display()
        );
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let loaded = document::parse_document(&content, format)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok((loaded.document, format))
}

/// Validate a bundle document.
fn run_validate(args: ValidateArgs) -> Result<()> {
    let doc = ConfigValidator::validate_file(&args.file)
        .with_context(|| format!("{} is not a valid bundle", args.file.display()))?;

    let name = doc
        .get("bundle")
        .and_then(|b| b.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();
    println!(
        "  {} {}  {}",
        "✔".green().bold(),
        name.bold(),
        args.file.display().to_string().dimmed(),
    );
    Ok(())
}

/// List available profiles.
fn run_profiles(args: ProfilesArgs) -> Result<()> {
    let profiles =
        profiles::list_profiles(args.profile_dir.as_deref()).context("failed to list profiles")?;

    for profile in &profiles {
        let meta = &profile.profile;
        println!("  {}  {}", meta.name.bold(), meta.description.dimmed());
        if let Some(ref parent) = meta.extends {
            println!("         {}  {}", "extends:".cyan(), parent);
        }
        if !profile.agents.is_empty() {
            println!("         {}  {}", "agents:".cyan(), profile.agents.join(", "));
        }
    }
    Ok(())
}

fn run_profile(action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Use {
            name,
            scope,
            root,
            profile_dir,
        } => {
            FileProfileLoader::new(profile_dir)
                .load_profile(&name)
                .with_context(|| format!("cannot activate profile '{name}'"))?;

            let settings = SettingsManager::new(Some(root.as_path()), Env::real());
            settings
                .set_active_profile(scope, &name)
                .context("failed to update settings")?;

            let path = settings
                .path_for(scope)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!(
                "  {} active profile set to {} in {} settings ({})",
                "✔".green().bold(),
                name.bold(),
                scope,
                path.dimmed(),
            );
            Ok(())
        }
        ProfileAction::Current { root } => {
            let settings = SettingsManager::new(Some(root.as_path()), Env::real());
            match settings.active_profile().context("failed to read settings")? {
                Some(name) => println!("{name}"),
                None => println!("{}", "no active profile".dimmed()),
            }
            Ok(())
        }
    }
}

async fn run_secrets(action: SecretsAction) -> Result<()> {
    match action {
        SecretsAction::Salt => {
            println!("{}", KeySalt::generate().to_hex());
            Ok(())
        }
        SecretsAction::Encrypt(args) => transform_secrets(args, true).await,
        SecretsAction::Decrypt(args) => transform_secrets(args, false).await,
    }
}

/// Encrypt or decrypt a settings file and print it in its own format.
async fn transform_secrets(args: SecretsFileArgs, encrypt: bool) -> Result<()> {
    let (doc, format) = read_document(&args.file).await?;
    if format == DocumentFormat::Markdown {
        bail!("secrets can only be transformed in TOML, YAML or JSON files");
    }

    let salt = args
        .salt
        .as_deref()
        .map(KeySalt::from_hex)
        .transpose()
        .map_err(|e| anyhow::anyhow!("invalid --salt: {e}"))?;
    let codec = SecretsCodec::from_env(args.key.as_deref(), salt.as_ref(), &Env::real())?;

    let output = if encrypt {
        codec.encrypt_config(&doc)?
    } else {
        codec.decrypt_config(&doc)?
    };
    print!("{}", document::render_document(&output, format)?);
    Ok(())
}
