//! Tessera CLI: tooling for a signed device-profile registry.
//!
//! Verify maintainer signatures, print canonical payloads, validate
//! profiles, build the registry manifest, and audit maintainers.

mod commands;
mod config;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;

use crate::config::Config;

/// Tessera: signed device-profile registry tooling.
///
/// Profiles are YAML documents under `registry/{stable,contrib}`. Signed
/// profiles carry a detached OpenPGP signature over their canonical form,
/// verified against keys discovered via Web Key Directory or the
/// maintainer's key URL.
#[derive(Parser)]
#[command(name = "tessera", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON (for machine consumption).
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (default: ./tessera.toml, then the user config dir).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Registry checkout root, overriding the config file.
    #[arg(long, value_name = "DIR", global = true)]
    registry: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Verify the signatures of one or more profiles.
    Verify(commands::verify::VerifyArgs),
    /// Print the canonical payload a maintainer signs.
    Canonical(commands::canonical::CanonicalArgs),
    /// Check profiles for structural problems.
    Validate(commands::validate::ValidateArgs),
    /// Generate the registry `manifest.json`.
    Manifest(commands::manifest::ManifestArgs),
    /// Report maintained and orphaned profiles.
    Maintainers,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(root) = cli.registry {
        config.registry.root = root;
    }
    let root: &Path = &config.registry.root;

    match cli.command {
        Commands::Verify(args) => commands::verify::execute(args, &config),
        Commands::Canonical(args) => commands::canonical::execute(&args),
        Commands::Validate(args) => commands::validate::execute(&args, root),
        Commands::Manifest(args) => commands::manifest::execute(&args, &config),
        Commands::Maintainers => commands::maintainers::execute(root),
    }
}
