//! The `tessera manifest` subcommand.
//!
//! Aggregates every registry profile into `manifest.json`.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use tessera_profile::manifest::{self, ManifestOptions};

use crate::config::Config;

/// Arguments for `tessera manifest`.
#[derive(Args)]
pub struct ManifestArgs {
    /// Output path (default: `manifest.json` in the registry root).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the manifest command.
pub fn execute(args: &ManifestArgs, config: &Config) -> Result<()> {
    let root = &config.registry.root;
    let options = ManifestOptions {
        raw_base_url: config.registry.raw_base_url.clone(),
        now: Utc::now(),
    };

    let manifest = manifest::generate(root, &options)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| root.join("manifest.json"));

    manifest::write(&manifest, &output)
        .wrap_err_with(|| format!("failed to write {}", output.display()))?;

    let versions: usize = manifest.devices.values().map(|d| d.versions.len()).sum();
    println!(
        "Wrote {} ({} device(s), {versions} version(s))",
        output.display(),
        manifest.devices.len()
    );

    Ok(())
}
