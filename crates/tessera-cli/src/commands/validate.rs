//! The `tessera validate` subcommand.

use std::path::{Path, PathBuf};
use std::process;

use clap::Args;
use color_eyre::eyre::Result;
use tessera_profile::Profile;
use tessera_profile::registry;
use tessera_profile::validate::{self, Severity};

/// Arguments for `tessera validate`.
#[derive(Args)]
pub struct ValidateArgs {
    /// Profile files to validate (default: every profile in the registry).
    pub files: Vec<PathBuf>,
}

/// Execute the validate command.
pub fn execute(args: &ValidateArgs, root: &Path) -> Result<()> {
    let paths = if args.files.is_empty() {
        registry::scan(root)?
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    } else {
        args.files.clone()
    };

    let mut errors = 0usize;
    let mut warnings = 0usize;
    let mut failed = 0usize;

    for path in &paths {
        let issues = match Profile::load(path) {
            Ok(profile) => validate::validate(&profile),
            Err(e) => {
                println!("[ERROR] {e}");
                errors += 1;
                failed += 1;
                continue;
            }
        };

        if issues.is_empty() {
            println!("[OK] {}", path.display());
            continue;
        }

        if !validate::passes(&issues) {
            failed += 1;
        }

        println!("{}", path.display());
        for issue in &issues {
            match issue.severity {
                Severity::Error => {
                    errors += 1;
                    println!("  [ERROR] {issue}");
                }
                Severity::Warning => {
                    warnings += 1;
                    println!("  [WARN] {issue}");
                }
            }
        }
    }

    println!();
    println!(
        "{} profile(s) checked, {errors} error(s), {warnings} warning(s)",
        paths.len()
    );

    if failed > 0 {
        process::exit(1);
    }

    Ok(())
}
