//! The `tessera maintainers` subcommand.
//!
//! Orphaned profiles are reported but never fail the command.

use std::path::Path;

use color_eyre::eyre::Result;
use tessera_profile::maintainers;

/// Execute the maintainers command.
pub fn execute(root: &Path) -> Result<()> {
    let audit = maintainers::audit(root)?;
    let rule = "=".repeat(60);

    println!("Maintainer Status");
    println!("{rule}");
    println!();

    println!("Profiles with maintainers: {}", audit.maintained.len());
    for profile in &audit.maintained {
        let handles: Vec<String> = profile.maintainers.iter().map(|m| format!("@{m}")).collect();
        println!(
            "  - {} [{}]: {}",
            profile.id,
            profile.stability,
            handles.join(", ")
        );
    }
    println!();

    if !audit.orphaned.is_empty() {
        println!("Orphaned profiles (no maintainer): {}", audit.orphaned.len());
        for profile in &audit.orphaned {
            println!("  - {} [{}]: {}", profile.id, profile.stability, profile.path);
        }
        println!();
    }

    for warning in &audit.warnings {
        println!("warning: {warning}");
    }

    println!("{rule}");
    Ok(())
}
