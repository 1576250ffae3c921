//! The `tessera canonical` subcommand.
//!
//! Prints the canonical payload of a profile: the exact bytes a maintainer
//! signs with `gpg --detach-sign` before base64-encoding the result into
//! `device.signature.pgp`.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use tessera_profile::{CANONICAL_FORM, Profile, canonicalize};

/// Arguments for `tessera canonical`.
#[derive(Args)]
pub struct CanonicalArgs {
    /// Profile file to canonicalize.
    pub file: PathBuf,

    /// Write the payload to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the canonical command.
pub fn execute(args: &CanonicalArgs) -> Result<()> {
    let profile = Profile::load(&args.file)?;
    let payload = canonicalize(&profile)?;
    tracing::info!(
        form = CANONICAL_FORM,
        bytes = payload.len(),
        "canonicalized {}",
        args.file.display()
    );

    if let Some(path) = &args.output {
        std::fs::write(path, &payload)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        eprintln!("Wrote {CANONICAL_FORM} payload to {}", path.display());
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&payload)?;
        stdout.flush()?;
    }

    Ok(())
}
