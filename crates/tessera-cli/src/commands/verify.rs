//! The `tessera verify` subcommand.
//!
//! Verifies the maintainer signatures of profiles and exits non-zero if any
//! profile is rejected.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Args;
use color_eyre::eyre::Result;
use serde::Serialize;
use tessera_profile::registry;
use tessera_seal::{ProfileVerifier, VerificationReport};

use crate::config::Config;

/// Arguments for `tessera verify`.
#[derive(Args)]
pub struct VerifyArgs {
    /// Profile files to verify.
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub files: Vec<PathBuf>,

    /// Verify every profile in the registry.
    #[arg(long)]
    pub all: bool,

    /// Output results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Timeout in seconds for each key fetch.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip Web Key Directory lookups and use only maintainer key URLs.
    #[arg(long)]
    pub no_wkd: bool,

    /// Reject profiles whose key fingerprint differs from the maintainer record.
    #[arg(long)]
    pub enforce_fingerprint: bool,
}

/// Per-file result for JSON output.
#[derive(Serialize)]
struct FileOutcome {
    path: PathBuf,
    #[serde(flatten)]
    result: Outcome,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Report(VerificationReport),
    Error(String),
}

impl FileOutcome {
    const fn accepted(&self) -> bool {
        match &self.result {
            Outcome::Report(report) => report.accepted,
            Outcome::Error(_) => false,
        }
    }
}

/// Execute the verify command.
pub fn execute(args: VerifyArgs, config: &Config) -> Result<()> {
    let mut verify_config = config.verify.to_verify_config();
    if let Some(secs) = args.timeout {
        verify_config.fetch_timeout = Duration::from_secs(secs);
    }
    if args.no_wkd {
        verify_config.use_wkd = false;
    }
    if args.enforce_fingerprint {
        verify_config.enforce_fingerprint = true;
    }

    let paths = if args.all {
        registry::scan(&config.registry.root)?
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    } else {
        args.files
    };

    let verifier = ProfileVerifier::new(verify_config);
    let total = paths.len();
    let mut outcomes = Vec::new();
    let mut rejected = 0usize;

    for path in paths {
        let result = match verifier.verify_file(&path) {
            Ok(report) => Outcome::Report(report),
            Err(e) => Outcome::Error(e.to_string()),
        };
        let outcome = FileOutcome { path, result };
        if !outcome.accepted() {
            rejected += 1;
        }
        if args.json {
            outcomes.push(outcome);
        } else {
            print_outcome(&outcome);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else if total > 1 {
        println!(
            "{total} profile(s) checked, {} accepted, {rejected} rejected",
            total - rejected
        );
    }

    if rejected > 0 {
        process::exit(1);
    }

    Ok(())
}

fn print_outcome(outcome: &FileOutcome) {
    println!("== {}", outcome.path.display());
    match &outcome.result {
        Outcome::Error(e) => {
            println!("[FAIL] {e}");
            println!();
            println!("Verification FAILED");
        }
        Outcome::Report(report) => {
            for step in &report.steps {
                println!("[{}] {}", step.label(), step.message());
            }
            for advisory in &report.advisories {
                println!("[ADVISORY] {advisory}");
            }
            println!();
            if report.accepted {
                println!("Verification PASSED ({})", report.verdict);
            } else {
                println!("Verification FAILED ({})", report.verdict);
            }
        }
    }
    println!();
}
