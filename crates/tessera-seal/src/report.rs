//! Verdicts, advisories, and the step-by-step diagnostic trace.

use std::fmt;

use serde::Serialize;

use crate::resolver::KeySource;

/// Final outcome of verifying one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No signature block; accepted because signing is optional.
    Unsigned,
    /// A good signature from the resolved key over the canonical payload.
    Verified,
    /// The signature did not verify against the payload.
    SignatureInvalid,
    /// No public key could be fetched for the signer.
    KeyUnavailable,
    /// The signature block or signature bytes are unusable.
    MalformedSignature,
    /// Key import or the verification primitive failed to run.
    VerificationEngineError,
    /// The key fingerprint differs from the maintainer record and
    /// fingerprint enforcement is enabled.
    FingerprintMismatch,
}

impl Verdict {
    /// Whether this verdict lets the profile through.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Unsigned | Self::Verified)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unsigned => "unsigned",
            Self::Verified => "verified",
            Self::SignatureInvalid => "signature invalid",
            Self::KeyUnavailable => "key unavailable",
            Self::MalformedSignature => "malformed signature",
            Self::VerificationEngineError => "verification engine error",
            Self::FingerprintMismatch => "fingerprint mismatch",
        };
        f.write_str(text)
    }
}

/// A non-fatal finding that needs human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The signer is not listed among the profile's maintainers.
    SignerUnknown {
        /// The claimed signer identity.
        identity: String,
    },
    /// The resolved key's fingerprint differs from the recorded one.
    FingerprintMismatch {
        /// Fingerprint recorded in the maintainer entry.
        expected: String,
        /// Fingerprints found in the resolved certificate.
        actual: Vec<String>,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignerUnknown { identity } => {
                write!(f, "signer {identity} is not in the maintainers list")
            }
            Self::FingerprintMismatch { expected, actual } => write!(
                f,
                "expected fingerprint {expected}, key has {}",
                actual.join(", ")
            ),
        }
    }
}

/// One line of the diagnostic trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum VerificationStep {
    /// A check succeeded.
    Pass(String),
    /// A check failed and decided the verdict.
    Fail(String),
    /// A step did not apply.
    Skip(String),
    /// Progress information.
    Info(String),
    /// A soft failure or advisory.
    Warn(String),
}

impl VerificationStep {
    /// Returns `true` if this step is a failure.
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Short status label for terminal output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Fail(_) => "FAIL",
            Self::Skip(_) => "SKIP",
            Self::Info(_) => "INFO",
            Self::Warn(_) => "WARN",
        }
    }

    /// The step's message.
    pub fn message(&self) -> &str {
        match self {
            Self::Pass(m) | Self::Fail(m) | Self::Skip(m) | Self::Info(m) | Self::Warn(m) => m,
        }
    }
}

/// Ordered record of verification steps.
///
/// Each step is also emitted as a `tracing` event when it is recorded, so
/// progress is visible live with `-v`.
#[derive(Debug, Default)]
pub struct Trace {
    steps: Vec<VerificationStep>,
}

impl Trace {
    /// Record a successful check.
    pub fn pass(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.steps.push(VerificationStep::Pass(message));
    }

    /// Record a failed check.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.steps.push(VerificationStep::Fail(message));
    }

    /// Record a skipped step.
    pub fn skip(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{message}");
        self.steps.push(VerificationStep::Skip(message));
    }

    /// Record progress information.
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.steps.push(VerificationStep::Info(message));
    }

    /// Record a soft failure or advisory.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.steps.push(VerificationStep::Warn(message));
    }

    /// The steps recorded so far.
    pub fn steps(&self) -> &[VerificationStep] {
        &self.steps
    }

    /// Consume the trace, returning its steps.
    pub fn into_steps(self) -> Vec<VerificationStep> {
        self.steps
    }
}

/// Everything learned while verifying one profile.
#[derive(Debug, Serialize)]
pub struct VerificationReport {
    /// The final verdict.
    pub verdict: Verdict,
    /// Whether the verdict accepts the profile.
    pub accepted: bool,
    /// Non-fatal findings for human review.
    pub advisories: Vec<Advisory>,
    /// Ordered diagnostic trace.
    pub steps: Vec<VerificationStep>,
    /// Claimed signer identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    /// Claimed signing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
    /// Where the signer's key was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_source: Option<KeySource>,
    /// Primary fingerprint of the signer's certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_fingerprint: Option<String>,
}

impl VerificationReport {
    /// A report with the given verdict and no details yet.
    pub(crate) const fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            accepted: verdict.is_accepted(),
            advisories: Vec::new(),
            steps: Vec::new(),
            signer: None,
            signed_at: None,
            key_source: None,
            key_fingerprint: None,
        }
    }
}
